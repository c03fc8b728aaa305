//! The per-call authorization gate.
//!
//! The gate is an ordered chain of typed layers folded over a per-call
//! [`CallContext`]. The first layer parses the credential and attaches the
//! resolved identity without ever rejecting; the second layer makes the
//! actual allow/deny decision. Keeping the two apart means routes on the
//! allow-list still see the caller's identity when a valid credential
//! happens to be present.

use async_trait::async_trait;
use tracing::debug;

use ladle_core::{Identity, UserId};
use ladle_policy::Caller;

use crate::credential::{extract_bearer, CredentialService};
use crate::error::GateError;

/// Routes reachable without a credential. Matched exactly, never by prefix:
/// `/api/users/login/extra` is not on the list.
pub const ALLOW_LISTED_PATHS: &[&str] = &[
    "/api/users/login",
    "/api/users/register",
    "/api/user/login",
    "/api/user/register",
];

/// Route prefixes restricted to admin callers.
pub const ADMIN_PATH_PREFIXES: &[&str] = &["/api/users/admin/", "/api/recipes/admin/"];

/// The slice of an incoming call the gate looks at.
#[derive(Debug, Clone)]
pub struct GateRequest {
    /// The request path, without query string.
    pub path: String,
    /// The raw Authorization header value, if any.
    pub authorization: Option<String>,
}

impl GateRequest {
    pub fn new(path: impl Into<String>, authorization: Option<String>) -> Self {
        Self {
            path: path.into(),
            authorization,
        }
    }
}

/// Per-call authentication state. Built fresh for every call and passed
/// explicitly; there is no ambient caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallContext {
    Unauthenticated,
    Authenticated {
        user_id: UserId,
        email: String,
        is_admin: bool,
    },
}

impl CallContext {
    /// The resolved caller, when authenticated.
    pub fn caller(&self) -> Option<Caller> {
        match self {
            CallContext::Unauthenticated => None,
            CallContext::Authenticated {
                user_id, is_admin, ..
            } => Some(Caller {
                user_id: *user_id,
                is_admin: *is_admin,
            }),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, CallContext::Authenticated { .. })
    }
}

/// Outcome of one gate layer.
#[derive(Debug)]
pub enum Step {
    /// Pass the (possibly updated) context to the next layer.
    Continue(CallContext),
    /// Reject the call.
    Halt(GateError),
}

/// One stage of the gate chain.
#[async_trait]
pub trait GateLayer: Send + Sync {
    async fn apply(&self, request: &GateRequest, ctx: CallContext) -> Result<Step, GateError>;
}

/// Resolves identities for the parse layer. The admin flag is read from
/// here on every call, so a promotion takes effect without reissuing the
/// credential.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn identity_by_id(&self, id: UserId) -> anyhow::Result<Option<Identity>>;
}

/// Non-blocking credential parse.
///
/// Attaches the resolved identity when the bearer token is valid, the
/// identity still exists, and its email matches the token subject. In every
/// other case the context stays unauthenticated; rejection is the next
/// layer's job.
pub struct CredentialParseLayer<L> {
    credentials: CredentialService,
    lookup: L,
}

impl<L: IdentityLookup> CredentialParseLayer<L> {
    pub fn new(credentials: CredentialService, lookup: L) -> Self {
        Self {
            credentials,
            lookup,
        }
    }
}

#[async_trait]
impl<L: IdentityLookup> GateLayer for CredentialParseLayer<L> {
    async fn apply(&self, request: &GateRequest, ctx: CallContext) -> Result<Step, GateError> {
        let Some(header) = request.authorization.as_deref() else {
            return Ok(Step::Continue(ctx));
        };

        let claims = match self.credentials.validate(extract_bearer(header)) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(path = %request.path, error = %e, "credential rejected");
                return Ok(Step::Continue(ctx));
            }
        };

        let identity = self
            .lookup
            .identity_by_id(claims.user_id())
            .await
            .map_err(GateError::Lookup)?;

        match identity {
            Some(identity) if identity.email == claims.sub => {
                Ok(Step::Continue(CallContext::Authenticated {
                    user_id: identity.id,
                    email: identity.email,
                    is_admin: identity.is_admin,
                }))
            }
            _ => {
                debug!(path = %request.path, user_id = claims.user_id, "credential subject mismatch or identity gone");
                Ok(Step::Continue(ctx))
            }
        }
    }
}

/// The blocking decision layer.
///
/// Allow-listed routes pass regardless of context. Everything else needs an
/// authenticated context, and admin-prefixed routes additionally need the
/// admin flag.
pub struct AccessGateLayer;

#[async_trait]
impl GateLayer for AccessGateLayer {
    async fn apply(&self, request: &GateRequest, ctx: CallContext) -> Result<Step, GateError> {
        if ALLOW_LISTED_PATHS.contains(&request.path.as_str()) {
            return Ok(Step::Continue(ctx));
        }

        if !ctx.is_authenticated() {
            return Ok(Step::Halt(GateError::AuthenticationRequired));
        }

        let is_admin_route = ADMIN_PATH_PREFIXES
            .iter()
            .any(|p| request.path.starts_with(p));
        if is_admin_route {
            let admin = matches!(&ctx, CallContext::Authenticated { is_admin: true, .. });
            if !admin {
                return Ok(Step::Halt(GateError::PermissionDenied));
            }
        }

        Ok(Step::Continue(ctx))
    }
}

/// The assembled gate: layers applied in order over a fresh context.
pub struct Gate {
    layers: Vec<Box<dyn GateLayer>>,
}

impl Gate {
    /// The standard two-layer chain.
    pub fn standard<L: IdentityLookup + 'static>(
        credentials: CredentialService,
        lookup: L,
    ) -> Self {
        Self {
            layers: vec![
                Box::new(CredentialParseLayer::new(credentials, lookup)),
                Box::new(AccessGateLayer),
            ],
        }
    }

    pub fn from_layers(layers: Vec<Box<dyn GateLayer>>) -> Self {
        Self { layers }
    }

    /// Run the chain. Returns the final context on success.
    pub async fn authorize(&self, request: &GateRequest) -> Result<CallContext, GateError> {
        let mut ctx = CallContext::Unauthenticated;
        for layer in &self.layers {
            match layer.apply(request, ctx).await? {
                Step::Continue(next) => ctx = next,
                Step::Halt(e) => return Err(e),
            }
        }
        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::CredentialConfig;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct MapLookup(HashMap<i64, Identity>);

    #[async_trait]
    impl IdentityLookup for MapLookup {
        async fn identity_by_id(&self, id: UserId) -> anyhow::Result<Option<Identity>> {
            Ok(self.0.get(&id.get()).cloned())
        }
    }

    #[async_trait]
    impl IdentityLookup for Arc<MapLookup> {
        async fn identity_by_id(&self, id: UserId) -> anyhow::Result<Option<Identity>> {
            self.as_ref().identity_by_id(id).await
        }
    }

    fn identity(id: i64, email: &str, is_admin: bool) -> Identity {
        Identity {
            id: UserId::new(id),
            email: email.into(),
            display_name: email.split('@').next().unwrap().into(),
            password_hash: String::new(),
            is_admin,
            created_at: 0,
        }
    }

    fn harness() -> (CredentialService, Gate) {
        let config = CredentialConfig {
            secret: "gate-test-secret".into(),
            ..CredentialConfig::default()
        };
        let mut users = HashMap::new();
        users.insert(10, identity(10, "owner@example.com", false));
        users.insert(99, identity(99, "admin@example.com", true));
        let lookup = Arc::new(MapLookup(users));
        let gate = Gate::standard(CredentialService::new(&config).unwrap(), lookup);
        (CredentialService::new(&config).unwrap(), gate)
    }

    #[tokio::test]
    async fn test_allow_listed_paths_pass_without_credential() {
        let (_, gate) = harness();
        for path in ALLOW_LISTED_PATHS {
            let ctx = gate
                .authorize(&GateRequest::new(*path, None))
                .await
                .unwrap();
            assert_eq!(ctx, CallContext::Unauthenticated);
        }
    }

    #[tokio::test]
    async fn test_allow_list_is_exact_not_prefix() {
        let (_, gate) = harness();
        let err = gate
            .authorize(&GateRequest::new("/api/users/login/extra", None))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_missing_credential_rejected() {
        let (_, gate) = harness();
        let err = gate
            .authorize(&GateRequest::new("/api/recipes/search", None))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_garbled_credential_rejected_as_unauthenticated() {
        let (_, gate) = harness();
        let err = gate
            .authorize(&GateRequest::new(
                "/api/recipes/search",
                Some("Bearer junk".into()),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_valid_credential_attaches_identity() {
        let (svc, gate) = harness();
        let token = svc.issue(UserId::new(10), "owner@example.com").unwrap();
        let ctx = gate
            .authorize(&GateRequest::new(
                "/api/recipes/search",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        let caller = ctx.caller().unwrap();
        assert_eq!(caller.user_id, UserId::new(10));
        assert!(!caller.is_admin);
    }

    #[tokio::test]
    async fn test_admin_route_denied_for_plain_caller() {
        let (svc, gate) = harness();
        let token = svc.issue(UserId::new(10), "owner@example.com").unwrap();
        let err = gate
            .authorize(&GateRequest::new(
                "/api/recipes/admin/all",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::PermissionDenied));
    }

    #[tokio::test]
    async fn test_admin_route_allowed_for_admin() {
        let (svc, gate) = harness();
        let token = svc.issue(UserId::new(99), "admin@example.com").unwrap();
        let ctx = gate
            .authorize(&GateRequest::new(
                "/api/users/admin/list",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert!(ctx.caller().unwrap().is_admin);
    }

    #[tokio::test]
    async fn test_subject_mismatch_leaves_context_unauthenticated() {
        let (svc, gate) = harness();
        // Token carries id 10 but a subject that no longer matches.
        let token = svc.issue(UserId::new(10), "old-email@example.com").unwrap();
        let err = gate
            .authorize(&GateRequest::new(
                "/api/recipes/search",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_unknown_identity_leaves_context_unauthenticated() {
        let (svc, gate) = harness();
        let token = svc.issue(UserId::new(404), "ghost@example.com").unwrap();
        let err = gate
            .authorize(&GateRequest::new(
                "/api/recipes/search",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, GateError::AuthenticationRequired));
    }

    #[tokio::test]
    async fn test_allow_listed_path_still_sees_identity() {
        let (svc, gate) = harness();
        let token = svc.issue(UserId::new(10), "owner@example.com").unwrap();
        let ctx = gate
            .authorize(&GateRequest::new(
                "/api/users/login",
                Some(format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert!(ctx.is_authenticated());
    }
}
