//! Error types for credentials and the authorization gate.

use thiserror::Error;

/// Errors from issuing or validating a credential.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The credential's expiry instant has passed.
    #[error("token expired")]
    Expired,

    /// The token cannot be parsed, the signature does not verify, or the
    /// issuer differs from the configured one.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The service was configured with an unusable secret.
    #[error("credential config error: {0}")]
    Config(String),
}

/// Errors from the blocking layer of the authorization gate.
///
/// The two rejection variants travel on different channels by design:
/// `AuthenticationRequired` is reported as a transport-level unauthorized
/// signal, while `PermissionDenied` is a structured business failure the
/// caller inspects in the reply payload.
#[derive(Debug, Error)]
pub enum GateError {
    /// Missing or invalid credential on a route outside the allow-list.
    #[error("authentication required")]
    AuthenticationRequired,

    /// Valid credential, but the route is admin-restricted and the caller
    /// is not an admin.
    #[error("permission denied: admin-restricted route")]
    PermissionDenied,

    /// The identity store failed while resolving the credential. A system
    /// error, never mapped onto a business code.
    #[error("identity lookup failed: {0}")]
    Lookup(#[source] anyhow::Error),
}

impl GateError {
    /// Whether this rejection uses the transport-level unauthorized channel.
    pub fn is_transport_unauthorized(&self) -> bool {
        matches!(self, GateError::AuthenticationRequired)
    }
}

/// Errors from password hashing and verification.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    /// The password does not match the stored hash.
    #[error("password mismatch")]
    Mismatch,
}
