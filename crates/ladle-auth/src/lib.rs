//! # Ladle Auth
//!
//! Stateless signed credentials and the per-call authorization gate.
//!
//! ## Credentials
//!
//! A credential is a compact HS256-signed token carrying the subject email,
//! the user id, the issuer, and the issue/expiry instants. Verification is
//! stateless: no session table exists, and a credential cannot be revoked
//! before its natural expiry (logout is client-local only).
//!
//! ## The gate
//!
//! Authorization runs as an explicit, ordered chain of typed layers over a
//! per-call [`CallContext`]:
//!
//! 1. [`CredentialParseLayer`] - attaches the resolved identity when a
//!    valid bearer credential is present; never rejects on its own.
//! 2. [`AccessGateLayer`] - rejects unauthenticated calls outside the
//!    login/register allow-list, and non-admin calls to admin routes.
//!
//! Context is per-call only and passed explicitly; there is no ambient
//! "current caller" state.

pub mod credential;
pub mod error;
pub mod gate;
pub mod password;

pub use credential::{extract_bearer, Claims, CredentialConfig, CredentialService};
pub use error::{CredentialError, GateError, PasswordError};
pub use gate::{
    AccessGateLayer, CallContext, CredentialParseLayer, Gate, GateLayer, GateRequest,
    IdentityLookup, Step, ADMIN_PATH_PREFIXES, ALLOW_LISTED_PATHS,
};
pub use password::{hash_password, verify_password};
