//! Error types for the Ladle service.

use thiserror::Error;

use ladle_auth::{CredentialError, GateError};
use ladle_core::{RecipeId, ValidationError};
use ladle_policy::PolicyError;
use ladle_store::StoreError;

/// Errors that can occur during Ladle operations.
#[derive(Debug, Error)]
pub enum LadleError {
    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Policy rejection.
    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    /// Credential defect.
    #[error("credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Gate rejection.
    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    /// Login failed. Unknown email and wrong password are deliberately
    /// indistinguishable.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The operation requires the admin flag.
    #[error("admin privileges required")]
    AdminRequired,

    /// Recipe not found.
    #[error("recipe not found: {0}")]
    RecipeNotFound(RecipeId),

    /// Password hashing failed. Internal, never a business failure.
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

/// Result type for Ladle operations.
pub type Result<T> = std::result::Result<T, LadleError>;
