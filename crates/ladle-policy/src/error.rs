//! Error types for the policy module.

use thiserror::Error;

use ladle_core::RecipeId;

/// Errors raised when a policy check fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// The caller may not read this recipe.
    #[error("permission denied: recipe {0} is not visible to the caller")]
    NotVisible(RecipeId),

    /// The caller may not mutate this recipe (owner or admin only).
    #[error("permission denied: only the owner or an admin may modify recipe {0}")]
    NotMutable(RecipeId),
}

/// Result type for policy checks.
pub type Result<T> = std::result::Result<T, PolicyError>;
