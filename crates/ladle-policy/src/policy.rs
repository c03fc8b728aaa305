//! Pure access decisions.

use serde::{Deserialize, Serialize};

use ladle_core::{Recipe, UserId};

use crate::error::{PolicyError, Result};

/// The resolved caller of an operation, as attached by the authorization
/// gate. Always passed explicitly; never stored in a global slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Caller {
    pub const fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub const fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

/// The visibility restriction a search query must carry.
///
/// All three modes flow through the same predicate engine; this value is
/// the only thing that differs between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    /// Admin override: no visibility restriction.
    Unrestricted,
    /// Public recipes plus the caller's own private ones.
    CallerScoped(UserId),
    /// Public recipes only (unauthenticated consumers).
    PublicOnly,
}

impl VisibilityScope {
    /// Derive the scope for a caller, or the public-only scope when there
    /// is none.
    pub fn for_caller(caller: Option<&Caller>) -> Self {
        match caller {
            Some(c) if c.is_admin => VisibilityScope::Unrestricted,
            Some(c) => VisibilityScope::CallerScoped(c.user_id),
            None => VisibilityScope::PublicOnly,
        }
    }

    /// Evaluate the scope against a single recipe. This is the in-memory
    /// twin of the SQL fragment the query layer emits.
    pub fn permits(&self, recipe: &Recipe) -> bool {
        match self {
            VisibilityScope::Unrestricted => true,
            VisibilityScope::CallerScoped(user_id) => {
                !recipe.is_private || recipe.owner_id == *user_id
            }
            VisibilityScope::PublicOnly => !recipe.is_private,
        }
    }
}

/// visible(c, r) ⇔ !r.is_private ∨ c.id = r.owner_id ∨ c.is_admin
pub fn can_read(caller: &Caller, recipe: &Recipe) -> bool {
    !recipe.is_private || recipe.owner_id == caller.user_id || caller.is_admin
}

/// mutable(c, r) ⇔ c.id = r.owner_id ∨ c.is_admin
pub fn can_mutate(caller: &Caller, recipe: &Recipe) -> bool {
    recipe.owner_id == caller.user_id || caller.is_admin
}

/// Fail-fast form of [`can_read`] for single-item fetches.
pub fn ensure_read(caller: &Caller, recipe: &Recipe) -> Result<()> {
    if can_read(caller, recipe) {
        Ok(())
    } else {
        Err(PolicyError::NotVisible(recipe.id))
    }
}

/// Fail-fast form of [`can_mutate`].
pub fn ensure_mutate(caller: &Caller, recipe: &Recipe) -> Result<()> {
    if can_mutate(caller, recipe) {
        Ok(())
    } else {
        Err(PolicyError::NotMutable(recipe.id))
    }
}
