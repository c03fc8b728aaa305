//! # Ladle Policy
//!
//! The access policy for recipes: pure decision functions over a caller and
//! a recipe, plus the visibility scope injected into search.
//!
//! ## The model
//!
//! - A recipe is visible when it is public, when the caller owns it, or
//!   when the caller is an admin.
//! - A recipe is mutable only by its owner or an admin.
//!
//! Decisions here are pure and idempotent. Bulk filtering never happens
//! post-fetch: [`VisibilityScope`] carries the same rule into the query
//! layer so pagination counts stay correct.

pub mod error;
pub mod policy;

pub use error::{PolicyError, Result};
pub use policy::{can_mutate, can_read, ensure_mutate, ensure_read, Caller, VisibilityScope};
