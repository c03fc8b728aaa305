//! # Ladle Core
//!
//! Pure domain primitives for Ladle: identities, recipes, and their ordered
//! child collections.
//!
//! This crate contains no I/O, no storage, no credentials. It is pure
//! computation over domain values.
//!
//! ## Key Types
//!
//! - [`Identity`] - A registered user, with an admin flag
//! - [`Recipe`] - The aggregate root, owned by exactly one identity
//! - [`Ingredient`] / [`Step`] - Ordered children, owned by their recipe
//! - [`Difficulty`] - Closed enum; unrecognized input is a validation error
//! - [`Page`] - A page of results plus the total distinct count
//!
//! ## Immutability
//!
//! Domain values are constructed whole and never mutated in place. Updates
//! go through named operations like [`Recipe::apply_draft`] that return a
//! new value.

pub mod error;
pub mod identity;
pub mod recipe;
pub mod types;
pub mod validation;

pub use error::ValidationError;
pub use identity::{Identity, NewIdentity};
pub use recipe::{
    Ingredient, IngredientDraft, Recipe, RecipeAggregate, RecipeDraft, Step, StepDraft,
};
pub use types::{now_millis, Difficulty, Page, PageRequest, RecipeId, UserId};
pub use validation::{validate_identity, validate_recipe_draft};
