//! Store traits: the abstract interface for identity and recipe persistence.
//!
//! These traits keep the service layer storage-agnostic. The primary
//! implementation is SQLite; tests use the same implementation against an
//! in-memory database.

use async_trait::async_trait;

use ladle_core::{
    Identity, IngredientDraft, Page, Recipe, RecipeAggregate, RecipeDraft, RecipeId, StepDraft,
    UserId,
};
use ladle_policy::VisibilityScope;

use crate::error::Result;
use crate::query::RecipeQuery;

/// Async interface for identity persistence.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert a new identity. The password hash must already be computed.
    ///
    /// Returns [`crate::StoreError::EmailTaken`] when the email is in use.
    async fn insert_identity(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
        created_at: i64,
    ) -> Result<Identity>;

    async fn identity_by_email(&self, email: &str) -> Result<Option<Identity>>;

    async fn identity_by_id(&self, id: UserId) -> Result<Option<Identity>>;

    /// Flip the admin flag. Takes effect on the caller's next request; no
    /// credential reissue is needed.
    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<()>;
}

/// Async interface for recipe aggregate persistence.
///
/// # Design Notes
///
/// - **Atomic aggregates**: create and replace write the parent and all
///   children in one transaction; a failure leaves no partial aggregate.
/// - **Replace, not merge**: updates delete every existing child row and
///   insert the caller's lists. Child ids are fresh after every update.
/// - **Optimistic concurrency**: replace checks the version counter read by
///   the caller and fails with `Conflict` when another writer got there
///   first.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Create a recipe with its children. Returns the stored aggregate with
    /// assigned ids, zeroed counters, and version 0.
    async fn create_recipe(
        &self,
        owner: UserId,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
        now: i64,
    ) -> Result<RecipeAggregate>;

    /// Fetch a recipe with its children, ingredients ordered by sort_order
    /// and steps by step_number.
    async fn fetch_aggregate(&self, id: RecipeId) -> Result<Option<RecipeAggregate>>;

    /// Replace the recipe's fields and all of its children atomically.
    ///
    /// `expected_version` is the version the caller read; a mismatch fails
    /// with `Conflict` and writes nothing.
    async fn replace_recipe(
        &self,
        id: RecipeId,
        expected_version: i64,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
        now: i64,
    ) -> Result<RecipeAggregate>;

    /// Delete the recipe and all of its children. Returns false when the
    /// recipe does not exist.
    async fn delete_recipe(&self, id: RecipeId) -> Result<bool>;

    /// Run a paginated search under the given visibility scope.
    ///
    /// The page and the total count come from one predicate assembly and
    /// one snapshot, so they cannot drift apart.
    async fn search(&self, query: &RecipeQuery, scope: VisibilityScope) -> Result<Page<Recipe>>;

    /// Atomic in-database counter bump; never read-modify-write.
    async fn increment_views(&self, id: RecipeId) -> Result<()>;

    /// Atomic in-database counter bump; never read-modify-write.
    async fn increment_likes(&self, id: RecipeId) -> Result<()>;
}
