//! The Ladle service: unified API over credentials, the gate, access
//! policy, and storage.
//!
//! Every operation takes the caller explicitly. Operations that serve
//! anonymous consumers take `Option<&Caller>`; the rest require one, which
//! the authorization gate produces per call.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use ladle_auth::{
    hash_password, verify_password, CredentialConfig, CredentialService, Gate, GateRequest,
    IdentityLookup, PasswordError,
};
use ladle_core::{
    now_millis, validate_identity, validate_recipe_draft, Identity, IngredientDraft, NewIdentity,
    Page, PageRequest, Recipe, RecipeAggregate, RecipeDraft, RecipeId, StepDraft, UserId,
};
use ladle_policy::{ensure_mutate, ensure_read, Caller, VisibilityScope};
use ladle_store::{IdentityStore, RecipeQuery, RecipeStore, SqliteStore};

use crate::error::{LadleError, Result};

pub use ladle_auth::CallContext;

/// Configuration for the Ladle service.
#[derive(Debug, Clone)]
pub struct LadleConfig {
    /// Credential signing configuration.
    pub credentials: CredentialConfig,
    /// Deadline for search queries. Applied when Ladle opens its own store.
    pub search_timeout: Duration,
}

impl Default for LadleConfig {
    fn default() -> Self {
        Self {
            credentials: CredentialConfig::default(),
            search_timeout: ladle_store::DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

/// A successful login: the signed credential plus the identity it names.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub token: String,
    pub identity: Identity,
}

/// Adapter feeding the gate's identity lookups from the store.
struct StoreLookup<S>(Arc<S>);

#[async_trait::async_trait]
impl<S: IdentityStore + 'static> IdentityLookup for StoreLookup<S> {
    async fn identity_by_id(&self, id: UserId) -> anyhow::Result<Option<Identity>> {
        self.0.identity_by_id(id).await.map_err(anyhow::Error::from)
    }
}

/// The main service struct.
pub struct Ladle<S> {
    store: Arc<S>,
    credentials: CredentialService,
    gate: Gate,
}

impl Ladle<SqliteStore> {
    /// Open a file-backed service instance.
    pub fn open(path: impl AsRef<std::path::Path>, config: LadleConfig) -> Result<Self> {
        let store = SqliteStore::open(path)?.with_search_timeout(config.search_timeout);
        Self::new(store, config)
    }

    /// Open an in-memory service instance. Useful for testing.
    pub fn open_memory(config: LadleConfig) -> Result<Self> {
        let store = SqliteStore::open_memory()?.with_search_timeout(config.search_timeout);
        Self::new(store, config)
    }
}

impl<S: IdentityStore + RecipeStore + 'static> Ladle<S> {
    /// Create a service over an already-built store.
    pub fn new(store: S, config: LadleConfig) -> Result<Self> {
        let store = Arc::new(store);
        let credentials = CredentialService::new(&config.credentials)?;
        let gate = Gate::standard(credentials.clone(), StoreLookup(store.clone()));
        Ok(Self {
            store,
            credentials,
            gate,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────
    // Identity Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Register a new identity.
    pub async fn register(&self, input: &NewIdentity) -> Result<Identity> {
        validate_identity(input)?;
        let hash =
            hash_password(&input.password).map_err(|e| LadleError::PasswordHash(e.to_string()))?;
        let identity = self
            .store
            .insert_identity(&input.email, &input.display_name, &hash, now_millis())
            .await?;
        info!(user_id = %identity.id, "identity registered");
        Ok(identity)
    }

    /// Verify credentials and issue a signed token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginSession> {
        let identity = self
            .store
            .identity_by_email(email)
            .await?
            .ok_or(LadleError::InvalidCredentials)?;

        match verify_password(password, &identity.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(LadleError::InvalidCredentials),
            Err(e) => return Err(LadleError::PasswordHash(e.to_string())),
        }

        let token = self.credentials.issue(identity.id, &identity.email)?;
        Ok(LoginSession { token, identity })
    }

    /// Run the authorization gate for an incoming call.
    pub async fn authorize(&self, request: &GateRequest) -> Result<CallContext> {
        Ok(self.gate.authorize(request).await?)
    }

    /// Flip another identity's admin flag. Admin-only.
    pub async fn set_admin(&self, caller: &Caller, target: UserId, is_admin: bool) -> Result<()> {
        if !caller.is_admin {
            return Err(LadleError::AdminRequired);
        }
        self.store.set_admin(target, is_admin).await?;
        info!(%target, is_admin, "admin flag changed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Recipe Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Create a recipe aggregate owned by the caller.
    pub async fn create_recipe(
        &self,
        caller: &Caller,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
    ) -> Result<RecipeAggregate> {
        validate_recipe_draft(draft, ingredients, steps)?;
        let aggregate = self
            .store
            .create_recipe(caller.user_id, draft, ingredients, steps, now_millis())
            .await?;
        info!(recipe_id = %aggregate.recipe.id, owner = %caller.user_id, "recipe created");
        Ok(aggregate)
    }

    /// Fetch a recipe aggregate and count the view.
    ///
    /// Visibility is checked before the counter moves, so a denied fetch
    /// leaves no trace.
    pub async fn get_recipe(
        &self,
        caller: Option<&Caller>,
        id: RecipeId,
    ) -> Result<RecipeAggregate> {
        let mut aggregate = self
            .store
            .fetch_aggregate(id)
            .await?
            .ok_or(LadleError::RecipeNotFound(id))?;

        self.check_read(caller, &aggregate.recipe)?;

        self.store.increment_views(id).await?;
        aggregate.recipe.views += 1;
        Ok(aggregate)
    }

    /// Replace a recipe's fields and children. Owner or admin only.
    pub async fn update_recipe(
        &self,
        caller: &Caller,
        id: RecipeId,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
    ) -> Result<RecipeAggregate> {
        validate_recipe_draft(draft, ingredients, steps)?;

        let current = self
            .store
            .fetch_aggregate(id)
            .await?
            .ok_or(LadleError::RecipeNotFound(id))?;
        ensure_mutate(caller, &current.recipe)?;

        let updated = self
            .store
            .replace_recipe(
                id,
                current.recipe.version,
                draft,
                ingredients,
                steps,
                now_millis(),
            )
            .await?;
        info!(recipe_id = %id, version = updated.recipe.version, "recipe updated");
        Ok(updated)
    }

    /// Delete a recipe and its children. Owner or admin only.
    pub async fn delete_recipe(&self, caller: &Caller, id: RecipeId) -> Result<()> {
        let current = self
            .store
            .fetch_aggregate(id)
            .await?
            .ok_or(LadleError::RecipeNotFound(id))?;
        ensure_mutate(caller, &current.recipe)?;

        self.store.delete_recipe(id).await?;
        info!(recipe_id = %id, "recipe deleted");
        Ok(())
    }

    /// Paginated search under the caller's visibility scope.
    pub async fn search(&self, caller: Option<&Caller>, query: &RecipeQuery) -> Result<Page<Recipe>> {
        let scope = VisibilityScope::for_caller(caller);
        Ok(self.store.search(query, scope).await?)
    }

    /// List one owner's recipes, still scoped by the caller's visibility:
    /// other callers see only the owner's public recipes.
    pub async fn list_by_owner(
        &self,
        caller: Option<&Caller>,
        owner: UserId,
        page: PageRequest,
    ) -> Result<Page<Recipe>> {
        let query = RecipeQuery::new(page).owner(owner);
        self.search(caller, &query).await
    }

    /// Count a like. Visibility applies: the caller must be able to see
    /// the recipe.
    pub async fn like_recipe(&self, caller: &Caller, id: RecipeId) -> Result<()> {
        let current = self
            .store
            .fetch_aggregate(id)
            .await?
            .ok_or(LadleError::RecipeNotFound(id))?;
        ensure_read(caller, &current.recipe)?;

        self.store.increment_likes(id).await?;
        Ok(())
    }

    fn check_read(&self, caller: Option<&Caller>, recipe: &Recipe) -> Result<()> {
        match caller {
            Some(caller) => ensure_read(caller, recipe)?,
            None => {
                if recipe.is_private {
                    return Err(LadleError::Policy(ladle_policy::PolicyError::NotVisible(
                        recipe.id,
                    )));
                }
            }
        }
        Ok(())
    }
}
