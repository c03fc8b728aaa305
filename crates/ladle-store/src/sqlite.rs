//! SQLite implementation of the store traits.
//!
//! This is the primary storage backend for Ladle. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. Aggregate
//! writes run inside IMMEDIATE transactions so the write lock is taken up
//! front and the version check cannot be invalidated mid-transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, TransactionBehavior};

use async_trait::async_trait;

use ladle_core::{
    Difficulty, Identity, Ingredient, IngredientDraft, Page, Recipe, RecipeAggregate, RecipeDraft,
    RecipeId, Step, StepDraft, UserId,
};
use ladle_policy::VisibilityScope;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::query::{count_sql, data_sql, where_clause, RecipeQuery};
use crate::traits::{IdentityStore, RecipeStore};

/// Default deadline for a search query.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    search_timeout: Duration,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        })
    }

    /// Override the search deadline.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }
}

fn lock_poisoned(detail: String) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
        Some(format!("mutex poisoned: {}", detail)),
    ))
}

fn join_failed(e: tokio::task::JoinError) -> StoreError {
    StoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
        Some(format!("spawn_blocking failed: {}", e)),
    ))
}

// Helper to convert a row to Recipe. Column order must match data_sql and
// the read-back SELECTs below.
fn row_to_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let difficulty_str: String = row.get("difficulty")?;
    let difficulty: Difficulty = difficulty_str.parse().map_err(|_| {
        rusqlite::Error::InvalidColumnType(4, "difficulty".into(), rusqlite::types::Type::Text)
    })?;

    let tags_json: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();

    Ok(Recipe {
        id: RecipeId::new(row.get("id")?),
        owner_id: UserId::new(row.get("owner_id")?),
        title: row.get("title")?,
        description: row.get("description")?,
        difficulty,
        category: row.get("category")?,
        tags,
        is_private: row.get::<_, i64>("is_private")? != 0,
        views: row.get("views")?,
        likes: row.get("likes")?,
        version: row.get("version")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_ingredient(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ingredient> {
    Ok(Ingredient {
        id: row.get("id")?,
        recipe_id: RecipeId::new(row.get("recipe_id")?),
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        unit: row.get("unit")?,
        note: row.get("note")?,
        sort_order: row.get("sort_order")?,
    })
}

fn row_to_step(row: &rusqlite::Row<'_>) -> rusqlite::Result<Step> {
    Ok(Step {
        id: row.get("id")?,
        recipe_id: RecipeId::new(row.get("recipe_id")?),
        step_number: row.get("step_number")?,
        description: row.get("description")?,
        image_url: row.get("image_url")?,
        timer_minutes: row.get("timer_minutes")?,
        sort_order: row.get("sort_order")?,
    })
}

fn row_to_identity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Identity> {
    Ok(Identity {
        id: UserId::new(row.get("id")?),
        email: row.get("email")?,
        display_name: row.get("display_name")?,
        password_hash: row.get("password_hash")?,
        is_admin: row.get::<_, i64>("is_admin")? != 0,
        created_at: row.get("created_at")?,
    })
}

/// Read the full aggregate for a recipe id, children in their declared
/// read-back order.
fn read_aggregate(conn: &Connection, id: RecipeId) -> Result<Option<RecipeAggregate>> {
    let recipe = conn
        .query_row(
            "SELECT id, owner_id, title, description, difficulty, category, tags,
                    is_private, views, likes, version, created_at, updated_at
             FROM recipes WHERE id = ?1",
            params![id.get()],
            row_to_recipe,
        )
        .optional()?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT id, recipe_id, name, quantity, unit, note, sort_order
         FROM ingredients WHERE recipe_id = ?1 ORDER BY sort_order, id",
    )?;
    let ingredients = stmt
        .query_map(params![id.get()], row_to_ingredient)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT id, recipe_id, step_number, description, image_url, timer_minutes, sort_order
         FROM steps WHERE recipe_id = ?1 ORDER BY step_number, id",
    )?;
    let steps = stmt
        .query_map(params![id.get()], row_to_step)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Some(RecipeAggregate {
        recipe,
        ingredients,
        steps,
    }))
}

/// Insert child rows for a recipe. Ordering fields are stored verbatim.
fn insert_children(
    conn: &Connection,
    id: RecipeId,
    ingredients: &[IngredientDraft],
    steps: &[StepDraft],
) -> Result<()> {
    let mut ing_stmt = conn.prepare(
        "INSERT INTO ingredients (recipe_id, name, quantity, unit, note, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for ing in ingredients {
        ing_stmt.execute(params![
            id.get(),
            &ing.name,
            ing.quantity,
            &ing.unit,
            &ing.note,
            ing.sort_order,
        ])?;
    }

    let mut step_stmt = conn.prepare(
        "INSERT INTO steps (recipe_id, step_number, description, image_url, timer_minutes, sort_order)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for step in steps {
        step_stmt.execute(params![
            id.get(),
            step.step_number,
            &step.description,
            &step.image_url,
            step.timer_minutes,
            step.sort_order,
        ])?;
    }

    Ok(())
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn insert_identity(
        &self,
        email: &str,
        display_name: &str,
        password_hash: &str,
        created_at: i64,
    ) -> Result<Identity> {
        let email = email.to_string();
        let display_name = display_name.to_string();
        let password_hash = password_hash.to_string();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let res = conn.execute(
                "INSERT INTO users (email, display_name, password_hash, is_admin, created_at)
                 VALUES (?1, ?2, ?3, 0, ?4)",
                params![&email, &display_name, &password_hash, created_at],
            );
            if let Err(rusqlite::Error::SqliteFailure(e, _)) = &res {
                if e.code == rusqlite::ErrorCode::ConstraintViolation {
                    return Err(StoreError::EmailTaken(email));
                }
            }
            res?;

            let id = conn.last_insert_rowid();
            Ok(Identity {
                id: UserId::new(id),
                email,
                display_name,
                password_hash,
                is_admin: false,
                created_at,
            })
        })
        .await
        .map_err(join_failed)?
    }

    async fn identity_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let email = email.to_string();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            conn.query_row(
                "SELECT id, email, display_name, password_hash, is_admin, created_at
                 FROM users WHERE email = ?1",
                params![&email],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
        .map_err(join_failed)?
    }

    async fn identity_by_id(&self, id: UserId) -> Result<Option<Identity>> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            conn.query_row(
                "SELECT id, email, display_name, password_hash, is_admin, created_at
                 FROM users WHERE id = ?1",
                params![id.get()],
                row_to_identity,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
        .map_err(join_failed)?
    }

    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<()> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let changed = conn.execute(
                "UPDATE users SET is_admin = ?2 WHERE id = ?1",
                params![id.get(), is_admin as i64],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("user {}", id)));
            }
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }
}

#[async_trait]
impl RecipeStore for SqliteStore {
    async fn create_recipe(
        &self,
        owner: UserId,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
        now: i64,
    ) -> Result<RecipeAggregate> {
        let draft = draft.clone();
        let ingredients = ingredients.to_vec();
        let steps = steps.to_vec();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let tags_json =
                serde_json::to_string(&draft.tags).map_err(|e| StoreError::InvalidData(e.to_string()))?;

            tx.execute(
                "INSERT INTO recipes (owner_id, title, description, difficulty, category, tags,
                                      is_private, views, likes, version, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, 0, 0, ?8, ?8)",
                params![
                    owner.get(),
                    &draft.title,
                    &draft.description,
                    draft.difficulty.as_str(),
                    &draft.category,
                    &tags_json,
                    draft.is_private.unwrap_or(false) as i64,
                    now,
                ],
            )?;

            let id = RecipeId::new(tx.last_insert_rowid());
            insert_children(&tx, id, &ingredients, &steps)?;

            let aggregate = read_aggregate(&tx, id)?
                .ok_or_else(|| StoreError::NotFound(format!("recipe {}", id)))?;

            tx.commit()?;
            Ok(aggregate)
        })
        .await
        .map_err(join_failed)?
    }

    async fn fetch_aggregate(&self, id: RecipeId) -> Result<Option<RecipeAggregate>> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;
            read_aggregate(&conn, id)
        })
        .await
        .map_err(join_failed)?
    }

    async fn replace_recipe(
        &self,
        id: RecipeId,
        expected_version: i64,
        draft: &RecipeDraft,
        ingredients: &[IngredientDraft],
        steps: &[StepDraft],
        now: i64,
    ) -> Result<RecipeAggregate> {
        let draft = draft.clone();
        let ingredients = ingredients.to_vec();
        let steps = steps.to_vec();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let current = tx
                .query_row(
                    "SELECT id, owner_id, title, description, difficulty, category, tags,
                            is_private, views, likes, version, created_at, updated_at
                     FROM recipes WHERE id = ?1",
                    params![id.get()],
                    row_to_recipe,
                )
                .optional()?;

            let current =
                current.ok_or_else(|| StoreError::NotFound(format!("recipe {}", id)))?;
            if current.version != expected_version {
                return Err(StoreError::Conflict {
                    recipe_id: id.get(),
                    expected: expected_version,
                    actual: current.version,
                });
            }

            // The version bump and privacy carry-over live in apply_draft;
            // the row is written from the resulting value. The IMMEDIATE
            // transaction holds the write lock, so writing the absolute
            // version is race-free.
            let updated = current.apply_draft(&draft, now);

            let tags_json = serde_json::to_string(&updated.tags)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;

            tx.execute(
                "UPDATE recipes SET title = ?2, description = ?3, difficulty = ?4,
                        category = ?5, tags = ?6, is_private = ?7,
                        version = ?8, updated_at = ?9
                 WHERE id = ?1",
                params![
                    id.get(),
                    &updated.title,
                    &updated.description,
                    updated.difficulty.as_str(),
                    &updated.category,
                    &tags_json,
                    updated.is_private as i64,
                    updated.version,
                    updated.updated_at,
                ],
            )?;

            // Replace, not merge: drop every existing child row.
            tx.execute("DELETE FROM ingredients WHERE recipe_id = ?1", params![id.get()])?;
            tx.execute("DELETE FROM steps WHERE recipe_id = ?1", params![id.get()])?;
            insert_children(&tx, id, &ingredients, &steps)?;

            let aggregate = read_aggregate(&tx, id)?
                .ok_or_else(|| StoreError::NotFound(format!("recipe {}", id)))?;

            tx.commit()?;
            Ok(aggregate)
        })
        .await
        .map_err(join_failed)?
    }

    async fn delete_recipe(&self, id: RecipeId) -> Result<bool> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            // Children first; the FK cascade would also cover this, but the
            // deletes are explicit so the aggregate boundary reads off the code.
            tx.execute("DELETE FROM ingredients WHERE recipe_id = ?1", params![id.get()])?;
            tx.execute("DELETE FROM steps WHERE recipe_id = ?1", params![id.get()])?;
            let deleted = tx.execute("DELETE FROM recipes WHERE id = ?1", params![id.get()])?;

            tx.commit()?;
            Ok(deleted > 0)
        })
        .await
        .map_err(join_failed)?
    }

    async fn search(&self, query: &RecipeQuery, scope: VisibilityScope) -> Result<Page<Recipe>> {
        let query = query.clone();
        let conn = self.conn.clone();

        let task = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let (where_sql, params) = where_clause(&query, scope);

            let total: u64 = conn.query_row(
                &count_sql(&where_sql),
                params_from_iter(params.iter()),
                |row| row.get::<_, i64>(0).map(|v| v as u64),
            )?;

            // Clamp before the cast: a wrapped-negative OFFSET would make
            // SQLite serve page zero instead of an empty page.
            let offset = query.page.offset().min(i64::MAX as u64) as i64;

            let mut data_params = params;
            data_params.push(rusqlite::types::Value::Integer(query.page.page_size as i64));
            data_params.push(rusqlite::types::Value::Integer(offset));

            let mut stmt = conn.prepare(&data_sql(&where_sql))?;
            let items = stmt
                .query_map(params_from_iter(data_params.iter()), row_to_recipe)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(Page {
                items,
                total,
                page: query.page.page,
                page_size: query.page.page_size,
            })
        });

        match tokio::time::timeout(self.search_timeout, task).await {
            Ok(joined) => joined.map_err(join_failed)?,
            Err(_) => Err(StoreError::Timeout),
        }
    }

    async fn increment_views(&self, id: RecipeId) -> Result<()> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let changed = conn.execute(
                "UPDATE recipes SET views = views + 1 WHERE id = ?1",
                params![id.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("recipe {}", id)));
            }
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }

    async fn increment_likes(&self, id: RecipeId) -> Result<()> {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|e| lock_poisoned(e.to_string()))?;

            let changed = conn.execute(
                "UPDATE recipes SET likes = likes + 1 WHERE id = ?1",
                params![id.get()],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound(format!("recipe {}", id)));
            }
            Ok(())
        })
        .await
        .map_err(join_failed)?
    }
}
