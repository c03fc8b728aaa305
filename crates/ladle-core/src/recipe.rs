//! Recipe aggregate values.
//!
//! A [`Recipe`] together with its [`Ingredient`] and [`Step`] children forms
//! one consistency unit. Children are exclusively owned by their parent:
//! they are created with it, fully replaced on update, and deleted with it.
//!
//! Ordering fields (`sort_order`, `step_number`) are caller-supplied and
//! preserved verbatim; the store never renumbers them.

use serde::{Deserialize, Serialize};

use crate::types::{Difficulty, RecipeId, UserId};

/// The recipe aggregate root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub views: i64,
    pub likes: i64,
    /// Optimistic concurrency counter, bumped on every update.
    pub version: i64,
    /// Unix milliseconds.
    pub created_at: i64,
    /// Unix milliseconds.
    pub updated_at: i64,
}

impl Recipe {
    /// Build a new value with the draft's fields applied and the version
    /// counter bumped. `self` is left untouched; updates are explicit,
    /// named operations that return new values.
    pub fn apply_draft(&self, draft: &RecipeDraft, now: i64) -> Recipe {
        Recipe {
            id: self.id,
            owner_id: self.owner_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            difficulty: draft.difficulty,
            category: draft.category.clone(),
            tags: draft.tags.clone(),
            is_private: draft.is_private.unwrap_or(self.is_private),
            views: self.views,
            likes: self.likes,
            version: self.version + 1,
            created_at: self.created_at,
            updated_at: now,
        }
    }
}

/// Caller-supplied recipe fields, before the store has assigned identity.
///
/// `is_private` defaults to false on create when unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_private: Option<bool>,
}

/// An ingredient row, owned by exactly one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub recipe_id: RecipeId,
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: String,
    pub note: String,
    pub sort_order: i32,
}

/// Caller-supplied ingredient fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// A preparation step, owned by exactly one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: i64,
    pub recipe_id: RecipeId,
    pub step_number: i32,
    pub description: String,
    pub image_url: String,
    pub timer_minutes: Option<i64>,
    pub sort_order: i32,
}

/// Caller-supplied step fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDraft {
    pub step_number: i32,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub timer_minutes: Option<i64>,
    #[serde(default)]
    pub sort_order: i32,
}

/// A recipe with its children, read back in order: ingredients by
/// `sort_order` ascending, steps by `step_number` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeAggregate {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
}
