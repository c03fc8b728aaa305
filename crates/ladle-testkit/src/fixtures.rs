//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an in-memory service with a
//! known signing secret and quick constructors for the recurring cast of
//! callers and drafts.

use ladle::{Caller, CredentialConfig, Ladle, LadleConfig, NewIdentity, SqliteStore};
use ladle_core::{Difficulty, IngredientDraft, RecipeDraft, StepDraft};
use ladle_store::IdentityStore;

/// The signing secret every fixture service uses.
pub const TEST_SECRET: &str = "ladle-testkit-secret";

/// A test harness wrapping an in-memory service.
pub struct TestHarness {
    pub ladle: Ladle<SqliteStore>,
}

impl TestHarness {
    /// Create a harness over a fresh in-memory store.
    pub fn new() -> Self {
        Self {
            ladle: Ladle::open_memory(test_config()).expect("in-memory service"),
        }
    }

    /// Register an identity with the default password and return its caller.
    pub async fn register(&self, email: &str) -> Caller {
        let identity = self
            .ladle
            .register(&NewIdentity {
                email: email.into(),
                display_name: email.split('@').next().unwrap_or(email).into(),
                password: "hunter2".into(),
            })
            .await
            .expect("register");
        Caller::new(identity.id)
    }

    /// Register an identity and promote it directly at the store.
    pub async fn register_admin(&self, email: &str) -> Caller {
        let caller = self.register(email).await;
        self.ladle
            .store()
            .set_admin(caller.user_id, true)
            .await
            .expect("promote");
        Caller::admin(caller.user_id)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixture service configuration.
pub fn test_config() -> LadleConfig {
    LadleConfig {
        credentials: CredentialConfig {
            secret: TEST_SECRET.into(),
            ..CredentialConfig::default()
        },
        ..LadleConfig::default()
    }
}

/// A minimal valid recipe draft.
pub fn recipe_draft(title: &str) -> RecipeDraft {
    RecipeDraft {
        title: title.into(),
        description: String::new(),
        difficulty: Difficulty::Medium,
        category: "dinner".into(),
        tags: vec![],
        is_private: None,
    }
}

/// A small fixed ingredient list in declared order.
pub fn ingredient_drafts() -> Vec<IngredientDraft> {
    ["onion", "garlic", "tomato"]
        .iter()
        .enumerate()
        .map(|(i, name)| IngredientDraft {
            name: (*name).into(),
            quantity: Some(1.0 + i as f64),
            unit: "whole".into(),
            note: String::new(),
            sort_order: i as i32 + 1,
        })
        .collect()
}

/// A small fixed step list in declared order.
pub fn step_drafts() -> Vec<StepDraft> {
    ["chop", "saute", "simmer"]
        .iter()
        .enumerate()
        .map(|(i, desc)| StepDraft {
            step_number: i as i32 + 1,
            description: (*desc).into(),
            image_url: String::new(),
            timer_minutes: if i == 2 { Some(20) } else { None },
            sort_order: i as i32 + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_harness_registers_distinct_callers() {
        let harness = TestHarness::new();
        let a = harness.register("a@example.com").await;
        let b = harness.register("b@example.com").await;
        assert_ne!(a.user_id, b.user_id);
        assert!(!a.is_admin);

        let admin = harness.register_admin("admin@example.com").await;
        assert!(admin.is_admin);
    }
}
