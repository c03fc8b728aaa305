//! # Ladle
//!
//! The unified API for the Ladle recipe backend - identities, signed
//! credentials, a per-call authorization gate, access policy, and atomic
//! recipe aggregates over SQLite.
//!
//! ## Overview
//!
//! - **Identities**: registration with Argon2 password hashing, stateless
//!   HS256 login credentials
//! - **Gate**: a two-layer chain that parses credentials without rejecting,
//!   then enforces the allow-list and admin route prefixes
//! - **Policy**: owner/admin visibility over private recipes, injected into
//!   search as a scope rather than re-implemented per query
//! - **Aggregates**: recipes with ordered ingredient and step children,
//!   written atomically and replaced wholesale on update
//!
//! ## Usage
//!
//! ```rust,no_run
//! use ladle::{CredentialConfig, Ladle, LadleConfig};
//!
//! async fn example() {
//!     let config = LadleConfig {
//!         credentials: CredentialConfig {
//!             secret: "change-me".into(),
//!             ..CredentialConfig::default()
//!         },
//!         ..LadleConfig::default()
//!     };
//!     let ladle = Ladle::open("ladle.db", config).unwrap();
//!
//!     let session = ladle.login("cook@example.com", "hunter2").await.unwrap();
//!     println!("token: {}", session.token);
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `ladle::core` - Domain values (Recipe, Identity, Page, etc.)
//! - `ladle::policy` - Access decisions and visibility scopes
//! - `ladle::auth` - Credentials and the authorization gate
//! - `ladle::store` - Storage abstraction and SQLite

pub mod error;
pub mod reply;
pub mod service;

// Re-export component crates
pub use ladle_auth as auth;
pub use ladle_core as core;
pub use ladle_policy as policy;
pub use ladle_store as store;

// Re-export main types for convenience
pub use error::{LadleError, Result};
pub use reply::{codes, Reply};
pub use service::{Ladle, LadleConfig, LoginSession};

// Re-export commonly used component types
pub use ladle_auth::{CallContext, CredentialConfig, GateRequest};
pub use ladle_core::{
    Difficulty, Identity, Ingredient, IngredientDraft, NewIdentity, Page, PageRequest, Recipe,
    RecipeAggregate, RecipeDraft, RecipeId, Step, StepDraft, UserId,
};
pub use ladle_policy::{Caller, VisibilityScope};
pub use ladle_store::{RecipeQuery, SqliteStore};
