//! # Ladle Store
//!
//! SQLite-backed persistence for identities and recipe aggregates.
//!
//! ## Key Properties
//!
//! - **Atomic aggregates**: a recipe and its children are written in one
//!   IMMEDIATE transaction; readers never observe a half-written aggregate.
//! - **Replace-on-update**: updating a recipe replaces its full child
//!   lists; child row ids are not stable across updates.
//! - **Optimistic concurrency**: every recipe carries a version counter;
//!   concurrent replacements fail cleanly instead of interleaving.
//! - **Single predicate engine**: the data page and the total count of a
//!   search come from one where-clause assembly and cannot drift.
//!
//! The async surface wraps rusqlite via `spawn_blocking`; see
//! [`SqliteStore`].

pub mod error;
pub mod migration;
pub mod query;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use query::RecipeQuery;
pub use sqlite::{SqliteStore, DEFAULT_SEARCH_TIMEOUT};
pub use traits::{IdentityStore, RecipeStore};
