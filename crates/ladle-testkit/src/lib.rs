//! # Ladle Testkit
//!
//! Testing utilities for Ladle.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: an in-memory service harness with quick caller setup
//! - **Generators**: proptest strategies for drafts, callers, and scopes
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust,ignore
//! use ladle_testkit::TestHarness;
//!
//! let harness = TestHarness::new();
//! let owner = harness.register("owner@example.com").await;
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{ingredient_drafts, recipe_draft, step_drafts, test_config, TestHarness};
