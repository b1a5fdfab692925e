//! Voice Alert Test Utils
//!
//! Provides shared testing utilities for the voice alert bot. This crate offers a builder
//! pattern for creating test contexts backed by a temporary directory, plus factories for
//! the Serenity objects the bot receives from the gateway.
//!
//! # Overview
//!
//! The test utilities consist of three main components:
//! - **TestBuilder**: Fluent builder for seeding files into the test directory
//! - **TestContext**: Test environment owning the temporary directory
//! - **serenity**: Factory for `VoiceState` values, with or without member data
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::builder::TestBuilder;
//!
//! #[tokio::test]
//! async fn test_watch_target_reload() -> Result<(), TestError> {
//!     let test = TestBuilder::new()
//!         .with_file("target_user_id.txt", "123456789\n")
//!         .build()?;
//!
//!     let path = test.path("target_user_id.txt");
//!     // Point a store at `path`...
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod serenity;
