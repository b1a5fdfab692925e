//! Test factories for creating Serenity API objects.
//!
//! This module provides factory functions for creating mock Serenity structs for testing
//! purposes. These factories create valid Serenity objects by deserializing JSON,
//! simulating what Discord's gateway would deliver.
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::serenity::create_test_voice_state;
//!
//! #[test]
//! fn test_presence_conversion() {
//!     let old = create_test_voice_state(42, 1, None, None);
//!     let new = create_test_voice_state(42, 1, Some(555), Some("someone"));
//!
//!     // Convert and assert...
//! }
//! ```
//!
//! # Available Factories
//!
//! - `voice_state::create_test_voice_state` - Create Serenity VoiceState objects

mod member;
pub mod voice_state;

// Re-export commonly used functions for convenience
pub use voice_state::create_test_voice_state;
