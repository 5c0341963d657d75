//! Campus Assistant
//!
//! Navigation helper for a university campus:
//! - Rule-based assistant answering from a fixed table of canned responses
//! - Conversation controller with a simulated, cancelable typing delay
//! - Campus directory with location search and event listings
//! - HTTP API for the web front end
//!
//! REPLY PIPELINE:
//! GREETING → EXACT QUESTION → WORD OVERLAP → KEYWORD → FALLBACK

pub mod api;
pub mod config;
pub mod conversational;
pub mod error;
pub mod events;
pub mod knowledge;
pub mod locations;
pub mod models;
pub mod selector;
pub mod state;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use selector::ResponseSelector;
