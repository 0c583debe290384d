//! Syllabot Core Chat Types
//!
//! This crate contains the chat widget's state machines with no dependencies on:
//! - Network/HTTP
//! - Terminal rendering
//! - Runtime specifics
//!
//! The host drives a [`ChatController`] with user input, reveal ticks and query
//! replies, and performs the [`Effect`]s it returns.

pub mod chat;
pub mod controller;
pub mod conversation;
pub mod document;
pub mod edit;
pub mod error;
pub mod failure;
pub mod ids;
pub mod reveal;
pub mod store;

// Re-export commonly used types
pub use chat::{Message, Sender};
pub use controller::{ChatController, Effect, QueryRequest, NO_RESPONSE_FALLBACK, WELCOME_MESSAGE};
pub use conversation::ConversationLog;
pub use document::ChatDocument;
pub use edit::EditSession;
pub use error::CoreError;
pub use failure::QueryFailure;
pub use ids::{DocumentId, RequestId, RevealTicket};
pub use reveal::{RevealEngine, RevealStep};
pub use store::{KeyValueStore, MemoryStore};
