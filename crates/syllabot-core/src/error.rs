//! Core domain errors.

use thiserror::Error;

/// Rejected transitions of the chat state machines.
///
/// None of these are fatal: the state is left untouched and the caller is
/// expected to log and carry on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Edit target is out of range or not a user message.
    #[error("Message {index} cannot be edited")]
    InvalidEditTarget { index: usize },

    /// An edit session is already open.
    #[error("Already editing message {index}")]
    EditInProgress { index: usize },

    /// No edit session is open.
    #[error("No message is being edited")]
    NoEditSession,

    /// A reveal is already playing.
    #[error("A reply is already being revealed")]
    RevealInProgress,

    /// The widget has been closed.
    #[error("Chat is closed")]
    Closed,
}
