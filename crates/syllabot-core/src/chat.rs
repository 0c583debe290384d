//! Chat message types for the conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Question typed by the user.
    User,
    /// Reply from the assistant.
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A committed turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Author of this message.
    pub sender: Sender,
    /// Message text.
    pub text: String,
    /// When the message was committed.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time.
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// True if this message has the given author and text, ignoring the timestamp.
    pub fn matches(&self, sender: Sender, text: &str) -> bool {
        self.sender == sender && self.text == text
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
