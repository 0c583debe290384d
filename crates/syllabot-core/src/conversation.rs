//! Ordered log of committed chat turns.

use tracing::debug;

use crate::chat::{Message, Sender};
use crate::error::CoreError;

/// Conversation history owned by a single chat widget.
///
/// Messages are addressed by index in insertion order. The only way to
/// rewrite history is [`ConversationLog::edit_and_truncate`].
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message unless it duplicates the last one.
    ///
    /// Returns true if the log grew.
    pub fn append(&mut self, sender: Sender, text: impl Into<String>) -> bool {
        let text = text.into();
        if self
            .messages
            .last()
            .is_some_and(|last| last.matches(sender, &text))
        {
            debug!(sender = sender.as_str(), "Suppressed duplicate append");
            return false;
        }
        self.messages.push(Message::new(sender, text));
        true
    }

    /// Replace the text of the user message at `index` and drop every later message.
    pub fn edit_and_truncate(
        &mut self,
        index: usize,
        new_text: impl Into<String>,
    ) -> Result<(), CoreError> {
        match self.messages.get(index) {
            Some(message) if message.is_user() => {}
            _ => return Err(CoreError::InvalidEditTarget { index }),
        }

        self.messages.truncate(index + 1);
        self.messages[index] = Message::user(new_text);
        debug!(index, len = self.messages.len(), "Rewound conversation");
        Ok(())
    }

    pub fn message_at(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Indices of user messages, oldest first.
    pub fn user_indices(&self) -> Vec<usize> {
        self.messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_user())
            .map(|(i, _)| i)
            .collect()
    }
}
