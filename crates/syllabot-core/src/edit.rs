//! Draft state for rewriting an earlier question.

/// An open edit of a user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    /// Index of the message being edited.
    pub message_index: usize,
    /// Text as currently typed; starts as the original message text.
    pub draft: String,
}

impl EditSession {
    pub fn new(message_index: usize, draft: impl Into<String>) -> Self {
        Self {
            message_index,
            draft: draft.into(),
        }
    }

    /// Draft with surrounding whitespace removed, or None if nothing is left.
    pub fn submittable_text(&self) -> Option<&str> {
        let text = self.draft.trim();
        (!text.is_empty()).then_some(text)
    }
}
