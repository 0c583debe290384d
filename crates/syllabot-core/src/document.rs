//! The syllabus a chat is scoped to.

use crate::ids::DocumentId;

/// Title shown when the document has no description.
pub const UNTITLED: &str = "Untitled";

/// Document context handed to the chat widget when it opens.
#[derive(Debug, Clone)]
pub struct ChatDocument {
    /// Backend identifier of the syllabus.
    pub id: DocumentId,
    /// Text extracted from the PDF.
    pub content: String,
    /// Optional display title.
    pub title: Option<String>,
}

impl ChatDocument {
    pub fn new(id: impl Into<DocumentId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Title for display, falling back to "Untitled" when missing or blank.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
    }
}
