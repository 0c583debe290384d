//! UI state that lives next to the chat controller.

use crate::prefs::ViewMode;

/// Single text field with a unicode-safe cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Cursor position in chars.
    cursor: usize,
}

impl InputBuffer {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.remove_at_cursor();
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.remove_at_cursor();
        }
    }

    fn remove_at_cursor(&mut self) {
        if let Some((byte_idx, ch)) = self.text.char_indices().nth(self.cursor) {
            self.text
                .replace_range(byte_idx..byte_idx + ch.len_utf8(), "");
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.text.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }
}

/// State of the chat screen not owned by the controller.
#[derive(Debug, Default)]
pub struct UiState {
    /// Composer for new questions.
    pub input: InputBuffer,

    /// Draft while an edit session is open.
    pub edit_input: InputBuffer,

    /// Log index of the highlighted user message.
    pub selected_message: Option<usize>,

    /// Blocking acknowledgment waiting to be dismissed.
    pub alert: Option<String>,

    /// Transcript layout.
    pub view_mode: ViewMode,

    /// Frame counter for the loading animation.
    pub frame: usize,

    /// Lines scrolled up from the bottom of the transcript (0 = follow).
    pub scroll_back: usize,
}

impl UiState {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    /// Move the selection to the previous user message in `user_indices`.
    pub fn select_prev(&mut self, user_indices: &[usize]) {
        self.selected_message = match self.selected_message {
            None => user_indices.last().copied(),
            Some(current) => user_indices
                .iter()
                .rev()
                .find(|&&i| i < current)
                .or(user_indices.first())
                .copied(),
        };
    }

    /// Move the selection to the next user message, clearing it past the end.
    pub fn select_next(&mut self, user_indices: &[usize]) {
        self.selected_message = self
            .selected_message
            .and_then(|current| user_indices.iter().find(|&&i| i > current).copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_editing_is_unicode_safe() {
        let mut input = InputBuffer::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text(), "hélo");
        assert_eq!(input.cursor(), 2);

        input.home();
        input.delete();
        assert_eq!(input.text(), "élo");

        input.end();
        input.insert('!');
        assert_eq!(input.text(), "élo!");
    }

    #[test]
    fn test_with_text_puts_cursor_at_end() {
        let input = InputBuffer::with_text("né");
        assert_eq!(input.cursor(), 2);
        assert!(!input.is_blank());
        assert!(InputBuffer::with_text(" \n").is_blank());
    }

    #[test]
    fn test_selection_walks_user_messages() {
        let mut state = UiState::new(ViewMode::Comfortable);
        let users = [0, 2, 4];

        state.select_prev(&users);
        assert_eq!(state.selected_message, Some(4));
        state.select_prev(&users);
        assert_eq!(state.selected_message, Some(2));
        state.select_prev(&users);
        state.select_prev(&users);
        assert_eq!(state.selected_message, Some(0));

        state.select_next(&users);
        assert_eq!(state.selected_message, Some(2));
        state.select_next(&users);
        state.select_next(&users);
        assert_eq!(state.selected_message, None);
    }
}
