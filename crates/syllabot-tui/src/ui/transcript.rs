//! Transcript widget for displaying the conversation.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use syllabot_core::{Message, Sender};

use crate::prefs::ViewMode;
use crate::ui::text::wrap_text_indented;
use crate::ui::theme::Theme;

/// Renders committed messages, the reveal in progress and the edit draft.
#[derive(Debug, Clone)]
pub struct TranscriptWidget<'a> {
    /// Messages to display.
    messages: &'a [Message],
    /// Partially revealed reply (if any).
    revealing: Option<&'a str>,
    /// Highlighted user message.
    selected: Option<usize>,
    /// Message being edited and its draft.
    editing: Option<(usize, &'a str)>,
    /// Lines scrolled up from the bottom.
    scroll_back: usize,
    view_mode: ViewMode,
    theme: Theme,
}

impl<'a> TranscriptWidget<'a> {
    /// Create a new transcript widget.
    pub fn new(messages: &'a [Message]) -> Self {
        Self {
            messages,
            revealing: None,
            selected: None,
            editing: None,
            scroll_back: 0,
            view_mode: ViewMode::default(),
            theme: Theme::default(),
        }
    }

    /// Set the reveal output to display.
    pub fn revealing(mut self, text: Option<&'a str>) -> Self {
        self.revealing = text;
        self
    }

    pub fn selected(mut self, index: Option<usize>) -> Self {
        self.selected = index;
        self
    }

    /// Show `draft` in place of the message at `index`.
    pub fn editing(mut self, editing: Option<(usize, &'a str)>) -> Self {
        self.editing = editing;
        self
    }

    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    pub fn view_mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = mode;
        self
    }

    /// Build all transcript lines for a given text width.
    pub fn lines(&self, text_width: usize) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line> = Vec::new();

        for (index, msg) in self.messages.iter().enumerate() {
            let (label, style) = self.label(msg.sender);
            let editing_draft = self
                .editing
                .filter(|(i, _)| *i == index)
                .map(|(_, draft)| draft);
            let selected = self.selected == Some(index);

            let mut header = vec![Span::styled(
                label,
                if selected {
                    self.theme.selected_style()
                } else {
                    style.add_modifier(Modifier::BOLD)
                },
            )];
            if self.view_mode == ViewMode::Comfortable {
                header.push(Span::styled(
                    msg.timestamp.format(" %H:%M:%S").to_string(),
                    self.theme.muted_style(),
                ));
            }
            if editing_draft.is_some() {
                header.push(Span::styled(
                    " (editing - Enter: save, Esc: cancel)",
                    self.theme.muted_style(),
                ));
            } else if selected {
                header.push(Span::styled(" (Ctrl+E: edit)", self.theme.muted_style()));
            }
            all_lines.push(Line::from(header));

            let body = editing_draft.unwrap_or(&msg.text);
            for wrapped_line in wrap_text_indented(body, text_width, "  ") {
                all_lines.push(Line::from(Span::raw(wrapped_line)));
            }

            if self.view_mode == ViewMode::Comfortable {
                all_lines.push(Line::from(""));
            }
        }

        if let Some(revealing) = self.revealing {
            let (label, style) = self.label(Sender::Bot);
            all_lines.push(Line::from(vec![
                Span::styled(label, style.add_modifier(Modifier::BOLD)),
                Span::styled(" (typing...)", self.theme.muted_style()),
            ]));
            for wrapped_line in wrap_text_indented(revealing, text_width, "  ") {
                all_lines.push(Line::from(Span::raw(wrapped_line)));
            }
        }

        all_lines
    }

    fn label(&self, sender: Sender) -> (&'static str, ratatui::style::Style) {
        match sender {
            Sender::User => ("You:", self.theme.user_style()),
            Sender::Bot => ("Syllabot:", self.theme.bot_style()),
        }
    }

    /// Render the widget.
    pub fn render(self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let text_width = area.width.saturating_sub(2) as usize;

        let all_lines = self.lines(text_width);
        let total_lines = all_lines.len();

        let max_scroll = total_lines.saturating_sub(visible_height);
        let scroll_offset = max_scroll - self.scroll_back.min(max_scroll);

        let lines: Vec<Line> = all_lines
            .into_iter()
            .skip(scroll_offset)
            .take(visible_height)
            .collect();

        let title = if scroll_offset < max_scroll {
            format!(" Conversation [+{} below] ", max_scroll - scroll_offset)
        } else {
            " Conversation ".to_string()
        };

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.unfocused_border())
                .title(title),
        );

        frame.render_widget(paragraph, area);
    }
}
