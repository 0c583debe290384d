//! Theme and style definitions.

use ratatui::style::{Color, Modifier, Style};

/// Colors used by the chat screen.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary accent color (borders, selection)
    pub accent: Color,
    /// Error color (inline errors, alerts)
    pub error: Color,
    /// Muted color (timestamps, hints)
    pub muted: Color,
    /// User message color
    pub user: Color,
    /// Bot message color
    pub bot: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            error: Color::Red,
            muted: Color::DarkGray,
            user: Color::Blue,
            bot: Color::Green,
        }
    }
}

impl Theme {
    /// Style for focused/active borders.
    pub fn focused_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    /// Style for unfocused borders.
    pub fn unfocused_border(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for error text.
    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::ITALIC)
    }

    /// Style for muted/secondary text.
    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Style for user messages.
    pub fn user_style(&self) -> Style {
        Style::default().fg(self.user)
    }

    /// Style for bot messages.
    pub fn bot_style(&self) -> Style {
        Style::default().fg(self.bot)
    }

    /// Highlight for the selected user message.
    pub fn selected_style(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::REVERSED)
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}
