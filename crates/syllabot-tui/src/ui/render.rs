//! Main render function for the TUI.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use syllabot_core::ChatController;

use crate::state::{InputBuffer, UiState};
use crate::ui::text::truncate;
use crate::ui::theme::Theme;
use crate::ui::transcript::TranscriptWidget;

/// Tallest the composer grows before it stops expanding.
const MAX_INPUT_LINES: u16 = 4;

/// Frames per loading-dot step.
const DOT_FRAMES: usize = 20;

/// Render the entire UI.
pub fn render(frame: &mut Frame, chat: &ChatController, state: &UiState) {
    let theme = Theme::default();
    let area = frame.area();

    let input_lines = (state.input.text().split('\n').count() as u16).clamp(1, MAX_INPUT_LINES);

    // Header, transcript, status, composer, footer
    let [header_area, body_area, status_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Length(input_lines + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area, chat, &theme);

    let editing = chat
        .edit_session()
        .map(|s| (s.message_index, state.edit_input.text()));
    TranscriptWidget::new(chat.log().messages())
        .revealing(chat.revealing_text())
        .selected(state.selected_message)
        .editing(editing)
        .scroll_back(state.scroll_back)
        .view_mode(state.view_mode)
        .render(frame, body_area);

    render_status(frame, status_area, chat, state, &theme);
    render_input(frame, input_area, chat, state, &theme);
    render_footer(frame, footer_area, chat, &theme);

    if let Some(alert) = state.alert.as_deref() {
        render_alert(frame, area, alert, &theme);
    }
}

fn render_header(frame: &mut Frame, area: Rect, chat: &ChatController, theme: &Theme) {
    let title = format!("Chat with PDF: {}", chat.document().display_title());
    let header = Paragraph::new(Span::styled(
        truncate(&title, area.width as usize),
        theme.title_style(),
    ));
    frame.render_widget(header, area);
}

/// Loading dots while waiting, otherwise the last failure.
fn render_status(
    frame: &mut Frame,
    area: Rect,
    chat: &ChatController,
    state: &UiState,
    theme: &Theme,
) {
    let line = if chat.is_loading() && !chat.is_revealing() {
        let dots = ".".repeat(state.frame / DOT_FRAMES % 3 + 1);
        Line::from(Span::styled(
            format!("Syllabot is typing{}", dots),
            theme.muted_style(),
        ))
    } else if let Some(failure) = chat.error() {
        Line::from(Span::styled(failure.inline_message(), theme.error_style()))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    chat: &ChatController,
    state: &UiState,
    theme: &Theme,
) {
    let editing = chat.edit_session().is_some();
    let (title, border) = if editing {
        (" Editing message above ", theme.unfocused_border())
    } else if chat.is_revealing() {
        (" Message [Enter: stop] ", theme.focused_border())
    } else if chat.is_loading() {
        (" Message [waiting...] ", theme.unfocused_border())
    } else {
        (" Message [Enter: send] ", theme.focused_border())
    };

    let input = Paragraph::new(state.input.text())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
    frame.render_widget(input, area);

    let show_cursor = !editing && state.alert.is_none();
    if show_cursor {
        let (row, col) = cursor_offset(&state.input);
        let inner_width = area.width.saturating_sub(2);
        let inner_height = area.height.saturating_sub(2);
        if col < inner_width && row < inner_height {
            frame.set_cursor_position((area.x + 1 + col, area.y + 1 + row));
        }
    }
}

/// Row and column of the cursor inside the composer.
fn cursor_offset(input: &InputBuffer) -> (u16, u16) {
    let before: String = input.text().chars().take(input.cursor()).collect();
    let row = before.matches('\n').count();
    let col = before.rsplit('\n').next().map(|l| l.width()).unwrap_or(0);
    (row as u16, col as u16)
}

fn render_footer(frame: &mut Frame, area: Rect, chat: &ChatController, theme: &Theme) {
    let help = if chat.edit_session().is_some() {
        "Enter: save | Alt+Enter: newline | Esc: cancel edit"
    } else {
        "Enter: send | Alt+Enter: newline | Up/Down: select | Ctrl+E: edit | Ctrl+T: view | Esc: close"
    };
    let footer = Paragraph::new(Span::styled(
        truncate(help, area.width as usize),
        theme.muted_style(),
    ));
    frame.render_widget(footer, area);
}

/// Center a fixed-size rect inside `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_alert(frame: &mut Frame, area: Rect, message: &str, theme: &Theme) {
    let width = (message.width() as u16 + 4).clamp(30, area.width.max(30));
    let dialog_area = centered_rect(width, 6, area);

    frame.render_widget(Clear, dialog_area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), theme.error_style())),
        Line::from(""),
        Line::from(Span::styled("[Enter] OK", theme.muted_style())),
    ];
    let dialog = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.focused_border())
                .title(" Error "),
        );
    frame.render_widget(dialog, dialog_area);
}
