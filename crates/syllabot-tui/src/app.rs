//! Application state and main event loop.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use syllabot_core::{ChatController, ChatDocument, Effect, KeyValueStore};

use crate::event::{BackendCommand, UiEvent};
use crate::prefs::ViewMode;
use crate::state::{InputBuffer, UiState};
use crate::ui;

/// Lines moved per PageUp/PageDown.
const SCROLL_STEP: usize = 5;

/// Apply a text-editing key to `input`. Returns true if the key was consumed.
fn edit_text(input: &mut InputBuffer, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => input.insert('\n'),
        KeyCode::Char(c) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => return false,
    }
    true
}

/// Main application with the chat controller and channel handles.
pub struct App {
    /// Conversation, reveal and edit state.
    chat: ChatController,

    /// Screen state around the conversation.
    state: UiState,

    /// Persisted preferences.
    prefs: Box<dyn KeyValueStore>,

    /// Receiver for events from the backend.
    ui_rx: mpsc::Receiver<UiEvent>,

    /// Sender for commands to the backend.
    cmd_tx: mpsc::Sender<BackendCommand>,
}

impl App {
    /// Create a new application instance with channel handles.
    pub fn new(
        document: ChatDocument,
        prefs: Box<dyn KeyValueStore>,
        ui_rx: mpsc::Receiver<UiEvent>,
        cmd_tx: mpsc::Sender<BackendCommand>,
    ) -> Self {
        let view_mode = ViewMode::load(prefs.as_ref());
        Self {
            chat: ChatController::new(document),
            state: UiState::new(view_mode),
            prefs,
            ui_rx,
            cmd_tx,
        }
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// Run the main event loop.
    ///
    /// This runs on the main thread and handles:
    /// - Drawing the UI
    /// - Processing keyboard input
    /// - Receiving query replies and reveal ticks from the backend
    pub fn run(&mut self, mut terminal: DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|frame| ui::render(frame, &self.chat, &self.state))?;
            self.state.frame = self.state.frame.wrapping_add(1);

            // Poll terminal events (non-blocking with short timeout)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        break; // quit requested
                    }
                }
            }

            // Process backend events (non-blocking)
            while let Ok(event) = self.ui_rx.try_recv() {
                self.apply_event(event);
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Close the chat and stop the backend.
    pub fn shutdown(&mut self) {
        let effects = self.chat.close();
        self.perform(effects);
        let _ = self.cmd_tx.blocking_send(BackendCommand::Quit);
        info!("Chat shut down");
    }

    /// Apply an event from the backend.
    pub fn apply_event(&mut self, event: UiEvent) {
        let effects = match event {
            UiEvent::Greet => self.chat.greet(),
            UiEvent::RevealTick(ticket) => self.chat.tick(ticket),
            UiEvent::Reply { request_id, result } => self.chat.on_reply(&request_id, result),
        };
        self.perform(effects);
    }

    /// Carry out controller effects.
    fn perform(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            let cmd = match effect {
                Effect::Query(request) => BackendCommand::Query(request),
                Effect::StartTicker(ticket) => BackendCommand::StartTicker(ticket),
                Effect::StopTicker(ticket) => BackendCommand::StopTicker(ticket),
                Effect::Alert(message) => {
                    self.state.alert = Some(message);
                    continue;
                }
            };
            if self.cmd_tx.blocking_send(cmd).is_err() {
                warn!("Backend is gone, dropping command");
            }
        }
    }

    /// Handle a key press.
    ///
    /// Returns true if the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        // The alert blocks everything else until acknowledged.
        if self.state.alert.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.state.alert = None;
            }
            return false;
        }

        if self.chat.edit_session().is_some() {
            self.handle_edit_key(key);
            return false;
        }

        self.handle_compose_key(key)
    }

    fn handle_compose_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                if self.state.selected_message.take().is_none() {
                    return true;
                }
            }
            // The controller ignores a send while a query is outstanding.
            KeyCode::Enter if !key.modifiers.contains(KeyModifiers::ALT) => self.send(),
            KeyCode::Char('e') if ctrl => self.begin_edit(),
            KeyCode::Char('t') if ctrl => self.toggle_view_mode(),
            KeyCode::Up => {
                let users = self.chat.log().user_indices();
                self.state.select_prev(&users);
            }
            KeyCode::Down => {
                let users = self.chat.log().user_indices();
                self.state.select_next(&users);
            }
            KeyCode::PageUp => {
                self.state.scroll_back = self.state.scroll_back.saturating_add(SCROLL_STEP);
            }
            KeyCode::PageDown => {
                self.state.scroll_back = self.state.scroll_back.saturating_sub(SCROLL_STEP);
            }
            _ if ctrl => {}
            _ => {
                edit_text(&mut self.state.input, key);
            }
        }
        false
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.chat.cancel_edit();
                self.state.edit_input.clear();
                return;
            }
            KeyCode::Enter if !key.modifiers.contains(KeyModifiers::ALT) => {
                match self.chat.save_edit() {
                    Ok(effects) => self.perform(effects),
                    Err(e) => warn!(error = %e, "Could not save edit"),
                }
                self.state.edit_input.clear();
                self.state.selected_message = None;
                self.state.scroll_back = 0;
                return;
            }
            _ => {
                if !edit_text(&mut self.state.edit_input, key) {
                    return;
                }
            }
        }

        let draft = self.state.edit_input.text().to_string();
        if let Err(e) = self.chat.update_draft(draft) {
            debug!(error = %e, "Draft update ignored");
        }
    }

    /// Submit the composer, or stop the reveal in progress.
    fn send(&mut self) {
        if self.state.input.is_blank() && !self.chat.is_revealing() {
            return;
        }
        let effects = self.chat.submit(self.state.input.text());
        if effects.iter().any(|e| matches!(e, Effect::Query(_))) {
            self.state.input.clear();
            self.state.scroll_back = 0;
        }
        self.perform(effects);
    }

    fn begin_edit(&mut self) {
        let Some(index) = self.state.selected_message else {
            return;
        };
        match self.chat.begin_edit(index) {
            Ok(()) => {
                let draft = self
                    .chat
                    .edit_session()
                    .map(|s| s.draft.clone())
                    .unwrap_or_default();
                self.state.edit_input = InputBuffer::with_text(draft);
            }
            Err(e) => {
                debug!(index, error = %e, "Cannot edit selection");
                self.state.selected_message = None;
            }
        }
    }

    fn toggle_view_mode(&mut self) {
        self.state.view_mode = self.state.view_mode.toggle();
        self.state.view_mode.save(self.prefs.as_mut());
        debug!(mode = self.state.view_mode.as_str(), "View mode changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabot_core::{MemoryStore, QueryFailure, RevealTicket, Sender};

    use crate::prefs::VIEW_MODE_KEY;

    fn app() -> (App, mpsc::Sender<UiEvent>, mpsc::Receiver<BackendCommand>) {
        let (ui_tx, ui_rx) = mpsc::channel(100);
        let (cmd_tx, cmd_rx) = mpsc::channel(100);
        let document = ChatDocument::new("doc-7", "Office hours: Tue 2pm").with_title("MATH 200");
        let app = App::new(document, Box::new(MemoryStore::new()), ui_rx, cmd_tx);
        (app, ui_tx, cmd_rx)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn next_query(cmd_rx: &mut mpsc::Receiver<BackendCommand>) -> syllabot_core::QueryRequest {
        loop {
            match cmd_rx.try_recv() {
                Ok(BackendCommand::Query(q)) => return q,
                Ok(_) => continue,
                Err(e) => panic!("Expected a query command: {:?}", e),
            }
        }
    }

    fn next_ticker(cmd_rx: &mut mpsc::Receiver<BackendCommand>) -> RevealTicket {
        loop {
            match cmd_rx.try_recv() {
                Ok(BackendCommand::StartTicker(t)) => return t,
                Ok(_) => continue,
                Err(e) => panic!("Expected a ticker command: {:?}", e),
            }
        }
    }

    fn ask_and_answer(
        app: &mut App,
        cmd_rx: &mut mpsc::Receiver<BackendCommand>,
        question: &str,
        answer: &str,
    ) {
        type_text(app, question);
        app.handle_key(key(KeyCode::Enter));
        let query = next_query(cmd_rx);
        app.apply_event(UiEvent::Reply {
            request_id: query.request_id,
            result: Ok(answer.to_string()),
        });
        let ticket = next_ticker(cmd_rx);
        for _ in 0..=answer.chars().count() {
            app.apply_event(UiEvent::RevealTick(ticket));
        }
    }

    #[test]
    fn test_enter_sends_and_clears_input() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        type_text(&mut app, "When are office hours?");
        app.handle_key(key(KeyCode::Enter));

        let query = next_query(&mut cmd_rx);
        assert_eq!(query.message, "When are office hours?");
        assert_eq!(query.document_id.as_str(), "doc-7");
        assert!(app.state().input.text().is_empty());
        assert!(app.chat().is_loading());

        // Typing continues while the reply is outstanding, but Enter does not
        // send a second question.
        type_text(&mut app, "next question");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.state().input.text(), "next question");
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.chat().log().len(), 1);

        app.apply_event(UiEvent::Reply {
            request_id: query.request_id,
            result: Ok("Tuesday.".to_string()),
        });
        let ticket = next_ticker(&mut cmd_rx);
        for _ in 0.."Tuesday.".chars().count() + 1 {
            app.apply_event(UiEvent::RevealTick(ticket));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(next_query(&mut cmd_rx).message, "next question");
        assert!(app.state().input.text().is_empty());
    }

    #[test]
    fn test_enter_on_blank_composer_sends_nothing() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));
        assert!(cmd_rx.try_recv().is_err());
        assert!(app.chat().log().is_empty());
    }

    #[test]
    fn test_full_exchange_commits_reply() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        ask_and_answer(&mut app, &mut cmd_rx, "Q?", "Tuesday at 2pm.");

        let log: Vec<_> = app
            .chat()
            .log()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect();
        assert_eq!(
            log,
            vec![
                (Sender::User, "Q?".to_string()),
                (Sender::Bot, "Tuesday at 2pm.".to_string()),
            ]
        );
        assert!(!app.chat().is_revealing());
    }

    #[test]
    fn test_enter_during_reveal_stops_it() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        type_text(&mut app, "Q");
        app.handle_key(key(KeyCode::Enter));
        let query = next_query(&mut cmd_rx);
        app.apply_event(UiEvent::Reply {
            request_id: query.request_id,
            result: Ok("hello world".to_string()),
        });
        let ticket = next_ticker(&mut cmd_rx);
        for _ in 0..5 {
            app.apply_event(UiEvent::RevealTick(ticket));
        }

        type_text(&mut app, "draft");
        app.handle_key(key(KeyCode::Enter));

        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::StopTicker(t)) if t == ticket));
        assert_eq!(app.chat().log().last().unwrap().text, "hello");
        // The stop press does not consume the composer.
        assert_eq!(app.state().input.text(), "draft");
    }

    #[test]
    fn test_failure_raises_alert_that_blocks_input() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        type_text(&mut app, "Q");
        app.handle_key(key(KeyCode::Enter));
        let query = next_query(&mut cmd_rx);

        app.apply_event(UiEvent::Reply {
            request_id: query.request_id,
            result: Err(QueryFailure::NetworkUnavailable),
        });

        assert_eq!(
            app.state().alert.as_deref(),
            Some("An error occurred. Please try again.")
        );
        assert!(!app.chat().is_loading());
        assert_eq!(app.chat().log().len(), 1);

        type_text(&mut app, "x");
        assert!(app.state().input.text().is_empty());
        app.handle_key(key(KeyCode::Enter));
        assert!(app.state().alert.is_none());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn test_edit_flow_rewinds_and_requeries() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        ask_and_answer(&mut app, &mut cmd_rx, "first", "one");
        ask_and_answer(&mut app, &mut cmd_rx, "second", "two");

        app.handle_key(key(KeyCode::Up));
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.state().selected_message, Some(0));

        app.handle_key(ctrl('e'));
        assert_eq!(app.state().edit_input.text(), "first");
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "e?");
        app.handle_key(key(KeyCode::Enter));

        let query = next_query(&mut cmd_rx);
        assert_eq!(query.message, "fie?");
        assert_eq!(app.chat().log().len(), 1);
        assert!(app.chat().edit_session().is_none());
    }

    #[test]
    fn test_escape_cancels_edit_before_closing() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        ask_and_answer(&mut app, &mut cmd_rx, "first", "one");

        app.handle_key(key(KeyCode::Up));
        app.handle_key(ctrl('e'));
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert!(app.chat().edit_session().is_none());
        assert_eq!(app.chat().log().len(), 2);

        // Clears the selection, then closes.
        assert!(!app.handle_key(key(KeyCode::Esc)));
        assert!(app.handle_key(key(KeyCode::Esc)));
    }

    #[test]
    fn test_toggle_view_mode_persists() {
        let (mut app, _ui_tx, _cmd_rx) = app();
        app.handle_key(ctrl('t'));
        assert_eq!(app.state().view_mode, ViewMode::Compact);
        assert_eq!(app.prefs.get(VIEW_MODE_KEY).as_deref(), Some("compact"));

        app.handle_key(ctrl('t'));
        assert!(app.prefs.get(VIEW_MODE_KEY).is_none());
    }

    #[test]
    fn test_shutdown_ignores_late_reply() {
        let (mut app, _ui_tx, mut cmd_rx) = app();
        type_text(&mut app, "Q");
        app.handle_key(key(KeyCode::Enter));
        let query = next_query(&mut cmd_rx);

        app.shutdown();
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Quit)));

        app.apply_event(UiEvent::Reply {
            request_id: query.request_id,
            result: Ok("late".to_string()),
        });
        assert_eq!(app.chat().log().len(), 1);
        assert!(cmd_rx.try_recv().is_err());
    }
}
