//! Chat controller: composes the conversation log, the reveal engine and the
//! edit session into the behaviour of one chat widget.
//!
//! The controller performs no I/O. Each operation returns the [`Effect`]s the
//! host has to carry out (issue a query, start or stop a reveal ticker, show
//! an alert). Results come back through [`ChatController::on_reply`] and
//! [`ChatController::tick`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::chat::Sender;
use crate::conversation::ConversationLog;
use crate::document::ChatDocument;
use crate::edit::EditSession;
use crate::error::CoreError;
use crate::failure::QueryFailure;
use crate::ids::{DocumentId, RequestId, RevealTicket};
use crate::reveal::{RevealEngine, RevealStep};

/// Greeting revealed when the widget opens.
pub const WELCOME_MESSAGE: &str =
    "Hello! I am here to help you with your syllabus. Ask me anything!";

/// Reply text used when the service answers without a `response` field.
pub const NO_RESPONSE_FALLBACK: &str = "No response from the bot.";

/// A question for the assistant query service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub request_id: RequestId,
    pub message: String,
    pub document_id: DocumentId,
    pub document_content: String,
}

/// Work the host must perform on behalf of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a query; deliver the outcome to `on_reply`.
    Query(QueryRequest),
    /// Start calling `tick` with this ticket at the reveal interval.
    StartTicker(RevealTicket),
    /// Dispose of the ticker for this ticket.
    StopTicker(RevealTicket),
    /// Show a blocking acknowledgment to the user.
    Alert(String),
}

/// State of one open chat widget.
pub struct ChatController {
    document: ChatDocument,
    log: ConversationLog,
    reveal: RevealEngine,
    edit: Option<EditSession>,
    pending: Option<RequestId>,
    error: Option<QueryFailure>,
    greeted: bool,
    welcome_shown: Arc<AtomicBool>,
    closed: bool,
}

impl ChatController {
    pub fn new(document: ChatDocument) -> Self {
        Self {
            document,
            log: ConversationLog::new(),
            reveal: RevealEngine::new(),
            edit: None,
            pending: None,
            error: None,
            greeted: false,
            welcome_shown: Arc::new(AtomicBool::new(false)),
            closed: false,
        }
    }

    /// Reveal the welcome message. Only the first call per widget has an effect.
    ///
    /// The welcome is skipped once the conversation has started, so it never
    /// lands between a question and its reply.
    pub fn greet(&mut self) -> Vec<Effect> {
        if self.closed || self.greeted {
            return Vec::new();
        }
        if !self.log.is_empty() || self.pending.is_some() {
            debug!("Conversation already started, skipping greeting");
            self.greeted = true;
            return Vec::new();
        }

        let shown = self.welcome_shown.clone();
        match self.reveal.start(
            WELCOME_MESSAGE,
            Some(Box::new(move || shown.store(true, Ordering::SeqCst))),
        ) {
            Ok(ticket) => {
                self.greeted = true;
                vec![Effect::StartTicker(ticket)]
            }
            Err(e) => {
                debug!(error = %e, "Skipping greeting");
                Vec::new()
            }
        }
    }

    /// Send a question, or stop the reveal if one is playing.
    ///
    /// Blank input and input arriving while a query is outstanding are ignored.
    pub fn submit(&mut self, text: &str) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        if self.reveal.is_revealing() {
            return self.stop();
        }

        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if let Some(pending) = &self.pending {
            debug!(request_id = %pending, "Query already pending, ignoring submit");
            return Vec::new();
        }

        self.log.append(Sender::User, text);
        self.error = None;
        vec![Effect::Query(self.new_query(text))]
    }

    /// Open an edit session on the user message at `index`.
    pub fn begin_edit(&mut self, index: usize) -> Result<(), CoreError> {
        if self.closed {
            return Err(CoreError::Closed);
        }
        if let Some(session) = &self.edit {
            return Err(CoreError::EditInProgress {
                index: session.message_index,
            });
        }

        let message = self
            .log
            .message_at(index)
            .filter(|m| m.is_user())
            .ok_or(CoreError::InvalidEditTarget { index })?;
        self.edit = Some(EditSession::new(index, message.text.clone()));
        Ok(())
    }

    /// Replace the draft text of the open edit session.
    pub fn update_draft(&mut self, draft: impl Into<String>) -> Result<(), CoreError> {
        let session = self.edit.as_mut().ok_or(CoreError::NoEditSession)?;
        session.draft = draft.into();
        Ok(())
    }

    /// Close the edit session without changing the log.
    ///
    /// Returns true if a session was open.
    pub fn cancel_edit(&mut self) -> bool {
        self.edit.take().is_some()
    }

    /// Commit the open edit session and ask the assistant again.
    ///
    /// A blank draft closes the session without changes.
    pub fn save_edit(&mut self) -> Result<Vec<Effect>, CoreError> {
        let session = self.edit.take().ok_or(CoreError::NoEditSession)?;
        match session.submittable_text() {
            Some(text) => self.edit_message(session.message_index, text),
            None => {
                debug!(index = session.message_index, "Blank edit discarded");
                Ok(Vec::new())
            }
        }
    }

    /// Rewrite the user message at `index`, drop everything after it and
    /// query the assistant with the new text.
    ///
    /// The text is trimmed; blank text leaves the log untouched.
    pub fn edit_message(&mut self, index: usize, new_text: &str) -> Result<Vec<Effect>, CoreError> {
        if self.closed {
            return Err(CoreError::Closed);
        }
        if !self.log.message_at(index).is_some_and(|m| m.is_user()) {
            warn!(index, "Ignoring edit of non-user or missing message");
            return Err(CoreError::InvalidEditTarget { index });
        }
        let new_text = new_text.trim();
        if new_text.is_empty() {
            debug!(index, "Blank edit discarded");
            self.edit = None;
            return Ok(Vec::new());
        }

        self.edit = None;
        let mut effects = self.stop();
        self.log.edit_and_truncate(index, new_text)?;

        if let Some(previous) = self.pending.take() {
            debug!(request_id = %previous, "Superseding pending query");
        }
        self.error = None;
        effects.push(Effect::Query(self.new_query(new_text)));
        Ok(effects)
    }

    /// Advance the reveal identified by `ticket`.
    pub fn tick(&mut self, ticket: RevealTicket) -> Vec<Effect> {
        match self.reveal.tick(ticket) {
            RevealStep::Advanced(_) | RevealStep::Ignored => Vec::new(),
            RevealStep::Completed { text, on_complete } => {
                self.commit_bot(text);
                if let Some(callback) = on_complete {
                    callback();
                }
                vec![Effect::StopTicker(ticket)]
            }
        }
    }

    /// Cancel the reveal, keeping what is already visible.
    pub fn stop(&mut self) -> Vec<Effect> {
        let Some(ticket) = self.reveal.ticket() else {
            return Vec::new();
        };
        if let Some(prefix) = self.reveal.stop() {
            self.commit_bot(prefix);
        }
        vec![Effect::StopTicker(ticket)]
    }

    /// Deliver the outcome of a query.
    ///
    /// Replies for a closed widget or for a superseded request are dropped.
    pub fn on_reply(
        &mut self,
        request_id: &RequestId,
        result: Result<String, QueryFailure>,
    ) -> Vec<Effect> {
        if self.closed {
            debug!(%request_id, "Dropping reply for closed chat");
            return Vec::new();
        }
        if self.pending.as_ref() != Some(request_id) {
            debug!(%request_id, "Dropping stale reply");
            return Vec::new();
        }
        self.pending = None;

        match result {
            Ok(text) => {
                let mut effects = self.stop();
                match self.reveal.start(text, None) {
                    Ok(ticket) => effects.push(Effect::StartTicker(ticket)),
                    Err(e) => warn!(error = %e, "Could not start reveal"),
                }
                effects
            }
            Err(failure) => {
                let alert = failure.alert_message().to_string();
                self.error = Some(failure);
                vec![Effect::Alert(alert)]
            }
        }
    }

    /// Tear the widget down. Later calls and replies are inert.
    pub fn close(&mut self) -> Vec<Effect> {
        if self.closed {
            return Vec::new();
        }
        self.closed = true;
        self.edit = None;
        self.pending = None;
        info!(document_id = %self.document.id, messages = self.log.len(), "Chat closed");

        match self.reveal.ticket() {
            Some(ticket) => {
                self.reveal.stop();
                vec![Effect::StopTicker(ticket)]
            }
            None => Vec::new(),
        }
    }

    pub fn document(&self) -> &ChatDocument {
        &self.document
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Text of the reply being revealed, if any.
    pub fn revealing_text(&self) -> Option<&str> {
        self.reveal.is_revealing().then(|| self.reveal.revealed())
    }

    pub fn is_revealing(&self) -> bool {
        self.reveal.is_revealing()
    }

    pub fn reveal_ticket(&self) -> Option<RevealTicket> {
        self.reveal.ticket()
    }

    /// True while a query is waiting for its reply.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn error(&self) -> Option<&QueryFailure> {
        self.error.as_ref()
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn welcome_shown(&self) -> bool {
        self.welcome_shown.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn new_query(&mut self, message: &str) -> QueryRequest {
        let request = QueryRequest {
            request_id: RequestId::generate(),
            message: message.to_string(),
            document_id: self.document.id.clone(),
            document_content: self.document.content.clone(),
        };
        debug!(request_id = %request.request_id, "Issuing assistant query");
        self.pending = Some(request.request_id.clone());
        request
    }

    fn commit_bot(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.log.append(Sender::Bot, text);
    }
}
