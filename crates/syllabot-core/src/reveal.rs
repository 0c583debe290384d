//! Character-by-character reveal of a fully received reply.
//!
//! The backend does not stream, so the engine paces an already complete
//! string onto the screen. It is driven by ticks from the host's timer:
//!
//! ```text
//! Idle --start--> Revealing --tick (cursor == len)--> Idle (Completed)
//!                     |
//!                     +--stop--> Idle (prefix returned)
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::error::CoreError;
use crate::ids::RevealTicket;

/// Callback fired once when a reveal runs to completion.
pub type OnComplete = Box<dyn FnOnce() + Send>;

/// Result of advancing the engine by one tick.
pub enum RevealStep {
    /// One more character became visible.
    Advanced(char),
    /// The whole text is visible; the engine is idle again.
    Completed {
        text: String,
        on_complete: Option<OnComplete>,
    },
    /// Engine is idle or the ticket belongs to a finished reveal.
    Ignored,
}

impl fmt::Debug for RevealStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevealStep::Advanced(c) => f.debug_tuple("Advanced").field(c).finish(),
            RevealStep::Completed { text, on_complete } => f
                .debug_struct("Completed")
                .field("text", text)
                .field("has_callback", &on_complete.is_some())
                .finish(),
            RevealStep::Ignored => f.write_str("Ignored"),
        }
    }
}

struct RevealState {
    ticket: RevealTicket,
    target: String,
    revealed: String,
    /// Byte offset into `target` of the next character to reveal.
    cursor: usize,
    on_complete: Option<OnComplete>,
}

/// Plays one reply at a time into view.
pub struct RevealEngine {
    active: Option<RevealState>,
    next_ticket: RevealTicket,
}

impl Default for RevealEngine {
    fn default() -> Self {
        Self {
            active: None,
            next_ticket: RevealTicket::first(),
        }
    }
}

impl fmt::Debug for RevealEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealEngine")
            .field("ticket", &self.ticket())
            .field("revealed", &self.revealed())
            .finish()
    }
}

impl RevealEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin revealing `text`.
    ///
    /// Fails if a reveal is already playing; the caller must stop it first.
    pub fn start(
        &mut self,
        text: impl Into<String>,
        on_complete: Option<OnComplete>,
    ) -> Result<RevealTicket, CoreError> {
        if self.active.is_some() {
            return Err(CoreError::RevealInProgress);
        }

        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();

        let target = text.into();
        debug!(%ticket, chars = target.chars().count(), "Reveal started");
        self.active = Some(RevealState {
            ticket,
            revealed: String::with_capacity(target.len()),
            target,
            cursor: 0,
            on_complete,
        });
        Ok(ticket)
    }

    /// Advance the reveal owning `ticket` by one character.
    pub fn tick(&mut self, ticket: RevealTicket) -> RevealStep {
        let Some(state) = self.active.as_mut() else {
            return RevealStep::Ignored;
        };
        if state.ticket != ticket {
            trace!(%ticket, active = %state.ticket, "Stale reveal tick");
            return RevealStep::Ignored;
        }

        if let Some(ch) = state.target[state.cursor..].chars().next() {
            state.revealed.push(ch);
            state.cursor += ch.len_utf8();
            return RevealStep::Advanced(ch);
        }

        // Cursor reached the end of the text.
        let Some(state) = self.active.take() else {
            return RevealStep::Ignored;
        };
        debug!(ticket = %state.ticket, "Reveal completed");
        RevealStep::Completed {
            text: state.revealed,
            on_complete: state.on_complete,
        }
    }

    /// Cancel the reveal and return whatever was visible.
    ///
    /// The completion callback is dropped without being called.
    pub fn stop(&mut self) -> Option<String> {
        let state = self.active.take()?;
        debug!(
            ticket = %state.ticket,
            revealed = state.revealed.chars().count(),
            total = state.target.chars().count(),
            "Reveal stopped"
        );
        Some(state.revealed)
    }

    pub fn is_revealing(&self) -> bool {
        self.active.is_some()
    }

    /// Ticket of the reveal in flight.
    pub fn ticket(&self) -> Option<RevealTicket> {
        self.active.as_ref().map(|s| s.ticket)
    }

    /// Text made visible so far, empty when idle.
    pub fn revealed(&self) -> &str {
        self.active.as_ref().map_or("", |s| s.revealed.as_str())
    }
}
