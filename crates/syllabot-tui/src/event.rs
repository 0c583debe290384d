//! Event types for communication between background tasks and UI.

use syllabot_core::{QueryFailure, QueryRequest, RequestId, RevealTicket};

/// Events sent from background tasks to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    /// The greeting delay elapsed.
    Greet,

    /// A reveal ticker fired.
    RevealTick(RevealTicket),

    /// An assistant query finished.
    Reply {
        request_id: RequestId,
        result: Result<String, QueryFailure>,
    },
}

/// Commands sent from UI to background tasks.
#[derive(Debug)]
pub enum BackendCommand {
    /// Ask the assistant.
    Query(QueryRequest),

    /// Start ticking for a reveal.
    StartTicker(RevealTicket),

    /// Stop ticking for a reveal.
    StopTicker(RevealTicket),

    /// Quit the application.
    Quit,
}
