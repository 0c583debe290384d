//! Client library for the Syllabot backend.
//!
//! Provides the REST client used by the chat widget to query the assistant.

pub mod assistant;
pub mod error;
pub mod http;

pub use assistant::{AssistantService, ChatPayload, ChatReply, HttpAssistant, DEFAULT_CHAT_PATH};
pub use error::ClientError;
pub use http::HttpClient;

use syllabot_core::{QueryFailure, QueryRequest};
use tracing::warn;

/// Ask `assistant` and classify any failure for the chat controller.
pub async fn ask_classified<A>(
    assistant: &A,
    request: &QueryRequest,
) -> Result<String, QueryFailure>
where
    A: AssistantService + ?Sized,
{
    assistant.ask(request).await.map_err(|e| {
        let failure = e.classify();
        warn!(
            request_id = %request.request_id,
            kind = %failure,
            error = %e,
            "Assistant query failed"
        );
        failure
    })
}
