//! Classification of failed assistant queries.

use thiserror::Error;

/// Why an assistant query produced no reply.
///
/// `Display` gives the kind name used in log fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryFailure {
    /// The chat endpoint is missing or misconfigured (HTTP 404).
    #[error("not_found")]
    NotFound,
    /// The backend could not be reached.
    #[error("network_unavailable")]
    NetworkUnavailable,
    /// Non-2xx reply, with the server's message if it sent one.
    #[error("service_error")]
    ServiceError(Option<String>),
    /// Anything else.
    #[error("unexpected")]
    Unexpected,
}

impl QueryFailure {
    /// Text shown inline in the transcript.
    pub fn inline_message(&self) -> String {
        match self {
            QueryFailure::NotFound => {
                "Endpoint not found (404). Please check the backend route.".to_string()
            }
            QueryFailure::NetworkUnavailable => {
                "Network error. Please check your internet connection.".to_string()
            }
            QueryFailure::ServiceError(Some(message)) if !message.trim().is_empty() => {
                message.clone()
            }
            QueryFailure::ServiceError(_) => "Failed to get a valid response.".to_string(),
            QueryFailure::Unexpected => "An unexpected error occurred.".to_string(),
        }
    }

    /// Text of the blocking acknowledgment dialog.
    pub fn alert_message(&self) -> &'static str {
        match self {
            QueryFailure::ServiceError(_) => {
                "Failed to get a valid response from the chatbot. Please try again."
            }
            _ => "An error occurred. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_distinct() {
        let kinds = [
            QueryFailure::NotFound,
            QueryFailure::NetworkUnavailable,
            QueryFailure::ServiceError(None),
            QueryFailure::Unexpected,
        ];
        let mut messages: Vec<String> = kinds.iter().map(|k| k.inline_message()).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn test_display_is_kind_name() {
        assert_eq!(QueryFailure::NotFound.to_string(), "not_found");
        assert_eq!(
            QueryFailure::ServiceError(Some("boom".to_string())).to_string(),
            "service_error"
        );
    }

    #[test]
    fn test_service_error_prefers_server_message() {
        let failure = QueryFailure::ServiceError(Some("PDF not indexed".to_string()));
        assert_eq!(failure.inline_message(), "PDF not indexed");

        let blank = QueryFailure::ServiceError(Some(" ".to_string()));
        assert_eq!(blank.inline_message(), "Failed to get a valid response.");
    }
}
