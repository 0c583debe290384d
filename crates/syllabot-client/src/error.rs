//! Error types for the assistant client.

use reqwest::StatusCode;
use syllabot_core::QueryFailure;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to establish connection.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Transport-level HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-2xx status other than 404.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ClientError {
    /// Build the error for a non-2xx reply, given the server's `error` field if any.
    pub fn from_status(status: StatusCode, path: &str, message: Option<String>) -> Self {
        if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(path.to_string())
        } else {
            ClientError::Status { status, message }
        }
    }

    /// Map onto the failure kinds the chat controller distinguishes.
    pub fn classify(&self) -> QueryFailure {
        match self {
            ClientError::Connection(_) => QueryFailure::NetworkUnavailable,
            ClientError::Http(e) if e.is_connect() || e.is_timeout() => {
                QueryFailure::NetworkUnavailable
            }
            ClientError::Http(e) if e.status() == Some(StatusCode::NOT_FOUND) => {
                QueryFailure::NotFound
            }
            ClientError::Http(_) => QueryFailure::Unexpected,
            ClientError::NotFound(_) => QueryFailure::NotFound,
            ClientError::Status { message, .. } => QueryFailure::ServiceError(message.clone()),
            ClientError::Serialization(_) => QueryFailure::Unexpected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_404_is_not_found() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "/chatbot/x", None);
        assert_eq!(err.classify(), QueryFailure::NotFound);
    }

    #[test]
    fn test_from_status_keeps_server_message() {
        let err = ClientError::from_status(
            StatusCode::BAD_REQUEST,
            "/chatbot/x",
            Some("Missing required parameters (message and pdfContent).".to_string()),
        );
        assert_eq!(
            err.classify(),
            QueryFailure::ServiceError(Some(
                "Missing required parameters (message and pdfContent).".to_string()
            ))
        );
        assert_eq!(
            err.to_string(),
            "HTTP 400 Bad Request: Missing required parameters (message and pdfContent)."
        );
    }

    #[test]
    fn test_other_errors_classify() {
        assert_eq!(
            ClientError::Connection("refused".into()).classify(),
            QueryFailure::NetworkUnavailable
        );
        assert_eq!(
            ClientError::Serialization("eof".into()).classify(),
            QueryFailure::Unexpected
        );
    }
}
