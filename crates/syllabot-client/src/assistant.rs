//! Assistant query service: asks a question about one syllabus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use syllabot_core::{QueryRequest, NO_RESPONSE_FALLBACK};

use crate::error::ClientError;
use crate::http::HttpClient;

/// Default route of the chat endpoint.
pub const DEFAULT_CHAT_PATH: &str = "/chatbot/chat_with_pdf_embeddings";

/// Request body understood by the backend.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload<'a> {
    pub message: &'a str,
    pub pdf_id: &'a str,
    pub pdf_content: &'a str,
}

impl<'a> From<&'a QueryRequest> for ChatPayload<'a> {
    fn from(request: &'a QueryRequest) -> Self {
        Self {
            message: &request.message,
            pdf_id: request.document_id.as_str(),
            pdf_content: &request.document_content,
        }
    }
}

/// Successful reply body.
#[derive(Debug, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
}

impl ChatReply {
    /// Text to reveal; falls back when the backend sent nothing usable.
    pub fn into_text(self) -> String {
        match self.response {
            Some(text) if !text.is_empty() => text,
            _ => NO_RESPONSE_FALLBACK.to_string(),
        }
    }
}

/// Anything that can answer questions about a document.
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Ask the question in `request` and return the reply text.
    async fn ask(&self, request: &QueryRequest) -> Result<String, ClientError>;
}

/// Assistant backed by the REST chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpAssistant {
    http: HttpClient,
    chat_path: String,
}

impl HttpAssistant {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            chat_path: DEFAULT_CHAT_PATH.to_string(),
        }
    }

    /// Override the chat route (e.g. `/chatbot/chat_with_pdf`).
    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.chat_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl AssistantService for HttpAssistant {
    async fn ask(&self, request: &QueryRequest) -> Result<String, ClientError> {
        info!(
            request_id = %request.request_id,
            document_id = %request.document_id,
            "Querying assistant"
        );
        let reply: ChatReply = self
            .http
            .post_json(&self.chat_path, &ChatPayload::from(request))
            .await?;
        let text = reply.into_text();
        debug!(request_id = %request.request_id, chars = text.chars().count(), "Assistant replied");
        Ok(text)
    }
}
