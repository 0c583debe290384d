//! Chat client configuration.

use std::path::PathBuf;
use std::time::Duration;

use syllabot_client::DEFAULT_CHAT_PATH;

/// Chat client configuration.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Backend base URL.
    pub endpoint: String,

    /// Route of the chat endpoint, relative to `endpoint`.
    pub chat_path: String,

    /// Interval between revealed characters.
    pub tick_interval: Duration,

    /// Pause between receiving a reply and starting to reveal it.
    pub reply_delay: Duration,

    /// Pause before the welcome message starts.
    pub greeting_delay: Duration,

    /// Per-request timeout. None waits indefinitely.
    pub request_timeout: Option<Duration>,

    /// File holding persisted preferences.
    pub state_file: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            tick_interval: Duration::from_millis(10),
            reply_delay: Duration::from_millis(1000),
            greeting_delay: Duration::from_millis(1000),
            request_timeout: None,
            state_file: default_state_file(),
        }
    }
}

/// `$HOME/.syllabot.json`, or the working directory when HOME is unset.
pub fn default_state_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".syllabot.json")
}
