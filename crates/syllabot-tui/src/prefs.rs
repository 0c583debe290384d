//! Persisted UI preferences.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use syllabot_core::KeyValueStore;

/// Key under which the transcript view mode is stored.
pub const VIEW_MODE_KEY: &str = "chat.view_mode";

/// How the transcript is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Header line with timestamp per message, blank line between turns.
    #[default]
    Comfortable,
    /// One prefixed block per message, no timestamps or spacing.
    Compact,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Comfortable => "comfortable",
            ViewMode::Compact => "compact",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "comfortable" => Some(ViewMode::Comfortable),
            "compact" => Some(ViewMode::Compact),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            ViewMode::Comfortable => ViewMode::Compact,
            ViewMode::Compact => ViewMode::Comfortable,
        }
    }

    /// Read the stored mode, defaulting when absent or unrecognized.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        store
            .get(VIEW_MODE_KEY)
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// Store the mode; the default mode is stored as an absent key.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match self {
            ViewMode::Comfortable => store.remove(VIEW_MODE_KEY),
            mode => store.set(VIEW_MODE_KEY, mode.as_str()),
        }
    }
}

/// Key-value store backed by a JSON object on disk.
///
/// Every mutation rewrites the file. Write failures are logged and the
/// in-memory value still applies for the rest of the session.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Load the store at `path`; a missing or unreadable file starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring malformed preferences file");
                BTreeMap::new()
            }),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No preferences file");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    fn flush(&self) {
        let result = serde_json::to_string_pretty(&self.entries)
            .map_err(std::io::Error::other)
            .and_then(|json| fs::write(&self.path, json));
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "Failed to save preferences");
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabot_core::MemoryStore;

    #[test]
    fn test_view_mode_round_trips_through_store() {
        let mut store = MemoryStore::new();
        assert_eq!(ViewMode::load(&store), ViewMode::Comfortable);

        ViewMode::Compact.save(&mut store);
        assert_eq!(store.get(VIEW_MODE_KEY).as_deref(), Some("compact"));
        assert_eq!(ViewMode::load(&store), ViewMode::Compact);

        ViewMode::Comfortable.save(&mut store);
        assert!(store.get(VIEW_MODE_KEY).is_none());
    }

    #[test]
    fn test_unknown_view_mode_defaults() {
        let mut store = MemoryStore::new();
        store.set(VIEW_MODE_KEY, "grid");
        assert_eq!(ViewMode::load(&store), ViewMode::Comfortable);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut store = FileStore::open(&path);
        store.set(VIEW_MODE_KEY, "compact");
        drop(store);

        let mut reopened = FileStore::open(&path);
        assert_eq!(reopened.get(VIEW_MODE_KEY).as_deref(), Some("compact"));

        reopened.clear();
        assert!(FileStore::open(&path).get(VIEW_MODE_KEY).is_none());
    }

    #[test]
    fn test_file_store_ignores_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get(VIEW_MODE_KEY).is_none());
    }
}
