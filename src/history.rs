use std::path::{Path, PathBuf};

use crate::models::ChatSession;

/// Sessions beyond this count are evicted, oldest first.
const MAX_SESSIONS: usize = 50;

/// Repository over the persisted session collection: one JSON file holding
/// an array of sessions, most recently created first.
///
/// Every operation is best-effort. A missing, unreadable, or malformed
/// file reads as an empty collection, and write failures are logged and
/// swallowed — chat history is not worth failing a send over. Saves are
/// plain read-modify-write with no locking, so two concurrent writers
/// race and the last one wins.
#[derive(Debug, Clone)]
pub struct ChatHistory {
    path: PathBuf,
}

impl ChatHistory {
    /// History store at the default location,
    /// `$XDG_DATA_HOME/anusarth/chat_history.json`.
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// History store backed by an explicit file (used for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn default_path() -> PathBuf {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".local/share")
            });
        data_dir.join("anusarth").join("chat_history.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A fresh, empty session. Pure: nothing is persisted until the first
    /// `save_session` call.
    pub fn create_new_session(&self, model: &str) -> ChatSession {
        ChatSession::new(model)
    }

    /// Insert or replace `session` in the persisted collection and write it
    /// back, keeping only the `MAX_SESSIONS` most recent entries. An
    /// existing session keeps its position; a new one goes to the front.
    ///
    /// Failures are logged and swallowed: the caller gets no signal beyond
    /// a later `all_sessions` not containing the entry.
    pub fn save_session(&self, session: &ChatSession) {
        let mut sessions = self.all_sessions();

        match sessions.iter().position(|s| s.id == session.id) {
            Some(index) => sessions[index] = session.clone(),
            None => sessions.insert(0, session.clone()),
        }
        sessions.truncate(MAX_SESSIONS);

        if let Err(e) = self.write_sessions(&sessions) {
            tracing::error!("Failed to save chat session: {}", e);
        }
    }

    /// All persisted sessions, most recent first. Degrades to an empty
    /// list when the file is absent or cannot be parsed.
    pub fn all_sessions(&self) -> Vec<ChatSession> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::error!("Failed to read chat history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!("Failed to parse chat history, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    /// Remove the session with `session_id` from the collection. No-op when
    /// no session matches.
    pub fn delete_session(&self, session_id: &str) {
        let mut sessions = self.all_sessions();
        let before = sessions.len();
        sessions.retain(|s| s.id != session_id);
        if sessions.len() == before {
            return;
        }

        if let Err(e) = self.write_sessions(&sessions) {
            tracing::error!("Failed to delete chat session: {}", e);
        }
    }

    fn write_sessions(&self, sessions: &[ChatSession]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(sessions)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Derive a session title from the first user message: the first six
    /// whitespace-delimited words, with `...` when the message had more.
    pub fn generate_session_title(first_message: &str) -> String {
        let words: Vec<&str> = first_message.split_whitespace().collect();
        if words.is_empty() {
            return "New Chat".to_string();
        }

        let mut title = words[..words.len().min(6)].join(" ");
        if words.len() > 6 {
            title.push_str("...");
        }
        title
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}
