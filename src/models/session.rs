use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::Message;

/// One conversation thread: an id, a derived title, and the ordered
/// message history. Serialized with camelCase keys so the on-disk layout
/// matches the portal's original history blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: "New Chat".to_string(),
            messages: Vec::new(),
            model: model.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`. Message order is append
    /// order; nothing ever re-sorts it.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Reset to an empty session, keeping the id and model.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.title = "New Chat".to_string();
        self.updated_at = Utc::now();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let session = ChatSession::new("google/gemma-3-27b-it:free");
        assert_eq!(session.title, "New Chat");
        assert!(session.messages.is_empty());
        assert_eq!(session.created_at, session.updated_at);
    }

    #[test]
    fn test_push_message_bumps_updated_at() {
        let mut session = ChatSession::new("gemini-2.0-flash-lite");
        let created = session.created_at;
        session.push_message(Message::user("hi"));
        assert_eq!(session.messages.len(), 1);
        assert!(session.updated_at >= created);
    }

    #[test]
    fn test_clear_resets_title_and_messages() {
        let mut session = ChatSession::new("gemini-2.0-flash-lite");
        session.push_message(Message::user("hi"));
        session.title = "hi".to_string();
        let id = session.id.clone();

        session.clear();
        assert_eq!(session.title, "New Chat");
        assert!(session.is_empty());
        assert_eq!(session.id, id);
    }
}
