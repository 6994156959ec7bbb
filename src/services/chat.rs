use std::sync::Arc;

use anyhow::Result;

use crate::history::ChatHistory;
use crate::models::{ChatSession, DocumentAttachment, Message, Role};
use crate::providers::{
    ChatProvider, ChatRequest, ContentPart, DocumentData, ImageUrl, RequestMessage, RequestRole,
};

/// Orchestrates one conversation: appends the user's message, persists,
/// sends the full history through the injected provider, appends the
/// reply, and persists again.
///
/// On a provider failure the user message stays appended and persisted
/// and the error propagates to the caller for display; nothing retries.
/// Calls are not guarded against overlapping invocation — the caller is
/// expected to wait for one send before issuing the next.
pub struct ChatService {
    provider: Arc<dyn ChatProvider>,
    history: ChatHistory,
    model: String,
    system_prompt: String,
    session: Option<ChatSession>,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        history: ChatHistory,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            history,
            model: model.into(),
            system_prompt: system_prompt.into(),
            session: None,
        }
    }

    pub fn active_session(&self) -> Option<&ChatSession> {
        self.session.as_ref()
    }

    /// All persisted sessions, most recent first.
    pub fn sessions(&self) -> Vec<ChatSession> {
        self.history.all_sessions()
    }

    /// Start a fresh conversation. Nothing is persisted until the first
    /// send.
    pub fn new_session(&mut self) -> &ChatSession {
        self.session = Some(self.history.create_new_session(&self.model));
        self.session.as_ref().unwrap()
    }

    /// Make a previously stored session the active one.
    pub fn open_session(&mut self, session: ChatSession) {
        self.session = Some(session);
    }

    /// Delete a stored session. When it was the active one, fall back to
    /// the most recent remaining session, or a fresh one if none are left.
    pub fn delete_session(&mut self, session_id: &str) {
        self.history.delete_session(session_id);

        if self.session.as_ref().is_some_and(|s| s.id == session_id) {
            let remaining = self.history.all_sessions();
            self.session = Some(match remaining.into_iter().next() {
                Some(next) => next,
                None => self.history.create_new_session(&self.model),
            });
        }
    }

    /// Explicitly reset the active session: empty messages, title back to
    /// "New Chat", persisted in place.
    pub fn clear_session(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.clear();
            self.history.save_session(session);
        }
    }

    /// Send one user message and wait for the reply.
    ///
    /// On success the active session grew by exactly one user and one
    /// assistant message, both persisted. On failure exactly the user
    /// message was appended and persisted.
    pub async fn send_message(
        &mut self,
        content: &str,
        images: Vec<String>,
        documents: Vec<DocumentAttachment>,
    ) -> Result<String> {
        let model = self.model.clone();
        let session = self
            .session
            .get_or_insert_with(|| ChatSession::new(model.as_str()));

        let first_message = session.is_empty();
        let user_message = Message::user(content).with_attachments(images, documents);
        session.push_message(user_message);
        if first_message {
            session.title = ChatHistory::generate_session_title(content);
        }
        session.model = model;
        self.history.save_session(session);

        let request = Self::build_request(
            &self.system_prompt,
            &session.model,
            &session.messages,
        );

        let reply = self.provider.send_message(request).await?;

        session.push_message(Message::assistant(reply.clone()));
        self.history.save_session(session);

        Ok(reply)
    }

    /// Normalized request: the system prompt first, then the whole session
    /// history. Messages without attachments go over as plain text.
    fn build_request(
        system_prompt: &str,
        model: &str,
        messages: &[Message],
    ) -> ChatRequest {
        let mut request_messages = vec![RequestMessage::system(system_prompt)];

        for message in messages {
            let role = match message.role {
                Role::User => RequestRole::User,
                Role::Assistant => RequestRole::Assistant,
            };

            if message.images.is_empty() && message.documents.is_empty() {
                request_messages.push(RequestMessage::text(role, message.content.clone()));
                continue;
            }

            let mut parts = vec![ContentPart::Text {
                text: message.content.clone(),
            }];
            for url in &message.images {
                parts.push(ContentPart::ImageUrl {
                    image_url: ImageUrl { url: url.clone() },
                });
            }
            for doc in &message.documents {
                parts.push(ContentPart::Document {
                    document: DocumentData {
                        name: doc.name.clone(),
                        mime_type: doc.mime_type.clone(),
                        data: doc.data.clone(),
                    },
                });
            }
            request_messages.push(RequestMessage::parts(role, parts));
        }

        ChatRequest {
            model: model.to_string(),
            messages: request_messages,
            temperature: Some(0.7),
            max_tokens: None,
        }
    }
}
