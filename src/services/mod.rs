pub mod chat;
pub mod prompt;

pub use chat::ChatService;
pub use prompt::{personalized_prompt, StudentProfile, SYSTEM_PROMPT};
