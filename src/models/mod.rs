pub mod message;
pub mod session;

pub use message::{DocumentAttachment, Message, Role};
pub use session::ChatSession;
