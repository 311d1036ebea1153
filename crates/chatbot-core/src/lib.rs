pub mod ai;
pub mod config;
pub mod error;
pub mod markdown;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{ChatClient, OpenRouterClient};
pub use config::Config;
pub use error::ChatError;
pub use markdown::clean_markdown;
pub use session::{ChatSession, ERROR_REPLY};
pub use state::{ChatMessage, ChatRole, Conversation, RequestState};
