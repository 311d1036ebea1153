pub mod openrouter;

pub use openrouter::OpenRouterClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::state::ChatMessage;

/// Sends a conversation to a completion endpoint and returns the reply text.
///
/// Implementors own transport and wire-format details so the session logic
/// stays independent of any particular provider or HTTP client.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// `messages` is the full history, oldest first. The returned text is raw,
    /// i.e. still carrying any Markdown the model produced.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}
