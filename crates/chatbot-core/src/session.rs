//! Request orchestration for a single chat session
//!
//! [`ChatSession`] owns the conversation, the pending prompt and the
//! loading flag. A turn is split in two so callers can run the network call
//! wherever they like (inline, or on a spawned task):
//!
//! 1. [`ChatSession::begin_submit`] records the user message and returns the
//!    history to send.
//! 2. [`ChatSession::finish`] applies the outcome of that call.
//!
//! [`ChatSession::submit`] does both around a [`ChatClient`].

use tracing::{error, warn};

use crate::ai::ChatClient;
use crate::error::ChatError;
use crate::markdown::clean_markdown;
use crate::state::{ChatMessage, Conversation, RequestState};

/// Assistant message shown when the completion call fails outright
pub const ERROR_REPLY: &str = "An error occurred.";

#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Conversation,
    prompt: String,
    state: RequestState,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.conversation.messages()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Editable prompt; the input field writes straight into this
    pub fn prompt_mut(&mut self) -> &mut String {
        &mut self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Start a turn from the pending prompt.
    ///
    /// Returns the full history to send (the new user message included), or
    /// `None` when nothing happened: the prompt is blank, or a request is
    /// already outstanding. The user message carries the prompt as typed.
    pub fn begin_submit(&mut self) -> Option<Vec<ChatMessage>> {
        if self.prompt.trim().is_empty() {
            return None;
        }
        if self.state.is_loading() {
            warn!("submission ignored while a request is outstanding");
            return None;
        }

        self.conversation.push(ChatMessage::user(self.prompt.clone()));
        self.state = RequestState::AwaitingResponse;
        Some(self.conversation.messages().to_vec())
    }

    /// Finish the outstanding turn and return to `Idle`.
    ///
    /// On success the raw reply is cleaned, appended, and the prompt cleared.
    /// On failure a fixed error reply is appended and the prompt is kept so it
    /// can be resent. Ignored when no request is outstanding.
    pub fn finish(&mut self, outcome: Result<String, ChatError>) {
        if !self.state.is_loading() {
            warn!("reply ignored with no request outstanding");
            return;
        }

        match outcome {
            Ok(raw) => {
                self.conversation.push(ChatMessage::assistant(clean_markdown(&raw)));
                self.prompt.clear();
            }
            Err(e) => {
                error!("completion request failed: {}", e);
                self.conversation.push(ChatMessage::assistant(ERROR_REPLY));
            }
        }
        self.state = RequestState::Idle;
    }

    /// Run one full turn against `client`.
    ///
    /// Returns `false` if the submission was ignored.
    pub async fn submit(&mut self, client: &dyn ChatClient) -> bool {
        let Some(history) = self.begin_submit() else {
            return false;
        };

        let outcome = client.complete(&history).await;
        self.finish(outcome);
        true
    }
}
