//! AI service integration for text and image generation
//!
//! Provides interfaces to OpenAI's chat completion and image APIs for
//! narrating adventure turns and illustrating scenarios.

pub mod mock;
pub mod openai;

pub use mock::{MockChatClient, MockImageClient};
pub use openai::{OpenAiChatClient, OpenAiImageClient};

use crate::models::Message;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Free-form completion over the given conversation.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Completion constrained to emit a JSON object.
    async fn complete_json(&self, messages: &[Message]) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Generate one image for the prompt. The seed identifies the request
    /// within a fan-out; it names log lines and debug artifacts.
    async fn generate(&self, prompt: &str, seed: u32) -> Result<Vec<u8>>;
}
