//! LLM capability behind the summarization workflow.
//!
//! Three provider variants sit behind [`LlmClient`]; they differ only in
//! endpoint, auth, and model-name defaults, never in contract shape. The
//! contract is purely textual: given serialized session text and a date
//! label, return the generated document. No retry logic lives here — a
//! failed call surfaces as [`crate::Error::Llm`] and aborts the enclosing
//! analysis.

mod anthropic;
mod openai;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use openai::OpenAiCompatibleClient;

use crate::config::{LlmConfig, LlmProvider};
use crate::error::Result;
use async_trait::async_trait;

/// Textual request/response contract with a summarization-capable model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Produce a daily development report from serialized session text.
    async fn summarize_daily(&self, input: &str, date: &str) -> Result<String>;

    /// Extract problem/solution knowledge from serialized session text.
    async fn extract_knowledge(&self, input: &str, date: &str) -> Result<String>;
}

/// Build the provider selected by configuration.
///
/// The two OpenAI-shaped variants (`openai`, `generic`) share one
/// implementation and differ only in defaults.
pub fn create_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::Anthropic => Ok(Box::new(AnthropicClient::new(config)?)),
        LlmProvider::Openai | LlmProvider::Generic => {
            Ok(Box::new(OpenAiCompatibleClient::new(config)?))
        }
    }
}
