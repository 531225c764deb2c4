//! The generation collaborator boundary.
//!
//! The grading engine talks to language models through [`LlmClient`] and
//! nothing else; it never branches on provider identity. Callers plug in
//! the shipped OpenAI-compatible client, the scripted client, or their
//! own implementation.

use async_trait::async_trait;

pub mod fake;
pub mod openai;

pub use fake::ScriptedClient;
pub use openai::OpenAiClient;

/// One completion from a judging call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub meta: serde_json::Value,
}

/// Prompt-in, text-out generation interface.
///
/// Implementations return `anyhow::Result` so transport code can use `?`
/// freely; the engine treats any error here as a retryable judging
/// failure.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> anyhow::Result<LlmResponse>;

    fn provider_name(&self) -> &'static str;
}
