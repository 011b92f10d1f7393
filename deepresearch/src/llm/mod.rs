//! LLM client abstraction used by the planner and synthesizer.
//!
//! `LlmPlanner` and `LlmSynthesizer` depend on a callable that turns a message
//! list into assistant text; this module defines that trait, a scripted mock,
//! and an OpenAI-compatible client (OpenRouter by default).

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

/// Token usage for one LLM call.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from an LLM completion.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    /// Token usage, when the provider reports it.
    pub usage: Option<LlmUsage>,
}

/// LLM client: given messages, returns assistant text.
///
/// Implementations: `MockLlm` (scripted), `ChatOpenAI` (OpenAI-compatible API).
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// **Scenario**: LlmClient is object-safe and usable behind Arc<dyn _>.
    #[tokio::test]
    async fn llm_client_as_trait_object() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlm::new("hello"));
        let resp = llm.invoke(&[Message::user("hi")]).await.unwrap();
        assert_eq!(resp.content, "hello");
        assert!(resp.usage.is_none());
    }
}
