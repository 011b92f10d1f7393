//! Mock LLM for tests and examples.
//!
//! Returns scripted assistant replies in order (the last one repeats), or fails
//! every call when built with [`MockLlm::failing`]. Records the messages of each call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Scripted LLM.
///
/// **Interaction**: Implements `LlmClient`; used with `LlmPlanner` / `LlmSynthesizer`
/// in tests and the demo example.
pub struct MockLlm {
    responses: Vec<String>,
    error: Option<String>,
    call_count: AtomicUsize,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Always replies with `content`.
    pub fn new(content: impl Into<String>) -> Self {
        Self::scripted(vec![content.into()])
    }

    /// Replies with `responses` in order; the last one repeats once the script runs out.
    pub fn scripted(responses: Vec<String>) -> Self {
        Self {
            responses,
            error: None,
            call_count: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with `AgentError::ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::scripted(Vec::new())
        }
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Messages passed to each call, in order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if let Some(err) = &self.error {
            return Err(AgentError::ExecutionFailed(err.clone()));
        }
        let content = self
            .responses
            .get(n)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_default();
        Ok(LlmResponse {
            content,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Scripted replies come back in order and the last one repeats.
    #[tokio::test]
    async fn scripted_replies_in_order() {
        let llm = MockLlm::scripted(vec!["one".into(), "two".into()]);
        let msgs = [Message::user("q")];
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "one");
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "two");
        assert_eq!(llm.invoke(&msgs).await.unwrap().content, "two");
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.calls()[0][0].content, "q");
    }

    /// **Scenario**: A failing mock returns ExecutionFailed and still counts the call.
    #[tokio::test]
    async fn failing_mock_errors() {
        let llm = MockLlm::failing("rate limited");
        let err = llm.invoke(&[]).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(llm.call_count(), 1);
    }
}
