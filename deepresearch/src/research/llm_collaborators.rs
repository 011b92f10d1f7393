//! LLM-backed planner and synthesizer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;

use super::collaborators::{Planner, Reply, SynthesisInput, Synthesizer};
use super::prompt::{
    planner_user_prompt, synthesizer_user_prompt, PLANNER_SYSTEM, SYNTHESIZER_SYSTEM,
};

/// Planner that asks an LLM for a JSON step list.
pub struct LlmPlanner {
    llm: Arc<dyn LlmClient>,
}

impl LlmPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

fn render_conversation(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, messages: &[Message]) -> Result<Reply, AgentError> {
        let request = vec![
            Message::system(PLANNER_SYSTEM),
            Message::user(planner_user_prompt(&render_conversation(messages))),
        ];
        let response = self.llm.invoke(&request).await?;
        Ok(Reply::Text(response.content))
    }
}

/// Synthesizer that asks an LLM to write the final answer from the task records.
pub struct LlmSynthesizer {
    llm: Arc<dyn LlmClient>,
}

impl LlmSynthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Synthesizer for LlmSynthesizer {
    async fn synthesize(&self, input: &SynthesisInput) -> Result<Reply, AgentError> {
        let plan = serde_json::to_string(&input.plan)
            .map_err(|e| AgentError::ExecutionFailed(format!("serialize plan: {}", e)))?;
        // Raw transcripts stay out of the prompt; the converted messages carry them.
        let records: Vec<_> = input
            .task_results
            .iter()
            .map(|r| {
                json!({
                    "task_index": r.task_index,
                    "task": r.task,
                    "status": r.status,
                    "termination": r.termination,
                    "attempts": r.attempts,
                    "answer": r.answer,
                    "errors": r.errors,
                    "tool_calls": r.tool_calls,
                })
            })
            .collect();
        let records = serde_json::to_string(&records)
            .map_err(|e| AgentError::ExecutionFailed(format!("serialize task results: {}", e)))?;
        let request = vec![
            Message::system(SYNTHESIZER_SYSTEM),
            Message::user(synthesizer_user_prompt(&input.question, &plan, &records)),
        ];
        let response = self.llm.invoke(&request).await?;
        Ok(Reply::Text(response.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::llm::MockLlm;
    use crate::state::{TaskResult, TaskStatus};

    /// **Scenario**: The planner sends the system prompt and the rendered conversation.
    #[tokio::test]
    async fn planner_renders_conversation() {
        let llm = Arc::new(MockLlm::new(r#"{"steps": ["a"]}"#));
        let planner = LlmPlanner::new(llm.clone());
        let reply = planner
            .plan(&[Message::user("What is Rust?")])
            .await
            .unwrap();
        assert_eq!(reply.content(), r#"{"steps": ["a"]}"#);
        let sent = &llm.calls()[0];
        assert_eq!(sent[0].content, PLANNER_SYSTEM);
        assert!(sent[1].content.contains("user: What is Rust?"));
    }

    /// **Scenario**: The synthesizer includes question, plan and answers, not raw transcripts.
    #[tokio::test]
    async fn synthesizer_prompt_contents() {
        let llm = Arc::new(MockLlm::new("final"));
        let synth = LlmSynthesizer::new(llm.clone());
        let input = SynthesisInput {
            question: "What is Rust?".into(),
            plan: vec!["define it".into()],
            task_results: vec![TaskResult {
                task_index: 0,
                task: "define it".into(),
                status: TaskStatus::Success,
                termination: "answer".into(),
                attempts: 1,
                elapsed: Duration::from_secs(1),
                answer: Some("a language".into()),
                tool_calls: Vec::new(),
                errors: Vec::new(),
                raw_messages: vec![crate::state::TranscriptEntry::new("user", "RAW")],
            }],
            messages: Vec::new(),
        };
        let reply = synth.synthesize(&input).await.unwrap();
        assert_eq!(reply.content(), "final");
        let user = &llm.calls()[0][1].content;
        assert!(user.contains("Original question: What is Rust?"));
        assert!(user.contains("define it"));
        assert!(user.contains("a language"));
        assert!(!user.contains("RAW"));
    }

    /// **Scenario**: LLM failures propagate as errors.
    #[tokio::test]
    async fn llm_failure_propagates() {
        let planner = LlmPlanner::new(Arc::new(MockLlm::failing("down")));
        assert!(planner.plan(&[Message::user("q")]).await.is_err());
    }
}
