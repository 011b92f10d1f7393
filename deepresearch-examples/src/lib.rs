//! Shared helpers for the deepresearch examples.
//!
//! The real reasoning agent (search, visit, scholar and Python tools) lives outside
//! this workspace; [`ScriptedAgent`] stands in for it with canned transcripts in the
//! same tag grammar.

use async_trait::async_trait;
use serde_json::json;

use deepresearch::state::TranscriptEntry;
use deepresearch::{AgentError, AgentRequest, AgentRun, ReasoningAgent};

/// Reasoning agent that "searches" once and answers with a canned summary.
///
/// Tasks containing any of `fail_keywords` raise an error on every attempt.
#[derive(Debug, Default, Clone)]
pub struct ScriptedAgent {
    fail_keywords: Vec<String>,
}

impl ScriptedAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, keyword: impl Into<String>) -> Self {
        self.fail_keywords.push(keyword.into());
        self
    }

    fn transcript(question: &str, answer: &str) -> Vec<TranscriptEntry> {
        let call = json!({"name": "search", "arguments": {"query": [question]}});
        vec![
            TranscriptEntry::new("system", "You are a deep research assistant."),
            TranscriptEntry::new("user", question),
            TranscriptEntry::new(
                "assistant",
                format!(
                    "<think>I should search first.</think>\n<tool_call>\n{}\n</tool_call>",
                    call
                ),
            ),
            TranscriptEntry::new(
                "user",
                format!(
                    "<tool_response>\n1. Overview of {} (example.org)\n</tool_response>",
                    question
                ),
            ),
            TranscriptEntry::new(
                "assistant",
                format!("<think>Enough evidence.</think>\n<answer>{}</answer>", answer),
            ),
        ]
    }
}

#[async_trait]
impl ReasoningAgent for ScriptedAgent {
    async fn run(&self, request: AgentRequest) -> Result<AgentRun, AgentError> {
        if let Some(k) = self
            .fail_keywords
            .iter()
            .find(|k| request.question.contains(k.as_str()))
        {
            return Err(AgentError::ExecutionFailed(format!(
                "scripted failure on '{}'",
                k
            )));
        }
        let answer = format!("Findings for \"{}\" (see example.org).", request.question);
        Ok(AgentRun {
            prediction: answer.clone(),
            termination: "answer".to_string(),
            messages: Self::transcript(&request.question, &answer),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepresearch::parse::convert_transcript;
    use deepresearch::RunLimits;

    fn request(q: &str) -> AgentRequest {
        AgentRequest::new(
            q,
            RunLimits {
                max_rounds: 2,
                max_runtime_seconds: None,
            },
        )
    }

    #[tokio::test]
    async fn transcript_parses_into_search_call() {
        let run = ScriptedAgent::new().run(request("rust")).await.unwrap();
        let messages = convert_transcript(&run.messages);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].tool_calls[0].name, "search");
        assert_eq!(messages[0].tool_calls[0].arguments, json!({"query": ["rust"]}));
        assert_eq!(messages[2].content, run.prediction);
    }

    #[tokio::test]
    async fn keyword_failure() {
        let agent = ScriptedAgent::new().failing_on("compare");
        assert!(agent.run(request("compare runtimes")).await.is_err());
        assert!(agent.run(request("list runtimes")).await.is_ok());
    }
}
