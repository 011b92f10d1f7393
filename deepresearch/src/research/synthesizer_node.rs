//! Synthesizer node: writes the final answer from the plan and task records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunConfig, RunContext};
use crate::message::{Message, MessageMetadata, MessageSource};
use crate::state::{ResearchState, ResearchUpdate, TaskResult};

use super::collaborators::{SynthesisInput, Synthesizer};

pub const SYNTHESIZER_NODE: &str = "synthesizer";

pub struct SynthesizerNode {
    synthesizer: Arc<dyn Synthesizer>,
}

impl SynthesizerNode {
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self { synthesizer }
    }
}

/// Best-effort answer when the synthesizer fails: the error, then each successful
/// step's answer.
fn fallback_message(error: &AgentError, results: &[TaskResult]) -> Message {
    let mut lines = vec![format!("Synthesis failed: {}", error)];
    lines.extend(results.iter().filter(|r| r.is_success()).map(|r| {
        format!(
            "Step {} ({}): {}",
            r.task_index + 1,
            r.task,
            r.answer.as_deref().unwrap_or("")
        )
    }));
    let metadata = MessageMetadata {
        status: Some("failed".to_string()),
        errors: vec![error.to_string()],
        ..MessageMetadata::from_source(MessageSource::Synthesizer)
    };
    Message::assistant(lines.join("\n")).with_metadata(metadata)
}

#[async_trait]
impl Node<ResearchState> for SynthesizerNode {
    fn id(&self) -> &str {
        SYNTHESIZER_NODE
    }

    async fn run(&self, state: &ResearchState) -> Result<(ResearchUpdate, Next), AgentError> {
        let ctx = RunContext::new(RunConfig::default());
        self.run_with_context(state, &ctx).await
    }

    async fn run_with_context(
        &self,
        state: &ResearchState,
        ctx: &RunContext<ResearchState>,
    ) -> Result<(ResearchUpdate, Next), AgentError> {
        let input = SynthesisInput {
            question: state.question().to_string(),
            plan: state.plan.clone(),
            task_results: state.task_results.clone(),
            messages: state.messages.clone(),
        };

        let message = match self.synthesizer.synthesize(&input).await {
            Ok(reply) => {
                let mut message = reply.into_message();
                if message.metadata.source.is_none() {
                    message.metadata.source = Some(MessageSource::Synthesizer);
                }
                info!(chars = message.content.len(), "synthesis done");
                message
            }
            Err(e) => {
                warn!(error = %e, "synthesizer failed; returning best-effort answer");
                fallback_message(&e, &state.task_results)
            }
        };

        ctx.emit_custom(json!({"event": "synthesis_done"})).await;
        Ok((ResearchUpdate::new().message(message), Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::research::collaborators::Reply;
    use crate::state::TaskStatus;

    #[derive(Default)]
    struct RecordingSynth {
        seen: Mutex<Option<SynthesisInput>>,
        fail: bool,
    }

    #[async_trait]
    impl Synthesizer for RecordingSynth {
        async fn synthesize(&self, input: &SynthesisInput) -> Result<Reply, AgentError> {
            if let Ok(mut seen) = self.seen.lock() {
                *seen = Some(input.clone());
            }
            if self.fail {
                return Err(AgentError::ExecutionFailed("model offline".into()));
            }
            Ok(Reply::from("final answer"))
        }
    }

    fn result(index: usize, status: TaskStatus, answer: Option<&str>) -> TaskResult {
        TaskResult {
            task_index: index,
            task: format!("task {}", index + 1),
            status,
            termination: "answer".into(),
            attempts: 1,
            elapsed: Duration::ZERO,
            answer: answer.map(String::from),
            tool_calls: Vec::new(),
            errors: Vec::new(),
            raw_messages: Vec::new(),
        }
    }

    fn state() -> ResearchState {
        ResearchState {
            messages: vec![
                Message::system("sys"),
                Message::user("What is Rust?"),
                Message::user("follow-up"),
            ],
            plan: vec!["task 1".into(), "task 2".into()],
            current_task_index: 2,
            task_results: vec![
                result(0, TaskStatus::Success, Some("a language")),
                result(1, TaskStatus::Failed, None),
            ],
            ..ResearchState::default()
        }
    }

    /// **Scenario**: The synthesizer sees the first user message as the question.
    #[tokio::test]
    async fn passes_question_and_records() {
        let synth = Arc::new(RecordingSynth::default());
        let node = SynthesizerNode::new(synth.clone());
        let (update, _) = node.run(&state()).await.unwrap();

        assert_eq!(update.messages.len(), 1);
        assert_eq!(update.messages[0].content, "final answer");
        assert_eq!(
            update.messages[0].metadata.source,
            Some(MessageSource::Synthesizer)
        );
        let seen = synth.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.question, "What is Rust?");
        assert_eq!(seen.plan.len(), 2);
        assert_eq!(seen.task_results.len(), 2);
        assert_eq!(seen.messages.len(), 3);
    }

    /// **Scenario**: A synthesizer error becomes a best-effort answer from successful steps.
    #[tokio::test]
    async fn failure_falls_back_to_step_answers() {
        let synth = Arc::new(RecordingSynth {
            fail: true,
            ..RecordingSynth::default()
        });
        let (update, _) = SynthesizerNode::new(synth).run(&state()).await.unwrap();
        let msg = &update.messages[0];
        assert_eq!(
            msg.content,
            "Synthesis failed: execution failed: model offline\nStep 1 (task 1): a language"
        );
        assert_eq!(msg.metadata.status.as_deref(), Some("failed"));
    }
}
