//! Executor node: runs the reasoning agent on the armed plan step, with sequential
//! retries and a per-attempt time budget.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunConfig, RunContext};
use crate::message::{Message, MessageMetadata, MessageSource};
use crate::parse::{collect_tool_calls, convert_transcript};
use crate::state::{
    ResearchState, ResearchUpdate, TaskResult, TaskStatus, TERMINATION_EXCEPTION,
};

use super::collaborators::{AgentRequest, AgentRun, ReasoningAgent, RunLimits};
use super::config::ExecutorConfig;

pub const EXECUTOR_NODE: &str = "executor";

/// Executes one plan step per visit.
///
/// The agent is called at most `max_retries` times and stops at the first success.
/// Success or exhaustion both advance `current_task_index` by one; the executor is
/// always disarmed afterwards.
pub struct ExecutorNode {
    agent: Arc<dyn ReasoningAgent>,
    config: ExecutorConfig,
}

impl ExecutorNode {
    pub fn new(agent: Arc<dyn ReasoningAgent>, config: ExecutorConfig) -> Self {
        Self { agent, config }
    }

    fn limits(&self) -> RunLimits {
        RunLimits {
            max_rounds: self.config.max_rounds,
            max_runtime_seconds: self.config.timeout_seconds,
        }
    }

    /// One agent call. An overrunning call is only detected once it returns.
    async fn attempt(&self, task: &str, attempt: u32) -> Result<AgentRun, String> {
        let started = Instant::now();
        let run = self
            .agent
            .run(AgentRequest::new(task, self.limits()))
            .await
            .map_err(|e| e.to_string())?;
        if let Some(limit) = self.config.timeout_seconds {
            if started.elapsed().as_secs_f64() > limit as f64 {
                return Err(format!(
                    "attempt {} exceeded timeout of {}s",
                    attempt, limit
                ));
            }
        }
        Ok(run)
    }
}

fn failure_message(index: usize, task: &str, errors: &[String]) -> Message {
    let last = errors
        .last()
        .map(String::as_str)
        .unwrap_or("unknown error");
    let metadata = MessageMetadata {
        task_index: Some(index),
        status: Some(TaskStatus::Failed.as_str().to_string()),
        errors: errors.to_vec(),
        ..MessageMetadata::from_source(MessageSource::Executor)
    };
    Message::assistant(format!("Task failed: {}\nError: {}", task, last)).with_metadata(metadata)
}

#[async_trait]
impl Node<ResearchState> for ExecutorNode {
    fn id(&self) -> &str {
        EXECUTOR_NODE
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
        let disarm = ResearchUpdate::new()
            .executor_ready(false)
            .active_task_index(None);

        let index = state.current_task_index;
        let Some(task) = state.current_task() else {
            debug!(task_index = index, "no task to execute");
            return Ok((disarm, Next::Continue));
        };

        let max_attempts = self.config.max_retries.max(1);
        let started = Instant::now();
        let mut errors = Vec::new();
        let mut attempts = 0;
        let mut outcome = None;

        while attempts < max_attempts {
            attempts += 1;
            match self.attempt(task, attempts).await {
                Ok(run) => {
                    outcome = Some(run);
                    break;
                }
                Err(error) => {
                    warn!(task_index = index, attempt = attempts, error = %error, "task attempt failed");
                    errors.push(error);
                }
            }
        }
        let elapsed = started.elapsed();

        let (update, status) = match outcome {
            Some(run) => {
                let messages = convert_transcript(&run.messages);
                let result = TaskResult {
                    task_index: index,
                    task: task.to_string(),
                    status: TaskStatus::Success,
                    termination: run.termination,
                    attempts,
                    elapsed,
                    answer: Some(run.prediction),
                    tool_calls: collect_tool_calls(&messages),
                    errors,
                    raw_messages: run.messages,
                };
                info!(
                    task_index = index,
                    attempt = attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "task succeeded"
                );
                (disarm.messages(messages).task_result(result), TaskStatus::Success)
            }
            None => {
                let result = TaskResult {
                    task_index: index,
                    task: task.to_string(),
                    status: TaskStatus::Failed,
                    termination: TERMINATION_EXCEPTION.to_string(),
                    attempts,
                    elapsed,
                    answer: None,
                    tool_calls: Vec::new(),
                    errors: errors.clone(),
                    raw_messages: Vec::new(),
                };
                warn!(
                    task_index = index,
                    attempt = attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "task failed after all attempts"
                );
                (
                    disarm
                        .message(failure_message(index, task, &errors))
                        .task_result(result),
                    TaskStatus::Failed,
                )
            }
        };

        ctx.emit_custom(json!({
            "event": "task_finished",
            "task_index": index,
            "status": status.as_str(),
            "attempts": attempts,
        }))
        .await;

        Ok((update.current_task_index(index + 1), Next::Continue))
    }
}
