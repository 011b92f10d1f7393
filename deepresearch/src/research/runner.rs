//! Research graph runner: build, prepare input, invoke and stream.
//!
//! Graph: START → planner → select_task → [executor_ready] → executor | synthesizer;
//! executor → select_task; synthesizer → END.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{
    CompilationError, CompiledStateGraph, LoggingNodeMiddleware, RunConfig, RunContext,
    StateGraph, END, START,
};
use crate::llm::ChatOpenAI;
use crate::message::{Message, Role};
use crate::state::{ResearchReducer, ResearchState, TaskResult};
use crate::stream::{StreamEvent, StreamMode};

use super::collaborators::{Planner, ReasoningAgent, Synthesizer};
use super::config::{ConfigError, ExecutorConfig, ResearchConfig, LLM_TIMEOUT_SECONDS};
use super::executor_node::{ExecutorNode, EXECUTOR_NODE};
use super::llm_collaborators::{LlmPlanner, LlmSynthesizer};
use super::planner_node::{PlannerNode, PLANNER_NODE};
use super::select_node::{SelectTaskNode, SELECT_TASK_NODE};
use super::synthesizer_node::{SynthesizerNode, SYNTHESIZER_NODE};

const PLANNER_TEMPERATURE: f32 = 0.0;
const SYNTHESIZER_TEMPERATURE: f32 = 0.2;

/// Routing after task selection: execute the armed step, otherwise synthesize.
pub fn route_after_select(state: &ResearchState) -> &'static str {
    if state.executor_ready && !state.plan_exhausted() {
        EXECUTOR_NODE
    } else {
        SYNTHESIZER_NODE
    }
}

/// Error type for ResearchRunner operations.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("compilation failed: {0}")]
    Compilation(#[from] CompilationError),
    #[error("execution failed: {0}")]
    Execution(#[from] AgentError),
    #[error("a question or at least one message is required")]
    MissingInput,
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Caller input: prior conversation plus an optional new question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchInput {
    pub question: Option<String>,
    pub messages: Vec<Message>,
}

impl ResearchInput {
    pub fn question(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            messages: Vec::new(),
        }
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Blank messages are dropped; a non-blank question is appended as a user message.
    fn into_messages(self) -> Result<Vec<Message>, ResearchError> {
        let mut messages: Vec<Message> = self
            .messages
            .into_iter()
            .filter(|m| !m.content.trim().is_empty())
            .collect();
        if let Some(question) = self.question.filter(|q| !q.trim().is_empty()) {
            messages.push(Message::user(question));
        }
        if messages.is_empty() {
            return Err(ResearchError::MissingInput);
        }
        Ok(messages)
    }
}

/// Final answer and the full record of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchOutput {
    /// Content of the last assistant message; empty if there is none.
    pub answer: String,
    pub messages: Vec<Message>,
    pub plan: Vec<String>,
    pub task_results: Vec<TaskResult>,
}

impl ResearchOutput {
    pub fn from_state(state: ResearchState) -> Self {
        let answer = state
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Self {
            answer,
            messages: state.messages,
            plan: state.plan,
            task_results: state.task_results,
        }
    }

    /// Messages as JSON values, for callers that hand them to another service.
    pub fn serialized_messages(&self) -> Vec<Value> {
        self.messages
            .iter()
            .filter_map(|m| serde_json::to_value(m).ok())
            .collect()
    }
}

/// Research graph runner: owns the compiled plan-execute-synthesize graph.
pub struct ResearchRunner {
    compiled: CompiledStateGraph<ResearchState>,
}

impl ResearchRunner {
    /// Builds and compiles the graph around the given collaborators.
    ///
    /// When `verbose` is true, every node run is logged by `LoggingNodeMiddleware`.
    pub fn new(
        planner: Arc<dyn Planner>,
        agent: Arc<dyn ReasoningAgent>,
        synthesizer: Arc<dyn Synthesizer>,
        executor_config: ExecutorConfig,
        verbose: bool,
    ) -> Result<Self, ResearchError> {
        executor_config.validate()?;

        let mut graph = StateGraph::<ResearchState>::new(Arc::new(ResearchReducer));
        let path_map: HashMap<String, String> = [
            (EXECUTOR_NODE.to_string(), EXECUTOR_NODE.to_string()),
            (SYNTHESIZER_NODE.to_string(), SYNTHESIZER_NODE.to_string()),
        ]
        .into_iter()
        .collect();

        graph
            .add_node(PLANNER_NODE, Arc::new(PlannerNode::new(planner)))
            .add_node(SELECT_TASK_NODE, Arc::new(SelectTaskNode::new()))
            .add_node(
                EXECUTOR_NODE,
                Arc::new(ExecutorNode::new(agent, executor_config)),
            )
            .add_node(SYNTHESIZER_NODE, Arc::new(SynthesizerNode::new(synthesizer)))
            .add_edge(START, PLANNER_NODE)
            .add_edge(PLANNER_NODE, SELECT_TASK_NODE)
            .add_conditional_edges(
                SELECT_TASK_NODE,
                Arc::new(|state: &ResearchState| route_after_select(state).to_string()),
                Some(path_map),
            )
            .add_edge(EXECUTOR_NODE, SELECT_TASK_NODE)
            .add_edge(SYNTHESIZER_NODE, END);

        let graph = if verbose {
            graph.with_middleware(Arc::new(LoggingNodeMiddleware::<ResearchState>::default()))
        } else {
            graph
        };

        Ok(Self {
            compiled: graph.compile()?,
        })
    }

    /// Runs one research request to completion.
    pub async fn invoke(&self, input: ResearchInput) -> Result<ResearchOutput, ResearchError> {
        let state = ResearchState::new(input.into_messages()?);
        let config = RunConfig::default().with_run_id(uuid::Uuid::new_v4().to_string());
        self.run(state, RunContext::new(config)).await
    }

    /// Blocking variant of [`invoke`](Self::invoke).
    ///
    /// The run owns a current-thread runtime on a scoped thread, so this may also be
    /// called from inside a tokio runtime; the calling thread blocks until it finishes.
    pub fn invoke_blocking(&self, input: ResearchInput) -> Result<ResearchOutput, ResearchError> {
        std::thread::scope(|scope| {
            scope
                .spawn(|| -> Result<ResearchOutput, ResearchError> {
                    let runtime = tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()?;
                    runtime.block_on(self.invoke(input))
                })
                .join()
                .unwrap_or_else(|_| {
                    Err(ResearchError::Execution(AgentError::ExecutionFailed(
                        "blocking research thread panicked".to_string(),
                    )))
                })
        })
    }

    /// Runs with every stream mode on, passing each event to `on_event` as it arrives.
    pub async fn stream_with_callback<F>(
        &self,
        input: ResearchInput,
        mut on_event: F,
    ) -> Result<ResearchOutput, ResearchError>
    where
        F: FnMut(StreamEvent<ResearchState>),
    {
        let state = ResearchState::new(input.into_messages()?);
        let (tx, mut rx) = mpsc::channel(128);
        let mut ctx = RunContext::new(
            RunConfig::default().with_run_id(uuid::Uuid::new_v4().to_string()),
        );
        ctx.stream_tx = Some(tx);
        ctx.stream_mode = HashSet::from([
            StreamMode::Values,
            StreamMode::Updates,
            StreamMode::Custom,
            StreamMode::Tasks,
        ]);

        // The sender lives in `ctx`, so the drain ends once the run returns.
        let (result, ()) = tokio::join!(self.run(state, ctx), async {
            while let Some(event) = rx.recv().await {
                on_event(event);
            }
        });
        result
    }

    async fn run(
        &self,
        state: ResearchState,
        ctx: RunContext<ResearchState>,
    ) -> Result<ResearchOutput, ResearchError> {
        let run_id = ctx.config.run_id.clone().unwrap_or_default();
        match self.compiled.invoke_with_context(state, ctx).await {
            Ok(final_state) => {
                info!(
                    run_id = %run_id,
                    tasks = final_state.task_results.len(),
                    failed = final_state
                        .task_results
                        .iter()
                        .filter(|r| !r.is_success())
                        .count(),
                    "research run finished"
                );
                Ok(ResearchOutput::from_state(final_state))
            }
            Err(e) => {
                warn!(run_id = %run_id, error = %e, "research run failed");
                Err(e.into())
            }
        }
    }
}

/// Builds a runner with OpenAI-compatible planner and synthesizer LLMs from `config`.
///
/// The reasoning agent is supplied by the caller together with its tools.
pub fn create_runner(
    config: &ResearchConfig,
    agent: Arc<dyn ReasoningAgent>,
) -> Result<ResearchRunner, ResearchError> {
    let api_key = config.api_key.clone().ok_or(ConfigError::MissingApiKey)?;
    let planner_llm = ChatOpenAI::compatible(
        api_key.clone(),
        config.base_url.clone(),
        config.planner_model.clone(),
    )
    .with_temperature(PLANNER_TEMPERATURE)
    .with_timeout(Duration::from_secs(LLM_TIMEOUT_SECONDS));
    let synthesizer_llm = ChatOpenAI::compatible(
        api_key,
        config.base_url.clone(),
        config.synthesizer_model.clone(),
    )
    .with_temperature(SYNTHESIZER_TEMPERATURE)
    .with_timeout(Duration::from_secs(LLM_TIMEOUT_SECONDS));

    let verbose = matches!(
        config.log_level.to_ascii_lowercase().as_str(),
        "debug" | "trace"
    );
    ResearchRunner::new(
        Arc::new(LlmPlanner::new(Arc::new(planner_llm))),
        agent,
        Arc::new(LlmSynthesizer::new(Arc::new(synthesizer_llm))),
        config.executor_config(),
        verbose,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Routing follows the armed flag and the index/plan comparison.
    #[test]
    fn route_after_select_cases() {
        let mut state = ResearchState {
            plan: vec!["a".into()],
            executor_ready: true,
            ..ResearchState::default()
        };
        assert_eq!(route_after_select(&state), EXECUTOR_NODE);
        state.executor_ready = false;
        assert_eq!(route_after_select(&state), SYNTHESIZER_NODE);
        state.executor_ready = true;
        state.current_task_index = 1;
        assert_eq!(route_after_select(&state), SYNTHESIZER_NODE);
    }

    /// **Scenario**: Blank messages are dropped and the question is appended last.
    #[test]
    fn input_preparation() {
        let input = ResearchInput::question("new question").with_messages(vec![
            Message::user("earlier"),
            Message::assistant("   "),
        ]);
        let messages = input.into_messages().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], Message::user("new question"));

        let empty = ResearchInput {
            question: Some("  ".into()),
            messages: Vec::new(),
        };
        assert!(matches!(
            empty.into_messages(),
            Err(ResearchError::MissingInput)
        ));
    }

    /// **Scenario**: The answer is the last assistant message.
    #[test]
    fn output_answer_is_last_assistant() {
        let state = ResearchState::new(vec![
            Message::user("q"),
            Message::assistant("first"),
            Message::assistant("final"),
            Message::user("trailing"),
        ]);
        let output = ResearchOutput::from_state(state);
        assert_eq!(output.answer, "final");
        assert_eq!(output.serialized_messages()[0]["role"], "user");
        assert_eq!(ResearchOutput::from_state(ResearchState::default()).answer, "");
    }

    /// **Scenario**: create_runner refuses a config without an API key.
    #[test]
    fn create_runner_needs_api_key() {
        struct Never;
        #[async_trait::async_trait]
        impl ReasoningAgent for Never {
            async fn run(
                &self,
                _request: super::super::collaborators::AgentRequest,
            ) -> Result<super::super::collaborators::AgentRun, AgentError> {
                Err(AgentError::ExecutionFailed("unused".into()))
            }
        }
        let result = create_runner(&ResearchConfig::default(), Arc::new(Never));
        assert!(matches!(
            result,
            Err(ResearchError::Config(ConfigError::MissingApiKey))
        ));
    }
}
