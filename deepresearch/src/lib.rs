//! # DeepResearch
//!
//! A plan-execute-synthesize research loop on a small **state-in, state-out** graph
//! engine. One [`ResearchState`] flows through four nodes; each node returns a
//! partial [`ResearchUpdate`] that [`ResearchReducer`] merges before routing.
//!
//! ```text
//! START → planner → select_task ─┬─ executor ─→ select_task
//!                                └─ synthesizer → END
//! ```
//!
//! - **Planner** asks a [`Planner`] collaborator for steps; [`parse::extract_plan`]
//!   tolerates JSON, JSON5-ish text, numbered lists and plain text.
//! - **Task selection** arms the executor for the next step, or falls through to
//!   synthesis once the plan is exhausted.
//! - **Executor** runs a [`ReasoningAgent`] on the step with sequential retries and
//!   a per-attempt time budget, converting the agent's tagged transcript
//!   (`<think>`, `<answer>`, `<tool_call>`, `<tool_response>`) into messages.
//! - **Synthesizer** writes the final answer from the plan and [`TaskResult`]s.
//!
//! Collaborator failures never abort a run: they become failure notices and failed
//! task records. Only invalid configuration or missing input reach the caller.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`], [`RunContext`].
//! - [`channels`]: [`StateUpdater`] and reducer helpers.
//! - [`state`]: [`ResearchState`], [`ResearchUpdate`], [`TaskResult`].
//! - [`parse`]: plan, tool-call and transcript parsing.
//! - [`llm`]: [`LlmClient`], [`MockLlm`], [`ChatOpenAI`].
//! - [`research`]: nodes, collaborator traits, [`ResearchRunner`], [`ResearchConfig`].
//! - [`stream`]: [`StreamEvent`], [`StreamMode`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use deepresearch::{create_runner, ResearchConfig, ResearchInput, ReasoningAgent};
//!
//! # async fn run(agent: Arc<dyn ReasoningAgent>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ResearchConfig::from_env()?;
//! config.validate()?;
//! let runner = create_runner(&config, agent)?;
//! let output = runner.invoke(ResearchInput::question("What changed in Rust 2024?")).await?;
//! println!("{}", output.answer);
//! # Ok(())
//! # }
//! ```

pub mod channels;
pub mod error;
pub mod graph;
pub mod llm;
pub mod message;
pub mod parse;
pub mod research;
pub mod state;
pub mod stream;

pub use channels::{FieldBasedUpdater, ReplaceUpdater, StateUpdater};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, GraphState, LoggingNodeMiddleware, Next, Node,
    NodeMiddleware, RunConfig, RunContext, StateGraph, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, LlmUsage, MockLlm};
pub use message::{Message, MessageMetadata, MessageSource, Role, ToolCall};
pub use research::{
    create_runner, AgentRequest, AgentRun, BlockingAgent, BlockingReasoningAgent, ConfigError,
    ExecutorConfig, LlmPlanner, LlmSynthesizer, Planner, ReasoningAgent, Reply, ResearchConfig,
    ResearchError, ResearchInput, ResearchOutput, ResearchRunner, RunLimits, SynthesisInput,
    Synthesizer,
};
pub use state::{ResearchReducer, ResearchState, ResearchUpdate, TaskResult, TaskStatus};
pub use stream::{StreamEvent, StreamMode};

/// When running `cargo test -p deepresearch`, initializes tracing from `RUST_LOG` so
/// unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
