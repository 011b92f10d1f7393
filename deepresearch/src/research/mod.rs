//! Plan-execute-synthesize research loop on top of the state graph.
//!
//! A planner splits the question into steps, the executor runs a reasoning agent
//! on each step in order (with retries), and a synthesizer writes the final answer
//! from the collected task results. Collaborators are injected as traits; see
//! [`collaborators`].

pub mod collaborators;
pub mod config;
mod executor_node;
mod llm_collaborators;
mod planner_node;
pub mod prompt;
mod runner;
mod select_node;
mod synthesizer_node;

pub use collaborators::{
    AgentRequest, AgentRun, BlockingAgent, BlockingReasoningAgent, Planner, ReasoningAgent,
    Reply, RunLimits, SynthesisInput, Synthesizer,
};
pub use config::{ConfigError, ExecutorConfig, ResearchConfig};
pub use executor_node::{ExecutorNode, EXECUTOR_NODE};
pub use llm_collaborators::{LlmPlanner, LlmSynthesizer};
pub use planner_node::{PlannerNode, PLANNER_NODE};
pub use runner::{
    create_runner, route_after_select, ResearchError, ResearchInput, ResearchOutput,
    ResearchRunner,
};
pub use select_node::{instruction_message, SelectTaskNode, SELECT_TASK_NODE};
pub use synthesizer_node::{SynthesizerNode, SYNTHESIZER_NODE};
