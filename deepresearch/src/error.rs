//! Agent execution error types.
//!
//! Returned by graph nodes and by every collaborator call (planner, reasoning agent,
//! synthesizer, LLM client). The research nodes absorb these into state; only the
//! graph driver and the runner surface them to callers.

use thiserror::Error;

/// Error from one step of work: a node run or a collaborator call.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, agent transport error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// The graph ran more node steps than the run config allows.
    #[error("recursion limit of {0} node steps reached")]
    RecursionLimit(usize),
}
