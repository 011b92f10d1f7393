//! Graph node trait: one step in a StateGraph.
//!
//! Receives a borrowed state `S`, returns a partial update `S::Update` and a [`Next`].
//! The compiled graph merges the update through its updater; nodes never mutate
//! state themselves.

use async_trait::async_trait;

use crate::error::AgentError;

use super::{GraphState, Next, RunContext};

/// One step in a graph: state in, (partial update, next step) out.
///
/// **Interaction**: Registered via `StateGraph::add_node`; run by
/// `CompiledStateGraph::invoke` and `stream`.
#[async_trait]
pub trait Node<S>: Send + Sync
where
    S: GraphState,
{
    /// Node id (e.g. `"planner"`). Must be unique within a graph.
    fn id(&self) -> &str;

    /// One step. Return `Next::Continue` to follow the outgoing edge,
    /// `Next::Node(id)` to jump, `Next::End` to stop.
    async fn run(&self, state: &S) -> Result<(S::Update, Next), AgentError>;

    /// Variant with run context (streaming, config).
    ///
    /// Default implementation calls `run` and ignores the context.
    async fn run_with_context(
        &self,
        state: &S,
        _ctx: &RunContext<S>,
    ) -> Result<(S::Update, Next), AgentError> {
        self.run(state).await
    }
}
