//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` sends [`StreamEvent`]s for the enabled
//! [`StreamMode`]s; nodes emit `Custom` payloads through `RunContext::emit_custom`.

use serde_json::Value;

use crate::graph::GraphState;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Full state after each node completes.
    Values,
    /// Node id plus state after that node.
    Updates,
    /// Custom JSON payloads from nodes.
    Custom,
    /// Task start/end events for each node execution.
    Tasks,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: GraphState,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Node id and the state after that node.
    Updates { node_id: String, state: S },
    /// Custom JSON payload.
    Custom(Value),
    /// A node began execution.
    TaskStart { node_id: String },
    /// A node finished: `Ok(())` on success, `Err(message)` on failure.
    TaskEnd {
        node_id: String,
        result: Result<(), String>,
    },
}

impl<S> StreamEvent<S>
where
    S: GraphState,
{
    /// The state carried by `Values` / `Updates`, if any.
    pub fn state(&self) -> Option<&S> {
        match self {
            StreamEvent::Values(s) => Some(s),
            StreamEvent::Updates { state, .. } => Some(state),
            _ => None,
        }
    }
}
