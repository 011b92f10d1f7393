//! State graph: nodes, explicit edges, conditional routing, and a compiled runner.
//!
//! Build a [`StateGraph`] with an explicit [`StateUpdater`](crate::channels::StateUpdater),
//! register nodes, connect them with `add_edge(START, ..)` / `add_edge(.., END)` and
//! `add_conditional_edges`, then `compile()` into a [`CompiledStateGraph`] and call
//! `invoke` or `stream`.
//!
//! Nodes never mutate state: each returns a partial update (`S::Update`) that the
//! driver merges through the graph's updater before routing to the next node.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod logging_middleware;
mod next;
mod node;
mod node_middleware;
mod run_context;
mod state_graph;

use std::fmt::Debug;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
pub use logging_middleware::LoggingNodeMiddleware;
pub use next::Next;
pub use node::Node;
pub use node_middleware::{NodeFuture, NodeInner, NodeMiddleware};
pub use run_context::{RunConfig, RunContext};
pub use state_graph::{StateGraph, END, START};

/// State carried through a graph run.
///
/// `Update` is what a node returns: a partial change that the graph's updater
/// merges into the current state.
pub trait GraphState: Clone + Send + Sync + Debug + 'static {
    type Update: Send + Debug + 'static;
}
