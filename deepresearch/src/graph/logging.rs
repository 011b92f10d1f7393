//! Logging utilities for graph execution.
//!
//! Structured `tracing` events for graph start/end, node execution, and state updates.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Log the state at the start of node execution (trace level; states can be large).
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::trace!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

pub fn log_state_update<U: Debug>(node_id: &str, update: &U) {
    tracing::trace!(node_id = node_id, update = ?update, "State updated");
}

pub fn log_graph_start(run_id: Option<&str>) {
    tracing::info!(run_id = run_id.unwrap_or("-"), "Starting graph execution");
}

pub fn log_graph_complete(run_id: Option<&str>, steps: usize) {
    tracing::info!(
        run_id = run_id.unwrap_or("-"),
        steps,
        "Graph execution complete"
    );
}

pub fn log_graph_error(error: &AgentError) {
    tracing::error!(error = %error, "Graph execution error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_functions() {
        log_node_start("test_node");
        log_node_state("test_node", &());
        log_node_complete("test_node", &Next::End);
        log_state_update("test_node", &Some(1));
        log_graph_start(Some("run-1"));
        log_graph_start(None);
        log_graph_complete(None, 3);
        log_graph_error(&AgentError::ExecutionFailed("test".to_string()));
    }
}
