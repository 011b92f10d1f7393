//! Compiled state graph: immutable, supports `invoke` and `stream`.
//!
//! Built by `StateGraph::compile`. Runs from the START node; after every node the
//! partial update is merged through the graph's updater, then the next node is
//! resolved (conditional router first, then the node's `Next`, then its edge).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::channels::BoxedStateUpdater;
use crate::error::AgentError;
use crate::stream::{StreamEvent, StreamMode};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_node_state, log_state_update,
};
use super::node_middleware::{NodeFuture, NodeInner, NodeMiddleware};
use super::state_graph::END;
use super::{GraphState, Next, NextEntry, Node, RunConfig, RunContext};

/// Compiled graph: immutable structure ready to run.
pub struct CompiledStateGraph<S>
where
    S: GraphState,
{
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// First node to run (target of the START edge).
    pub(super) first_node_id: String,
    /// Node id -> how to find the next node.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) middleware: Option<Arc<dyn NodeMiddleware<S>>>,
    pub(super) state_updater: BoxedStateUpdater<S>,
}

impl<S> Clone for CompiledStateGraph<S>
where
    S: GraphState,
{
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            first_node_id: self.first_node_id.clone(),
            next_map: self.next_map.clone(),
            middleware: self.middleware.clone(),
            state_updater: Arc::clone(&self.state_updater),
        }
    }
}

impl<S> CompiledStateGraph<S>
where
    S: GraphState,
{
    async fn execute_node(
        &self,
        node: Arc<dyn Node<S>>,
        state: &S,
        run_ctx: &RunContext<S>,
    ) -> Result<(S::Update, Next), AgentError> {
        match &self.middleware {
            Some(middleware) => {
                let node_id = node.id().to_string();
                let ctx = run_ctx.clone();
                let inner: NodeInner<S> = Box::new(move |s: S| -> NodeFuture<S> {
                    Box::pin(async move { node.run_with_context(&s, &ctx).await })
                });
                middleware.around_run(&node_id, state.clone(), inner).await
            }
            None => node.run_with_context(state, run_ctx).await,
        }
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Some(target)
            }
            Some(NextEntry::Unconditional(to)) => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => Some(to.clone()),
            },
            None => match next {
                Next::Node(id) => Some(id),
                Next::End | Next::Continue => None,
            },
        }
    }

    /// Logs a run failure raised before `node_id` started and reports it as that
    /// node's `TaskEnd`, so streams never end without the error.
    async fn abort_before(node_id: &str, err: AgentError, run_ctx: &RunContext<S>) -> AgentError {
        log_graph_error(&err);
        run_ctx
            .send(
                StreamMode::Tasks,
                StreamEvent::TaskEnd {
                    node_id: node_id.to_string(),
                    result: Err(err.to_string()),
                },
            )
            .await;
        err
    }

    /// Shared run loop used by `invoke` and `stream`: steps through nodes until END.
    async fn run_loop_inner(&self, state: &mut S, run_ctx: &RunContext<S>) -> Result<(), AgentError> {
        let run_id = run_ctx.config.run_id.as_deref();
        log_graph_start(run_id);

        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;
        loop {
            if let Some(limit) = run_ctx.config.recursion_limit {
                if steps >= limit {
                    let err = AgentError::RecursionLimit(limit);
                    return Err(Self::abort_before(&current_id, err, run_ctx).await);
                }
            }
            let node = match self.nodes.get(&current_id) {
                Some(node) => Arc::clone(node),
                None => {
                    let err = AgentError::ExecutionFailed(format!(
                        "routed to unknown node: {}",
                        current_id
                    ));
                    return Err(Self::abort_before(&current_id, err, run_ctx).await);
                }
            };
            steps += 1;

            log_node_start(&current_id);
            log_node_state(&current_id, state);
            run_ctx
                .send(
                    StreamMode::Tasks,
                    StreamEvent::TaskStart {
                        node_id: current_id.clone(),
                    },
                )
                .await;

            let (update, next) = match self.execute_node(node, state, run_ctx).await {
                Ok(output) => output,
                Err(e) => {
                    run_ctx
                        .send(
                            StreamMode::Tasks,
                            StreamEvent::TaskEnd {
                                node_id: current_id.clone(),
                                result: Err(e.to_string()),
                            },
                        )
                        .await;
                    log_graph_error(&e);
                    return Err(e);
                }
            };

            run_ctx
                .send(
                    StreamMode::Tasks,
                    StreamEvent::TaskEnd {
                        node_id: current_id.clone(),
                        result: Ok(()),
                    },
                )
                .await;
            log_node_complete(&current_id, &next);

            log_state_update(&current_id, &update);
            self.state_updater.apply_update(state, update);

            if run_ctx.is_streaming(StreamMode::Values) {
                run_ctx
                    .send(StreamMode::Values, StreamEvent::Values(state.clone()))
                    .await;
            }
            if run_ctx.is_streaming(StreamMode::Updates) {
                run_ctx
                    .send(
                        StreamMode::Updates,
                        StreamEvent::Updates {
                            node_id: current_id.clone(),
                            state: state.clone(),
                        },
                    )
                    .await;
            }

            match self.resolve_next(&current_id, state, next) {
                Some(id) if id != END => current_id = id,
                _ => {
                    log_graph_complete(run_id, steps);
                    return Ok(());
                }
            }
        }
    }

    /// Runs the graph to completion and returns the final state.
    ///
    /// - `Next::Continue`: follow the node's edge (END if none).
    /// - `Next::Node(id)`: run that node next.
    /// - `Next::End`: stop.
    ///
    /// Nodes with conditional edges are always routed by their router.
    pub async fn invoke(&self, state: S, config: Option<RunConfig>) -> Result<S, AgentError> {
        let run_ctx = RunContext::new(config.unwrap_or_default());
        self.invoke_with_context(state, run_ctx).await
    }

    /// Runs the graph with a caller-built `RunContext` (e.g. with a stream sender attached).
    pub async fn invoke_with_context(
        &self,
        state: S,
        run_ctx: RunContext<S>,
    ) -> Result<S, AgentError> {
        let mut state = state;
        self.run_loop_inner(&mut state, &run_ctx).await?;
        Ok(state)
    }

    /// Streams graph execution, emitting events for the given modes through a channel-backed stream.
    ///
    /// The run happens on a spawned task; the stream ends when the run finishes. A
    /// failed run ends the stream after a `TaskEnd` carrying the error (when `Tasks` is on).
    pub fn stream(
        &self,
        state: S,
        config: Option<RunConfig>,
        stream_mode: impl Into<HashSet<StreamMode>>,
    ) -> ReceiverStream<StreamEvent<S>> {
        let (tx, rx) = mpsc::channel(128);
        let graph = self.clone();
        let mut run_ctx = RunContext::new(config.unwrap_or_default());
        run_ctx.stream_tx = Some(tx);
        run_ctx.stream_mode = stream_mode.into();

        tokio::spawn(async move {
            let mut state = state;
            if let Err(e) = graph.run_loop_inner(&mut state, &run_ctx).await {
                tracing::debug!(error = %e, "stream run ended with error");
            }
        });

        ReceiverStream::new(rx)
    }
}
