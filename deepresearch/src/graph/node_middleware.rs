//! Node middleware: wrap node.run with external async logic (around pattern).
//!
//! Set via `StateGraph::with_middleware`.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

use crate::error::AgentError;

use super::{GraphState, Next};

/// Boxed future returned by a node run.
pub type NodeFuture<S> =
    Pin<Box<dyn Future<Output = Result<(<S as GraphState>::Update, Next), AgentError>> + Send>>;

/// The wrapped node call handed to middleware. Takes an owned snapshot of the state.
pub type NodeInner<S> = Box<dyn FnOnce(S) -> NodeFuture<S> + Send>;

/// Async middleware that wraps node.run.
///
/// Implementations decide when to call `inner` and may inspect or replace the result.
#[async_trait]
pub trait NodeMiddleware<S>: Send + Sync
where
    S: GraphState,
{
    /// - `node_id`: current node id
    /// - `state`: state snapshot passed to the node
    /// - `inner`: actual node.run logic, must be called to execute the node
    async fn around_run(
        &self,
        node_id: &str,
        state: S,
        inner: NodeInner<S>,
    ) -> Result<(S::Update, Next), AgentError>;
}
