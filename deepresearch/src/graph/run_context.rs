//! Run configuration and the context passed into nodes.

use std::collections::HashSet;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::stream::{StreamEvent, StreamMode};

use super::GraphState;

/// Per-run options for `CompiledStateGraph::invoke` / `stream`.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Correlation id attached to graph-level log events.
    pub run_id: Option<String>,
    /// Maximum number of node executions; `None` means unbounded.
    pub recursion_limit: Option<usize>,
}

impl RunConfig {
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }
}

/// Context handed to `Node::run_with_context`: run config, optional stream sender,
/// and the enabled stream modes.
pub struct RunContext<S>
where
    S: GraphState,
{
    pub config: RunConfig,
    pub stream_tx: Option<mpsc::Sender<StreamEvent<S>>>,
    pub stream_mode: HashSet<StreamMode>,
}

impl<S> Clone for RunContext<S>
where
    S: GraphState,
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            stream_tx: self.stream_tx.clone(),
            stream_mode: self.stream_mode.clone(),
        }
    }
}

impl<S> RunContext<S>
where
    S: GraphState,
{
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            stream_tx: None,
            stream_mode: HashSet::new(),
        }
    }

    /// True when a sender is attached and `mode` is enabled.
    pub fn is_streaming(&self, mode: StreamMode) -> bool {
        self.stream_tx.is_some() && self.stream_mode.contains(&mode)
    }

    /// Emits a custom JSON payload. Only sends if `StreamMode::Custom` is enabled.
    ///
    /// Returns `true` if the event was sent.
    pub async fn emit_custom(&self, value: Value) -> bool {
        if !self.stream_mode.contains(&StreamMode::Custom) {
            return false;
        }
        match &self.stream_tx {
            Some(tx) => tx.send(StreamEvent::Custom(value)).await.is_ok(),
            None => false,
        }
    }

    pub(super) async fn send(&self, mode: StreamMode, event: StreamEvent<S>) {
        if let Some(tx) = &self.stream_tx {
            if self.stream_mode.contains(&mode) {
                let _ = tx.send(event).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct S;

    impl GraphState for S {
        type Update = ();
    }

    /// **Scenario**: emit_custom is a no-op without Custom mode or without a sender.
    #[tokio::test]
    async fn emit_custom_respects_mode_and_sender() {
        let ctx = RunContext::<S>::new(RunConfig::default());
        assert!(!ctx.emit_custom(serde_json::json!({"a": 1})).await);

        let (tx, mut rx) = mpsc::channel(4);
        let mut ctx = RunContext::<S>::new(RunConfig::default());
        ctx.stream_tx = Some(tx);
        assert!(!ctx.emit_custom(serde_json::json!({"a": 1})).await);

        ctx.stream_mode.insert(StreamMode::Custom);
        assert!(ctx.emit_custom(serde_json::json!({"a": 2})).await);
        match rx.recv().await {
            Some(StreamEvent::Custom(v)) => assert_eq!(v["a"], 2),
            other => panic!("expected Custom event, got {:?}", other),
        }
    }

    /// **Scenario**: RunConfig builders set run id and recursion limit.
    #[test]
    fn run_config_builders() {
        let cfg = RunConfig::default()
            .with_run_id("r1")
            .with_recursion_limit(5);
        assert_eq!(cfg.run_id.as_deref(), Some("r1"));
        assert_eq!(cfg.recursion_limit, Some(5));
    }
}
