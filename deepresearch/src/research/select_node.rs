//! Task selection: arms the executor for the next step or lets the run fall through
//! to synthesis.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunConfig, RunContext};
use crate::message::{Message, MessageMetadata, MessageSource};
use crate::state::{ResearchState, ResearchUpdate};

pub const SELECT_TASK_NODE: &str = "select_task";

#[derive(Debug, Default, Clone, Copy)]
pub struct SelectTaskNode;

impl SelectTaskNode {
    pub fn new() -> Self {
        Self
    }
}

/// User-role instruction naming the step to execute.
pub fn instruction_message(index: usize, total: usize, task: &str) -> Message {
    let metadata = MessageMetadata {
        task_index: Some(index),
        ..MessageMetadata::from_source(MessageSource::PlannerInstructions)
    };
    Message::user(format!("Execute step {} of {}: {}", index + 1, total, task))
        .with_metadata(metadata)
}

#[async_trait]
impl Node<ResearchState> for SelectTaskNode {
    fn id(&self) -> &str {
        SELECT_TASK_NODE
    }

    async fn run(&self, state: &ResearchState) -> Result<(ResearchUpdate, Next), AgentError> {
        let ctx = RunContext::new(RunConfig::default());
        self.run_with_context(state, &ctx).await
    }

    async fn run_with_context(
        &self,
        state: &ResearchState,
        ctx: &RunContext<ResearchState>,
    ) -> Result<(ResearchUpdate, Next), AgentError> {
        let index = state.current_task_index;
        let Some(task) = state.current_task() else {
            debug!(
                task_index = index,
                plan_len = state.plan.len(),
                "plan exhausted"
            );
            let update = ResearchUpdate::new()
                .executor_ready(false)
                .active_task_index(None);
            return Ok((update, Next::Continue));
        };

        info!(task_index = index, task = %task, "task selected");
        ctx.emit_custom(json!({"event": "task_started", "task_index": index, "task": task}))
            .await;

        let update = ResearchUpdate::new()
            .message(instruction_message(index, state.plan.len(), task))
            .executor_ready(true)
            .active_task_index(Some(index));
        Ok((update, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: With steps left, the executor is armed with an instruction message.
    #[tokio::test]
    async fn arms_next_step() {
        let state = ResearchState {
            plan: vec!["a".into(), "b".into()],
            current_task_index: 1,
            ..ResearchState::default()
        };
        let (update, _) = SelectTaskNode::new().run(&state).await.unwrap();
        assert_eq!(update.executor_ready, Some(true));
        assert_eq!(update.active_task_index, Some(Some(1)));
        let msg = &update.messages[0];
        assert!(msg.is_user());
        assert_eq!(msg.content, "Execute step 2 of 2: b");
        assert_eq!(msg.metadata.task_index, Some(1));
        assert_eq!(
            msg.metadata.source,
            Some(MessageSource::PlannerInstructions)
        );
    }

    /// **Scenario**: An exhausted plan disarms the executor and adds no message.
    #[tokio::test]
    async fn exhausted_plan_disarms() {
        let state = ResearchState {
            plan: vec!["a".into()],
            current_task_index: 1,
            ..ResearchState::default()
        };
        let (update, _) = SelectTaskNode::new().run(&state).await.unwrap();
        assert_eq!(update.executor_ready, Some(false));
        assert_eq!(update.active_task_index, Some(None));
        assert!(update.messages.is_empty());
    }
}
