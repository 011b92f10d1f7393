//! Planner node: asks the planner collaborator for a plan and parses it into steps.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunConfig, RunContext};
use crate::message::{Message, MessageMetadata, MessageSource};
use crate::parse::extract_plan;
use crate::state::{ResearchState, ResearchUpdate};

use super::collaborators::Planner;

pub const PLANNER_NODE: &str = "planner";

/// Appends the planner's reply, sets the plan and resets the step index to 0.
///
/// A failing planner does not fail the run: a `Planning failed` notice is appended
/// and the plan stays empty, which routes straight to synthesis.
pub struct PlannerNode {
    planner: Arc<dyn Planner>,
}

impl PlannerNode {
    pub fn new(planner: Arc<dyn Planner>) -> Self {
        Self { planner }
    }
}

#[async_trait]
impl Node<ResearchState> for PlannerNode {
    fn id(&self) -> &str {
        PLANNER_NODE
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
        let (message, plan) = match self.planner.plan(&state.messages).await {
            Ok(reply) => {
                let plan = extract_plan(reply.content());
                let mut message = reply.into_message();
                if message.metadata.source.is_none() {
                    message.metadata.source = Some(MessageSource::Planner);
                }
                (message, plan)
            }
            Err(e) => {
                warn!(error = %e, "planner failed; continuing with an empty plan");
                let metadata = MessageMetadata {
                    status: Some("failed".to_string()),
                    errors: vec![e.to_string()],
                    ..MessageMetadata::from_source(MessageSource::Planner)
                };
                let message =
                    Message::assistant(format!("Planning failed: {}", e)).with_metadata(metadata);
                (message, Vec::new())
            }
        };

        info!(steps = plan.len(), "plan ready");
        ctx.emit_custom(json!({"event": "plan_ready", "steps": plan.clone()}))
            .await;

        let update = ResearchUpdate::new()
            .message(message)
            .plan(plan)
            .current_task_index(0);
        Ok((update, Next::Continue))
    }
}
