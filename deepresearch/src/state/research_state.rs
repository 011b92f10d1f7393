//! Shared state of one research run and its explicit merge rules.

use serde::{Deserialize, Serialize};

use crate::channels::{reducers, StateUpdater};
use crate::graph::GraphState;
use crate::message::{Message, Role};

use super::TaskResult;

/// State threaded through planner, task selection, executor and synthesizer.
///
/// Created per run and discarded when the run completes. `messages` and
/// `task_results` only grow; `plan` is written once; `current_task_index` never
/// decreases and never exceeds `plan.len()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchState {
    pub messages: Vec<Message>,
    pub plan: Vec<String>,
    pub current_task_index: usize,
    pub task_results: Vec<TaskResult>,
    /// True only between task selection arming a step and the executor consuming it.
    pub executor_ready: bool,
    /// Index of the step being executed, while an execution is in flight.
    pub active_task_index: Option<usize>,
}

impl GraphState for ResearchState {
    type Update = ResearchUpdate;
}

impl ResearchState {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Content of the first user message, or empty.
    pub fn question(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// The step at `current_task_index`, if the plan is not exhausted.
    pub fn current_task(&self) -> Option<&str> {
        self.plan.get(self.current_task_index).map(String::as_str)
    }

    pub fn plan_exhausted(&self) -> bool {
        self.current_task_index >= self.plan.len()
    }
}

/// Partial update returned by a research node.
///
/// Lists are appended; `Some` scalars overwrite; `None` leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResearchUpdate {
    pub messages: Vec<Message>,
    pub task_results: Vec<TaskResult>,
    pub plan: Option<Vec<String>>,
    pub current_task_index: Option<usize>,
    pub executor_ready: Option<bool>,
    /// `Some(None)` clears the active index.
    pub active_task_index: Option<Option<usize>>,
}

impl ResearchUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn task_result(mut self, result: TaskResult) -> Self {
        self.task_results.push(result);
        self
    }

    pub fn plan(mut self, plan: Vec<String>) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn current_task_index(mut self, index: usize) -> Self {
        self.current_task_index = Some(index);
        self
    }

    pub fn executor_ready(mut self, ready: bool) -> Self {
        self.executor_ready = Some(ready);
        self
    }

    pub fn active_task_index(mut self, index: Option<usize>) -> Self {
        self.active_task_index = Some(index);
        self
    }
}

/// Merge rules for [`ResearchState`]: append messages and task results, overwrite
/// scalars, and refuse updates that would re-plan or move the index backwards.
#[derive(Debug, Clone, Default)]
pub struct ResearchReducer;

impl StateUpdater<ResearchState> for ResearchReducer {
    fn apply_update(&self, current: &mut ResearchState, update: ResearchUpdate) {
        reducers::append(&mut current.messages, update.messages);
        reducers::append(&mut current.task_results, update.task_results);

        if let Some(plan) = update.plan {
            if current.plan.is_empty() {
                current.plan = plan;
            } else {
                tracing::warn!(
                    existing_steps = current.plan.len(),
                    new_steps = plan.len(),
                    "ignoring plan update: plan is already set"
                );
            }
        }

        if let Some(index) = update.current_task_index {
            if index < current.current_task_index {
                tracing::warn!(
                    current = current.current_task_index,
                    requested = index,
                    "ignoring task index update: index never decreases"
                );
            } else {
                let clamped = index.min(current.plan.len());
                if clamped != index {
                    tracing::warn!(
                        requested = index,
                        plan_len = current.plan.len(),
                        "clamping task index to plan length"
                    );
                }
                current.current_task_index = clamped.max(current.current_task_index);
            }
        }

        reducers::overwrite(&mut current.executor_ready, update.executor_ready);
        reducers::overwrite(&mut current.active_task_index, update.active_task_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planned(steps: &[&str]) -> ResearchState {
        let mut state = ResearchState::new(vec![Message::user("q")]);
        ResearchReducer.apply_update(
            &mut state,
            ResearchUpdate::new()
                .plan(steps.iter().map(|s| s.to_string()).collect())
                .current_task_index(0),
        );
        state
    }

    /// **Scenario**: Messages append in order and scalars overwrite only when set.
    #[test]
    fn reducer_appends_and_overwrites() {
        let mut state = planned(&["a", "b"]);
        ResearchReducer.apply_update(
            &mut state,
            ResearchUpdate::new()
                .message(Message::user("step"))
                .executor_ready(true)
                .active_task_index(Some(0)),
        );
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "q");
        assert!(state.executor_ready);
        assert_eq!(state.active_task_index, Some(0));

        ResearchReducer.apply_update(&mut state, ResearchUpdate::new());
        assert!(state.executor_ready);

        ResearchReducer.apply_update(
            &mut state,
            ResearchUpdate::new()
                .executor_ready(false)
                .active_task_index(None),
        );
        assert!(!state.executor_ready);
        assert_eq!(state.active_task_index, None);
    }

    /// **Scenario**: A second plan update is ignored once a plan exists.
    #[test]
    fn reducer_refuses_replanning() {
        let mut state = planned(&["a", "b"]);
        ResearchReducer.apply_update(&mut state, ResearchUpdate::new().plan(vec!["x".into()]));
        assert_eq!(state.plan, vec!["a".to_string(), "b".to_string()]);
    }

    /// **Scenario**: The task index never decreases and is clamped to the plan length.
    #[test]
    fn reducer_index_is_monotonic_and_clamped() {
        let mut state = planned(&["a", "b"]);
        ResearchReducer.apply_update(&mut state, ResearchUpdate::new().current_task_index(1));
        assert_eq!(state.current_task_index, 1);
        ResearchReducer.apply_update(&mut state, ResearchUpdate::new().current_task_index(0));
        assert_eq!(state.current_task_index, 1);
        ResearchReducer.apply_update(&mut state, ResearchUpdate::new().current_task_index(9));
        assert_eq!(state.current_task_index, 2);
        assert!(state.plan_exhausted());
        assert_eq!(state.current_task(), None);
    }

    /// **Scenario**: question() is the first user message, current_task() follows the index.
    #[test]
    fn state_accessors() {
        let mut state = planned(&["find sources", "summarize"]);
        state.messages.insert(0, Message::system("sys"));
        state.messages.push(Message::user("later"));
        assert_eq!(state.question(), "q");
        assert_eq!(state.current_task(), Some("find sources"));
        assert_eq!(ResearchState::default().question(), "");
    }
}
