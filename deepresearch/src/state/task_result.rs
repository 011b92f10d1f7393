//! Per-task execution records and raw agent transcript entries.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::message::ToolCall;

/// One `{role, content}` entry of a reasoning agent's raw transcript.
///
/// `role` is kept as free text; the transcript adapter decides what each role means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
}

impl TranscriptEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Outcome of one plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Success,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Success => "success",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Termination reason recorded when every attempt of a task failed.
pub const TERMINATION_EXCEPTION: &str = "exception";

/// Record of one completed task slot (success or failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_index: usize,
    pub task: String,
    pub status: TaskStatus,
    /// Agent-reported termination reason, or `"exception"` when all attempts failed.
    pub termination: String,
    /// Number of agent invocations made for this task.
    pub attempts: u32,
    /// Wall time across all attempts, serialized as fractional seconds.
    #[serde(rename = "elapsed_seconds", with = "duration_secs")]
    pub elapsed: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Tool calls made during the successful attempt, flattened across messages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// One entry per failed attempt, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    /// Untouched transcript of the successful attempt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub raw_messages: Vec<TranscriptEntry>,
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if secs.is_finite() && secs >= 0.0 {
            Ok(Duration::from_secs_f64(secs))
        } else {
            Err(serde::de::Error::custom(format!(
                "elapsed_seconds must be a non-negative number, got {}",
                secs
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> TaskResult {
        TaskResult {
            task_index: 1,
            task: "summarize".into(),
            status: TaskStatus::Failed,
            termination: TERMINATION_EXCEPTION.into(),
            attempts: 2,
            elapsed: Duration::from_millis(1500),
            answer: None,
            tool_calls: Vec::new(),
            errors: vec!["boom".into(), "boom again".into()],
            raw_messages: Vec::new(),
        }
    }

    /// **Scenario**: A failed result serializes status lowercase and elapsed as seconds.
    #[test]
    fn failed_task_result_serializes() {
        let v = serde_json::to_value(failed()).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["termination"], "exception");
        assert_eq!(v["elapsed_seconds"], 1.5);
        assert!(v.get("answer").is_none());
        assert_eq!(v["errors"].as_array().map(|a| a.len()), Some(2));
        let back: TaskResult = serde_json::from_value(v).unwrap();
        assert_eq!(back, failed());
    }

    /// **Scenario**: Negative elapsed values are rejected on deserialize.
    #[test]
    fn negative_elapsed_is_rejected() {
        let mut v = serde_json::to_value(failed()).unwrap();
        v["elapsed_seconds"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<TaskResult>(v).is_err());
    }
}
