//! Call contracts of the external collaborators: planner, reasoning agent, synthesizer.
//!
//! The research nodes only see these traits. Concrete implementations live with the
//! caller (the reasoning agent owns its tools) or in [`super::llm_collaborators`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::message::{Message, Role};
use crate::state::{TaskResult, TranscriptEntry};

/// Output of a planner or synthesizer: free text or an already-built message.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Message(Message),
}

impl Reply {
    /// Text content of the reply.
    pub fn content(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Message(message) => &message.content,
        }
    }

    /// The reply as an assistant message. A message reply keeps its tool calls and
    /// metadata; its role is forced to assistant.
    pub fn into_message(self) -> Message {
        match self {
            Reply::Text(text) => Message::assistant(text),
            Reply::Message(mut message) => {
                message.role = Role::Assistant;
                message
            }
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Message> for Reply {
    fn from(message: Message) -> Self {
        Reply::Message(message)
    }
}

/// Produces a plan from the conversation so far. Output is free text, ideally
/// `{"steps": [{"task": ..., "deliverable": ...}]}`.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, messages: &[Message]) -> Result<Reply, AgentError>;
}

/// Per-call limits handed to the reasoning agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLimits {
    pub max_rounds: u32,
    pub max_runtime_seconds: Option<u64>,
}

/// Input of one reasoning-agent attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub question: String,
    #[serde(rename = "priorAnswer", default)]
    pub prior_answer: String,
    #[serde(flatten)]
    pub limits: RunLimits,
}

impl AgentRequest {
    pub fn new(question: impl Into<String>, limits: RunLimits) -> Self {
        Self {
            question: question.into(),
            prior_answer: String::new(),
            limits,
        }
    }
}

fn unknown_termination() -> String {
    "unknown".to_string()
}

/// Output of one reasoning-agent attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRun {
    #[serde(default)]
    pub prediction: String,
    #[serde(default = "unknown_termination")]
    pub termination: String,
    /// Raw `{role, content}` transcript, tag grammar included.
    #[serde(default)]
    pub messages: Vec<TranscriptEntry>,
}

/// Multi-turn reasoning agent that works one plan step per call.
#[async_trait]
pub trait ReasoningAgent: Send + Sync {
    async fn run(&self, request: AgentRequest) -> Result<AgentRun, AgentError>;
}

/// Synchronous reasoning agent, for implementations that block (e.g. a blocking HTTP client).
///
/// Wrap in [`BlockingAgent`] to use it as a [`ReasoningAgent`].
pub trait BlockingReasoningAgent: Send + Sync + 'static {
    fn run_blocking(&self, request: AgentRequest) -> Result<AgentRun, AgentError>;
}

/// Runs a [`BlockingReasoningAgent`] on the blocking thread pool.
pub struct BlockingAgent<A> {
    inner: Arc<A>,
}

impl<A> BlockingAgent<A>
where
    A: BlockingReasoningAgent,
{
    pub fn new(agent: A) -> Self {
        Self {
            inner: Arc::new(agent),
        }
    }
}

#[async_trait]
impl<A> ReasoningAgent for BlockingAgent<A>
where
    A: BlockingReasoningAgent,
{
    async fn run(&self, request: AgentRequest) -> Result<AgentRun, AgentError> {
        let agent = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || agent.run_blocking(request))
            .await
            .map_err(|e| AgentError::ExecutionFailed(format!("agent task failed: {}", e)))?
    }
}

/// Everything the synthesizer sees.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisInput {
    /// Content of the first user message.
    pub question: String,
    pub plan: Vec<String>,
    pub task_results: Vec<TaskResult>,
    pub messages: Vec<Message>,
}

/// Writes the final answer from the accumulated research.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, input: &SynthesisInput) -> Result<Reply, AgentError>;
}
