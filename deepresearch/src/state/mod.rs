//! Research run state: shared state, partial updates, reducer, and task records.

mod research_state;
mod task_result;

pub use research_state::{ResearchReducer, ResearchState, ResearchUpdate};
pub use task_result::{TaskResult, TaskStatus, TranscriptEntry, TERMINATION_EXCEPTION};
