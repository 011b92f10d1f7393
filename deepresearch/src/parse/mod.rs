//! Tolerant parsers for collaborator output: lenient JSON, the agent's tag grammar,
//! transcript conversion, and plan extraction. None of these fail; malformed input
//! degrades to a fallback value.

pub mod lenient_json;
pub mod plan;
pub mod tool_call;
pub mod transcript;

pub use lenient_json::parse_lenient;
pub use plan::extract_plan;
pub use tool_call::{
    extract_tag, parse_assistant_text, parse_tool_call_block, strip_tags, ParsedAssistant,
};
pub use transcript::{collect_tool_calls, convert_transcript};
