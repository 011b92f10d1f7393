//! Conversion of a raw reasoning-agent transcript into conversation messages.

use std::str::FromStr;

use crate::message::{Message, MessageMetadata, MessageSource, Role, ToolCall};
use crate::state::TranscriptEntry;

use super::tool_call::{extract_tag, parse_assistant_text};

/// Converts `{role, content}` entries into messages.
///
/// - `system` entries are dropped.
/// - The first `user` entry (the agent's own copy of the question) is dropped;
///   later ones carry tool output and become user messages holding the
///   `<tool_response>` body (or the trimmed text when that tag is missing),
///   tagged `source = tool_response`.
/// - `assistant` entries are parsed with [`parse_assistant_text`] into one
///   assistant message each, with tool calls, thought and raw tool-call text.
/// - Entries with unrecognised roles are skipped.
pub fn convert_transcript(entries: &[TranscriptEntry]) -> Vec<Message> {
    let mut converted = Vec::with_capacity(entries.len());
    let mut user_seen = false;

    for entry in entries {
        let role = match Role::from_str(&entry.role) {
            Ok(role) => role,
            Err(_) => {
                tracing::debug!(role = %entry.role, "skipping transcript entry with unknown role");
                continue;
            }
        };
        match role {
            Role::System => {}
            Role::User if !user_seen => user_seen = true,
            Role::User => {
                let content = extract_tag(&entry.content, "tool_response")
                    .unwrap_or_else(|| entry.content.trim().to_string());
                converted.push(
                    Message::user(content)
                        .with_metadata(MessageMetadata::from_source(MessageSource::ToolResponse)),
                );
            }
            Role::Assistant => {
                let parsed = parse_assistant_text(&entry.content);
                let metadata = MessageMetadata {
                    thought: (!parsed.thought.is_empty()).then_some(parsed.thought),
                    source: Some(MessageSource::Executor),
                    raw_tool_calls: parsed.raw_tool_calls,
                    ..MessageMetadata::default()
                };
                converted.push(
                    Message::assistant(parsed.visible)
                        .with_tool_calls(parsed.tool_calls)
                        .with_metadata(metadata),
                );
            }
        }
    }
    converted
}

/// Flattens the tool calls of all assistant messages, in order.
pub fn collect_tool_calls(messages: &[Message]) -> Vec<ToolCall> {
    messages
        .iter()
        .filter(|m| m.is_assistant())
        .flat_map(|m| m.tool_calls.iter().cloned())
        .collect()
}
