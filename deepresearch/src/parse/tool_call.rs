//! Parser for the reasoning agent's tagged assistant text.
//!
//! Grammar (all parts optional, in any order):
//!
//! ```text
//! <think>…</think>  <answer>…</answer>  <tool_call>…</tool_call>*
//! ```
//!
//! Nothing here fails: malformed tool-call blocks degrade to
//! `{name: "unknown", arguments: {raw}}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::message::ToolCall;

use super::lenient_json::parse_lenient;

static TOOL_CALL_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<tool_call>(.*?)</tool_call>").expect("tool_call regex"));

static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").expect("tag regex"));

/// Tool name used for `<code>` blocks.
pub const PYTHON_TOOL: &str = "python";

/// Tool name used when a block cannot be interpreted.
pub const UNKNOWN_TOOL: &str = "unknown";

/// Parsed pieces of one assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedAssistant {
    /// Trimmed `<think>` body, empty when absent.
    pub thought: String,
    /// Trimmed `<answer>` body, empty when absent.
    pub answer: String,
    /// Text to show: the answer if non-empty, else the whole text with tags removed.
    pub visible: String,
    pub tool_calls: Vec<ToolCall>,
    /// Untouched bodies of the `<tool_call>` blocks.
    pub raw_tool_calls: Vec<String>,
}

/// Trimmed body of the first `<tag>…</tag>` pair, or `None`.
pub fn extract_tag(text: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let start = text.find(&open)? + open.len();
    let len = text[start..].find(&close)?;
    Some(text[start..start + len].trim().to_string())
}

/// Removes every `<…>` tag (the tags only, not what they enclose) and trims.
pub fn strip_tags(text: &str) -> String {
    ANY_TAG.replace_all(text, "").trim().to_string()
}

/// Interprets one `<tool_call>` body.
///
/// - contains `<code>` and `</code>`: `python` with `{code}`
/// - a JSON object (lenient) with a string `name`: that name, its `arguments` or `{}`
/// - anything else: `unknown` with `{raw: block}`, the block kept byte-for-byte
pub fn parse_tool_call_block(block: &str) -> ToolCall {
    let trimmed = block.trim();
    if trimmed.contains("<code>") && trimmed.contains("</code>") {
        let code = extract_tag(trimmed, "code").unwrap_or_default();
        return new_call(PYTHON_TOOL, json!({ "code": code }));
    }

    if let Some(Value::Object(mut obj)) = parse_lenient(trimmed) {
        if let Some(Value::String(name)) = obj.remove("name") {
            let arguments = obj
                .remove("arguments")
                .unwrap_or_else(|| Value::Object(Map::new()));
            return new_call(&name, arguments);
        }
    }

    tracing::debug!(block_len = block.len(), "unparseable tool call block");
    new_call(UNKNOWN_TOOL, json!({ "raw": block }))
}

fn new_call(name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        arguments,
    }
}

/// Splits an assistant turn into thought, answer, visible text and tool calls.
pub fn parse_assistant_text(text: &str) -> ParsedAssistant {
    let thought = extract_tag(text, "think").unwrap_or_default();
    let answer = extract_tag(text, "answer").unwrap_or_default();
    let raw_tool_calls: Vec<String> = TOOL_CALL_BLOCK
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect();
    let tool_calls = raw_tool_calls
        .iter()
        .map(|raw| parse_tool_call_block(raw))
        .collect();
    let visible = if answer.is_empty() {
        strip_tags(text)
    } else {
        answer.clone()
    };
    ParsedAssistant {
        thought,
        answer,
        visible,
        tool_calls,
        raw_tool_calls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A `<code>` block becomes a python call with the code body.
    #[test]
    fn code_block_is_python_call() {
        let call = parse_tool_call_block("<code>print(1)</code>");
        assert_eq!(call.name, "python");
        assert_eq!(call.arguments, json!({"code": "print(1)"}));
    }

    /// **Scenario**: A JSON object with name/arguments is taken as-is; missing arguments become {}.
    #[test]
    fn json_block_is_named_call() {
        let call =
            parse_tool_call_block(r#" {"name": "search", "arguments": {"query": ["rust"]}} "#);
        assert_eq!(call.name, "search");
        assert_eq!(call.arguments, json!({"query": ["rust"]}));

        let call = parse_tool_call_block("{name: 'visit'}");
        assert_eq!(call.name, "visit");
        assert_eq!(call.arguments, json!({}));
    }

    /// **Scenario**: Unparseable blocks become unknown with the raw text preserved exactly.
    #[test]
    fn garbage_block_is_unknown_with_raw() {
        let raw = "\n  search for {rust\n";
        let call = parse_tool_call_block(raw);
        assert_eq!(call.name, "unknown");
        assert_eq!(call.arguments, json!({"raw": raw}));

        let call = parse_tool_call_block(r#"{"arguments": {}}"#);
        assert_eq!(call.name, "unknown");
        let call = parse_tool_call_block("[1, 2]");
        assert_eq!(call.name, "unknown");
    }

    /// **Scenario**: Each parsed call gets a distinct id.
    #[test]
    fn ids_are_unique() {
        let a = parse_tool_call_block("x");
        let b = parse_tool_call_block("x");
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    /// **Scenario**: Full turn with think, two tool calls and no answer.
    #[test]
    fn assistant_text_without_answer() {
        let text = "<think> need data </think>\nLooking it up.\n<tool_call>{\"name\": \"search\", \"arguments\": {\"query\": \"a\"}}</tool_call>\n<tool_call><code>print(2)</code></tool_call>";
        let parsed = parse_assistant_text(text);
        assert_eq!(parsed.thought, "need data");
        assert_eq!(parsed.answer, "");
        assert_eq!(parsed.tool_calls.len(), 2);
        assert_eq!(parsed.tool_calls[0].name, "search");
        assert_eq!(parsed.tool_calls[1].name, "python");
        assert_eq!(parsed.raw_tool_calls[1], "<code>print(2)</code>");
        assert!(parsed.visible.starts_with("need data"));
        assert!(parsed.visible.contains("Looking it up."));
        assert!(!parsed.visible.contains('<'));
    }

    /// **Scenario**: The answer segment wins as visible content.
    #[test]
    fn assistant_text_with_answer() {
        let parsed = parse_assistant_text("<think>t</think><answer>\n 42 \n</answer>");
        assert_eq!(parsed.answer, "42");
        assert_eq!(parsed.visible, "42");
        assert!(parsed.tool_calls.is_empty());
    }

    /// **Scenario**: Only the first pair of a repeated tag is used; unclosed tags are absent.
    #[test]
    fn extract_tag_first_match_only() {
        assert_eq!(
            extract_tag("<answer>a</answer><answer>b</answer>", "answer").as_deref(),
            Some("a")
        );
        assert_eq!(extract_tag("<answer>open", "answer"), None);
        assert_eq!(strip_tags("  <b>bold</b> text "), "bold text");
    }
}
