//! Plan extraction from planner output.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::lenient_json::parse_lenient;

static NUMBERED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s*(.+)$").expect("numbered line regex"));

const STEP_TEXT_KEYS: [&str; 3] = ["task", "objective", "description"];

/// Extracts ordered task descriptions from free planner text.
///
/// 1. A (leniently parsed) object with a `steps` array: string items, or objects
///    carrying `task` / `objective` / `description` (first non-empty wins).
/// 2. Lines starting with an ordinal marker such as `1.` or `2)`.
/// 3. The whole trimmed text as a single step.
/// 4. Empty plan.
///
/// Items are trimmed and empty items dropped at every stage.
pub fn extract_plan(text: &str) -> Vec<String> {
    if let Some(steps) = structured_steps(text) {
        return steps;
    }

    let numbered: Vec<String> = text
        .lines()
        .filter_map(|line| NUMBERED_LINE.captures(line))
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

fn structured_steps(text: &str) -> Option<Vec<String>> {
    let payload = parse_lenient(text)?;
    let steps = payload.get("steps")?.as_array()?;
    let cleaned: Vec<String> = steps.iter().filter_map(step_text).collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

fn step_text(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => non_empty(s),
        Value::Object(obj) => STEP_TEXT_KEYS
            .iter()
            .filter_map(|key| obj.get(*key))
            .find_map(|v| match v {
                Value::String(s) => non_empty(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
        _ => None,
    }
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
