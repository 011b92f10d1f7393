//! Lenient JSON parsing for model output.
//!
//! Models wrap JSON in prose or markdown fences and emit JSON5-isms (trailing
//! commas, single quotes, bare keys, comments). [`parse_lenient`] tries, in order:
//! strict JSON, the body of a code fence, the outermost `{…}` slice, then each of
//! those again after [`normalize_json5`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n?(.*?)```").expect("code fence regex")
});

/// Parses `text` as JSON, falling back to progressively looser interpretations.
///
/// Returns `None` when no interpretation yields valid JSON.
pub fn parse_lenient(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut candidates: Vec<&str> = vec![trimmed];
    if let Some(body) = CODE_FENCE
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
    {
        if !body.is_empty() {
            candidates.push(body);
        }
    }
    if let Some(slice) = outer_object(trimmed) {
        candidates.push(slice);
    }

    for candidate in &candidates {
        if let Ok(v) = serde_json::from_str::<Value>(candidate) {
            return Some(v);
        }
    }
    for candidate in &candidates {
        if let Ok(v) = serde_json::from_str::<Value>(&normalize_json5(candidate)) {
            return Some(v);
        }
    }
    None
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Rewrites common JSON5 constructs into strict JSON.
///
/// Handles `//` and `/* */` comments, single-quoted strings, unquoted object keys,
/// and trailing commas before `}` / `]`. Text inside double-quoted strings is
/// copied untouched.
pub fn normalize_json5(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    out.push(ch);
                    i += 1;
                    if ch == '\\' {
                        if let Some(&next) = chars.get(i) {
                            out.push(next);
                            i += 1;
                        }
                    } else if ch == '"' {
                        break;
                    }
                }
            }
            '\'' => {
                out.push('"');
                i += 1;
                while i < chars.len() {
                    let ch = chars[i];
                    i += 1;
                    match ch {
                        '\\' => match chars.get(i) {
                            Some('\'') => {
                                out.push('\'');
                                i += 1;
                            }
                            Some(&next) => {
                                out.push('\\');
                                out.push(next);
                                i += 1;
                            }
                            None => out.push('\\'),
                        },
                        '"' => out.push_str("\\\""),
                        '\'' => break,
                        other => out.push(other),
                    }
                }
                out.push('"');
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i = (i + 2).min(chars.len());
            }
            '}' | ']' => {
                let keep = out.trim_end().len();
                out.truncate(keep);
                if out.ends_with(',') {
                    out.pop();
                }
                out.push(c);
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let mut j = i;
                while j < chars.len() && chars[j].is_whitespace() {
                    j += 1;
                }
                if chars.get(j) == Some(&':') {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(&word);
                }
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: Strict JSON parses as-is.
    #[test]
    fn strict_json() {
        assert_eq!(parse_lenient(r#"{"a": [1, 2]}"#), Some(json!({"a": [1, 2]})));
        assert_eq!(parse_lenient("[1]"), Some(json!([1])));
    }

    /// **Scenario**: JSON inside a markdown fence is found.
    #[test]
    fn fenced_json() {
        let text = "Here is the plan:\n```json\n{\"steps\": [\"a\"]}\n```\nDone.";
        assert_eq!(parse_lenient(text), Some(json!({"steps": ["a"]})));
    }

    /// **Scenario**: An object embedded in prose is sliced out.
    #[test]
    fn object_in_prose() {
        let text = "Sure! {\"name\": \"search\", \"arguments\": {\"q\": \"rust\"}} hope that helps";
        assert_eq!(
            parse_lenient(text),
            Some(json!({"name": "search", "arguments": {"q": "rust"}}))
        );
    }

    /// **Scenario**: JSON5 constructs (bare keys, single quotes, trailing commas, comments) are accepted.
    #[test]
    fn json5_constructs() {
        let text = "{\n  // the tool\n  name: 'search',\n  arguments: {query: 'it\\'s \"quoted\"', n: 3,},\n}";
        assert_eq!(
            parse_lenient(text),
            Some(json!({"name": "search", "arguments": {"query": "it's \"quoted\"", "n": 3}}))
        );
    }

    /// **Scenario**: Literals and URLs inside strings survive normalization.
    #[test]
    fn normalization_keeps_literals_and_strings() {
        let text = "{ok: true, none: null, url: \"http://x.y/a, b]\"}";
        assert_eq!(
            parse_lenient(text),
            Some(json!({"ok": true, "none": null, "url": "http://x.y/a, b]"}))
        );
    }

    /// **Scenario**: Garbage and blank input yield None.
    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_lenient("not json at all"), None);
        assert_eq!(parse_lenient("   "), None);
        assert_eq!(parse_lenient("{broken"), None);
    }
}
