//! `.env` reader. Parsing only; the caller decides what gets applied.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// `.env` in `dir`, or in the current directory when `dir` is `None`.
pub fn dotenv_path(dir: Option<&Path>) -> Option<PathBuf> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    let path = dir.join(".env");
    path.is_file().then_some(path)
}

/// Unquotes a double-quoted body: `\"`, `\\`, `\n` and `\t` are unescaped.
fn unescape_double(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_value(raw: &str) -> String {
    let raw = raw.trim();
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        return unescape_double(&raw[1..raw.len() - 1]);
    }
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return raw[1..raw.len() - 1].to_string();
    }
    // Unquoted: ` #` starts a trailing comment.
    match raw.find(" #") {
        Some(i) => raw[..i].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines and `#` comment lines are skipped, as are lines without `=` or with an
/// empty key. An optional `export ` prefix is accepted. Later lines win.
pub fn parse(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), parse_value(value)))
        })
        .collect()
}

/// Reads and parses `.env` from `dir` (or the current directory). A missing file is empty.
pub fn load_env_map(dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_path(dir) {
        Some(path) => Ok(parse(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_pairs_and_comments() {
        let m = parse("\n# header\nOPENROUTER_API_KEY=sk-1\n  \nDEEPRESEARCH_RETRIES=3\n");
        assert_eq!(m.len(), 2);
        assert_eq!(m["OPENROUTER_API_KEY"], "sk-1");
        assert_eq!(m["DEEPRESEARCH_RETRIES"], "3");
    }

    #[test]
    fn quoting_rules() {
        let m = parse(concat!(
            "A=\"two words\"\n",
            "B='single # kept'\n",
            "C=\"say \\\"hi\\\"\"\n",
            "D=\"\"\n",
            "E=\n",
            "F=value # trailing comment\n",
            "G=a#b\n",
        ));
        assert_eq!(m["A"], "two words");
        assert_eq!(m["B"], "single # kept");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
        assert_eq!(m["E"], "");
        assert_eq!(m["F"], "value");
        assert_eq!(m["G"], "a#b");
    }

    #[test]
    fn export_prefix_and_invalid_lines() {
        let m = parse("export DEEPRESEARCH_MODEL=m\nno_equals\n=orphan\nK = v \n");
        assert_eq!(m.len(), 2);
        assert_eq!(m["DEEPRESEARCH_MODEL"], "m");
        assert_eq!(m["K"], "v");
    }

    #[test]
    fn later_lines_win() {
        let m = parse("K=1\nK=2\n");
        assert_eq!(m["K"], "2");
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
        std::fs::write(dir.path().join(".env"), "A=1\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m["A"], "1");
    }
}
