//! .env file parsing for the key status report

use crate::fs::FileSystem;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub key: String,
    pub configured: bool,
}

/// Parses `KEY=VALUE` lines, accepting `export` prefixes and quoted values
pub fn parse(content: &str) -> HashMap<String, String> {
    let line_re = Regex::new(r"^\s*(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$")
        .expect("valid regex");

    let mut vars = HashMap::new();
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(cap) = line_re.captures(line) {
            let key = cap[1].to_string();
            vars.insert(key, unquote(&cap[2]));
        }
    }
    vars
}

fn unquote(raw: &str) -> String {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return raw[1..raw.len() - 1].to_string();
        }
    }
    // unquoted values may carry a trailing comment
    match raw.find(" #") {
        Some(idx) => raw[..idx].trim_end().to_string(),
        None => raw.to_string(),
    }
}

/// Reports which of `keys` have a non-empty value in the file or the process
/// environment; an unreadable file counts as empty
pub fn key_status<F: FileSystem + ?Sized>(fs: &F, env_file: &Path, keys: &[String]) -> Vec<KeyStatus> {
    let vars = fs
        .read_to_string(env_file)
        .map(|content| parse(&content))
        .unwrap_or_default();

    keys.iter()
        .map(|key| {
            let in_file = vars.get(key).is_some_and(|v| !v.is_empty());
            let in_env = std::env::var(key).is_ok_and(|v| !v.is_empty());
            KeyStatus {
                key: key.clone(),
                configured: in_file || in_env,
            }
        })
        .collect()
}
