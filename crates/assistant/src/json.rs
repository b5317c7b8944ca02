//! Lenient JSON extraction for oracle replies.
//!
//! Oracles are asked for bare JSON but often wrap it in prose or a fenced
//! block. Parsing tries, in order: the whole reply, a fenced ```json block,
//! then the outermost `{...}` span.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid regex"))
}

/// Extract a JSON object from a free-text reply.
pub fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    let raw = raw.trim();
    if let Ok(Value::Object(map)) = serde_json::from_str(raw) {
        return Some(map);
    }
    if let Some(block) = fence_re().captures(raw).and_then(|c| c.get(1)) {
        if let Ok(Value::Object(map)) = serde_json::from_str(block.as_str()) {
            return Some(map);
        }
    }
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&raw[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Typed variant of [`parse_object`].
pub fn parse<T: DeserializeOwned>(raw: &str) -> Option<T> {
    parse_object(raw).and_then(|map| serde_json::from_value(Value::Object(map)).ok())
}

/// Non-empty string field.
pub fn str_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Boolean field, also accepting "true"/"yes" strings.
pub fn bool_field(map: &Map<String, Value>, key: &str) -> Option<bool> {
    match map.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// String list field. A bare string becomes a one-element list.
pub fn list_field(map: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    match map.get(key)? {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        ),
        Value::String(s) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
        _ => None,
    }
}
