//! First decoding stage for service replies: fence stripping and JSON parsing
//!
//! This stage may fail; callers treat any error as a signal to fall back.

use crate::error::{Result, ScreenerError};
use serde_json::{Map, Value};

/// Strip one ```` ``` ```` / ```` ```json ```` opening fence and one closing fence.
pub fn strip_code_fences(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Parse a reply that should hold exactly one JSON object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>> {
    let body = strip_code_fences(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ScreenerError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ScreenerError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
