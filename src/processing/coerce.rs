//! Total conversions from untrusted JSON values to typed profile fields
//!
//! Every function here accepts whatever the reasoning service sent (including
//! nothing) and returns a usable value; none of them fail.

use serde_json::Value;

/// String field: any non-null value is stringified; null, missing or blank
/// values yield `default`.
pub fn coerce_string(value: Option<&Value>, default: &str) -> String {
    let text = match value {
        None | Some(Value::Null) => return default.to_string(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };

    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

/// Years field: numbers pass through, strings keep only digits and `.`
/// ("~5 years" -> 5.0). Anything unparseable, negative or non-finite is 0.0.
pub fn coerce_years(value: Option<&Value>) -> f64 {
    let years = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => {
            let numeric: String = s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
            numeric.parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };

    if years.is_finite() && years > 0.0 {
        years
    } else {
        0.0
    }
}

/// List field: arrays keep their non-null items, objects flatten to their
/// values, strings split on commas, other scalars wrap, null/missing is empty.
pub fn coerce_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(item_to_string).collect(),
        Some(Value::Object(map)) => map.values().filter_map(item_to_string).collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
        Some(other) => vec![other.to_string()],
    }
}

fn item_to_string(item: &Value) -> Option<String> {
    match item {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
