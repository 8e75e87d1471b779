//! Reusable field filters
//!
//! Filters run before validators and turn raw payload values into the shape
//! the entity expects. A filter leaves values it does not understand alone
//! so the validators that follow can report them.

use crate::core::field::{parse_datetime, parse_uuid};
use serde_json::{Value, json};
use std::sync::Arc;

/// Shared filter closure
pub type FieldFilter = Arc<dyn Fn(&str, Value) -> Result<Value, String> + Send + Sync>;

/// Filter: trim whitespace from string
pub fn trim() -> FieldFilter {
    Arc::new(|_: &str, value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.trim().to_string()))
        } else {
            Ok(value)
        }
    })
}

/// Filter: round number to specified decimal places
pub fn round_decimals(decimals: u32) -> FieldFilter {
    Arc::new(move |_: &str, value: Value| {
        if let Some(num) = value.as_f64() {
            let factor = 10_f64.powi(decimals as i32);
            let rounded = (num * factor).round() / factor;
            Ok(json!(rounded))
        } else {
            Ok(value)
        }
    })
}

/// Filter: normalise an accepted date string to RFC 3339 in UTC
pub fn iso_datetime() -> FieldFilter {
    Arc::new(|_: &str, value: Value| {
        if let Some(parsed) = value.as_str().and_then(parse_datetime) {
            Ok(Value::String(parsed.to_rfc3339()))
        } else {
            Ok(value)
        }
    })
}

/// Filter: lowercase a UUID string so lookups compare canonical forms
pub fn canonical_uuid() -> FieldFilter {
    Arc::new(|_: &str, value: Value| match value.as_str().and_then(parse_uuid) {
        Some(id) => Ok(Value::String(id.to_string())),
        _ => Ok(value),
    })
}
