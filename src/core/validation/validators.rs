//! Reusable field validators
//!
//! A validator receives the field name and its (already filtered) value and
//! returns a message when the value is rejected. Schemas only call validators
//! for fields that are present.

use crate::core::field::FieldFormat;
use serde_json::Value;
use std::sync::Arc;

/// Shared validator closure
pub type FieldValidator = Arc<dyn Fn(&str, &Value) -> Result<(), String> + Send + Sync>;

/// Validator: value is a string
pub fn is_string() -> FieldValidator {
    Arc::new(|field: &str, value: &Value| {
        if value.is_string() {
            Ok(())
        } else {
            Err(format!("'{}' must be a string", field))
        }
    })
}

/// Validator: value is a finite number
pub fn is_number() -> FieldValidator {
    Arc::new(|field: &str, value: &Value| match value.as_f64() {
        Some(n) if n.is_finite() => Ok(()),
        _ => Err(format!("'{}' must be a number", field)),
    })
}

/// Validator: value is an integer
pub fn is_integer() -> FieldValidator {
    Arc::new(|field: &str, value: &Value| {
        if value.is_i64() || value.is_u64() {
            Ok(())
        } else {
            Err(format!("'{}' must be an integer", field))
        }
    })
}

/// Validator: value is a string matching `format`
pub fn matches_format(format: FieldFormat) -> FieldValidator {
    Arc::new(move |field: &str, value: &Value| match value.as_str() {
        Some(s) if format.validate_str(s) => Ok(()),
        _ => Err(format!("'{}' must be {}", field, describe(&format))),
    })
}

/// Validator: value is a UUID string
pub fn is_uuid() -> FieldValidator {
    matches_format(FieldFormat::Uuid)
}

/// Validator: value is an ISO 8601 date string
pub fn is_date_string() -> FieldValidator {
    matches_format(FieldFormat::IsoDate)
}

/// Validator: string length must be within range (in characters)
pub fn string_length(min: usize, max: usize) -> FieldValidator {
    Arc::new(move |field: &str, value: &Value| match value.as_str() {
        Some(s) => check_length(field, s, min, max),
        None => Err(format!("'{}' must be a string", field)),
    })
}

/// Validator: value is an array whose every element is a string of valid length
pub fn each_length(min: usize, max: usize) -> FieldValidator {
    Arc::new(move |field: &str, value: &Value| {
        let Some(items) = value.as_array() else {
            return Err(format!("'{}' must be an array", field));
        };
        for (index, item) in items.iter().enumerate() {
            let item_field = format!("{}[{}]", field, index);
            match item.as_str() {
                Some(s) => check_length(&item_field, s, min, max)?,
                None => return Err(format!("'{}' must be a string", item_field)),
            }
        }
        Ok(())
    })
}

/// Validator: number must be within an inclusive range
pub fn number_range(min: f64, max: f64) -> FieldValidator {
    Arc::new(move |field: &str, value: &Value| match value.as_f64() {
        Some(n) if n < min => Err(format!(
            "'{}' must not be less than {} (value: {})",
            field, min, n
        )),
        Some(n) if n > max => Err(format!(
            "'{}' must not exceed {} (value: {})",
            field, max, n
        )),
        Some(_) => Ok(()),
        None => Err(format!("'{}' must be a number", field)),
    })
}

/// Validator: value must be in allowed list
pub fn in_list(allowed: Vec<String>) -> FieldValidator {
    Arc::new(move |field: &str, value: &Value| match value.as_str() {
        Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
        _ => Err(format!(
            "'{}' must be one of {:?} (value: {})",
            field, allowed, value
        )),
    })
}

fn check_length(field: &str, s: &str, min: usize, max: usize) -> Result<(), String> {
    let len = s.chars().count();
    if len < min {
        Err(format!(
            "'{}' must be at least {} characters (currently: {})",
            field, min, len
        ))
    } else if len > max {
        Err(format!(
            "'{}' must not exceed {} characters (currently: {})",
            field, max, len
        ))
    } else {
        Ok(())
    }
}

fn describe(format: &FieldFormat) -> &'static str {
    match format {
        FieldFormat::Uuid => "a uuid",
        FieldFormat::IsoDate => "an ISO 8601 date string",
        FieldFormat::Numeric => "a numeric string",
        FieldFormat::Phone => "a phone number",
    }
}
