//! Query conditions understood by every repository

use crate::core::field::FieldValue;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A single predicate on a named field of a stored row
///
/// A row matches a list of conditions when it matches all of them. Comparison
/// operators never match a null or incomparable stored value.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(String, FieldValue),
    Lt(String, FieldValue),
    Lte(String, FieldValue),
    Gt(String, FieldValue),
    IsNull(String),
}

impl Condition {
    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Condition::Eq(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Condition::Lt(field.into(), value.into())
    }

    pub fn lte(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Condition::Lte(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Condition::Gt(field.into(), value.into())
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Condition::IsNull(field.into())
    }

    /// Name of the field this condition reads
    pub fn field(&self) -> &str {
        match self {
            Condition::Eq(f, _)
            | Condition::Lt(f, _)
            | Condition::Lte(f, _)
            | Condition::Gt(f, _)
            | Condition::IsNull(f) => f,
        }
    }

    /// Evaluate against a stored row; missing fields read as null
    pub fn matches(&self, row: &Map<String, Value>) -> bool {
        let stored = row.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Condition::Eq(_, value) => value.matches_json(stored),
            Condition::Lt(_, value) => value.compare_json(stored) == Some(Ordering::Less),
            Condition::Lte(_, value) => matches!(
                value.compare_json(stored),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Condition::Gt(_, value) => value.compare_json(stored) == Some(Ordering::Greater),
            Condition::IsNull(_) => stored.is_null(),
        }
    }
}

/// Check a row against every condition
pub fn matches_all(row: &Map<String, Value>, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| c.matches(row))
}

/// Total order on JSON scalars used to sort joined collections
///
/// Nulls sort first, then booleans, numbers and strings. RFC 3339 timestamps
/// in UTC sort chronologically as strings.
pub fn compare_json_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::parse_datetime;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_comparisons_on_dates() {
        let cutoff = parse_datetime("2024-01-01T00:00:00Z").unwrap();
        let on_cutoff = row(json!({ "releaseDate": "2024-01-01T00:00:00Z" }));
        let before = row(json!({ "releaseDate": "2023-12-31T00:00:00Z" }));

        assert!(Condition::lte("releaseDate", cutoff).matches(&on_cutoff));
        assert!(!Condition::lt("releaseDate", cutoff).matches(&on_cutoff));
        assert!(Condition::lt("releaseDate", cutoff).matches(&before));
        assert!(!Condition::gt("releaseDate", cutoff).matches(&on_cutoff));
    }

    #[test]
    fn test_is_null_treats_missing_as_null() {
        assert!(Condition::is_null("discountId").matches(&row(json!({}))));
        assert!(Condition::is_null("discountId").matches(&row(json!({ "discountId": null }))));
        assert!(!Condition::is_null("discountId").matches(&row(json!({ "discountId": "x" }))));
    }

    #[test]
    fn test_comparison_never_matches_null() {
        let r = row(json!({ "price": null }));
        assert!(!Condition::lt("price", FieldValue::Integer(10)).matches(&r));
        assert!(!Condition::gt("price", FieldValue::Integer(10)).matches(&r));
    }

    #[test]
    fn test_matches_all_requires_every_condition() {
        let r = row(json!({ "title": "Doom", "price": 20 }));
        assert!(matches_all(&r, &[]));
        assert!(matches_all(
            &r,
            &[
                Condition::eq("title", "Doom"),
                Condition::eq("price", FieldValue::Integer(20))
            ]
        ));
        assert!(!matches_all(
            &r,
            &[Condition::eq("title", "Doom"), Condition::eq("price", FieldValue::Integer(5))]
        ));
    }

    #[test]
    fn test_compare_json_values_sorts_nulls_first() {
        let mut values = vec![json!("b"), json!(null), json!("a")];
        values.sort_by(compare_json_values);
        assert_eq!(values, vec![json!(null), json!("a"), json!("b")]);
    }
}
