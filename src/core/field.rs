//! Field value types and format predicates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::OnceLock;
use uuid::Uuid;

/// A polymorphic field value used in search filters and query conditions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Build a field value from an untyped JSON value
    ///
    /// Arrays and objects have no scalar counterpart and become `Null`.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Bool(b) => FieldValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null),
            },
            _ => FieldValue::Null,
        }
    }

    /// Convert back to the JSON representation used by stored rows
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            FieldValue::DateTime(d) => Value::String(d.to_rfc3339()),
            FieldValue::Null => Value::Null,
        }
    }

    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a float if it is numeric
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Order a stored JSON value against this operand
    ///
    /// Returns `None` when the two sides cannot be compared (type mismatch,
    /// unparsable date, null on either side).
    pub fn compare_json(&self, stored: &Value) -> Option<Ordering> {
        match self {
            FieldValue::Null => None,
            FieldValue::Boolean(b) => stored.as_bool().map(|s| s.cmp(b)),
            FieldValue::Integer(_) | FieldValue::Float(_) => {
                let rhs = self.as_f64()?;
                let lhs = match stored {
                    Value::Number(n) => n.as_f64()?,
                    Value::String(s) => s.parse::<f64>().ok()?,
                    _ => return None,
                };
                lhs.partial_cmp(&rhs)
            }
            FieldValue::Uuid(u) => {
                let lhs = Uuid::parse_str(stored.as_str()?).ok()?;
                Some(lhs.cmp(u))
            }
            FieldValue::DateTime(d) => {
                let lhs = parse_datetime(stored.as_str()?)?;
                Some(lhs.cmp(d))
            }
            FieldValue::String(s) => match stored {
                Value::String(lhs) => Some(lhs.as_str().cmp(s.as_str())),
                // Query strings arrive untyped; let "42" meet a numeric column
                Value::Number(n) => {
                    let rhs = s.parse::<f64>().ok()?;
                    n.as_f64()?.partial_cmp(&rhs)
                }
                Value::Bool(b) => match s.as_str() {
                    "true" => Some(b.cmp(&true)),
                    "false" => Some(b.cmp(&false)),
                    _ => None,
                },
                _ => None,
            },
        }
    }

    /// Equality against a stored JSON value
    pub fn matches_json(&self, stored: &Value) -> bool {
        if self.is_null() {
            return stored.is_null();
        }
        self.compare_json(stored) == Some(Ordering::Equal)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

/// Parse a UUID in its hyphenated 8-4-4-4-12 form only
///
/// Braced, URN and unhyphenated spellings are rejected.
pub fn parse_uuid(s: &str) -> Option<Uuid> {
    if s.len() != 36 {
        return None;
    }
    Uuid::parse_str(s).ok()
}

/// Parse the date formats accepted on input: RFC 3339, a naive date-time
/// (read as UTC) or a bare calendar date (midnight UTC)
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Closed set of format predicates attachable to search fields and schemas
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Uuid,
    IsoDate,
    Numeric,
    Phone,
}

impl FieldFormat {
    /// Validate a field value against this format
    pub fn validate(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (FieldFormat::Uuid, FieldValue::Uuid(_)) => true,
            (FieldFormat::IsoDate, FieldValue::DateTime(_)) => true,
            (FieldFormat::Numeric, FieldValue::Integer(_) | FieldValue::Float(_)) => true,
            (_, FieldValue::String(s)) => self.validate_str(s),
            _ => false,
        }
    }

    /// Validate a raw string against this format
    pub fn validate_str(&self, s: &str) -> bool {
        match self {
            FieldFormat::Uuid => parse_uuid(s).is_some(),
            FieldFormat::IsoDate => parse_datetime(s).is_some(),
            FieldFormat::Numeric => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            FieldFormat::Phone => Self::is_valid_phone(s),
        }
    }

    /// Convert an already validated value into its typed representation
    pub fn coerce(&self, value: FieldValue) -> FieldValue {
        let FieldValue::String(s) = &value else {
            return value;
        };
        match self {
            FieldFormat::Uuid => parse_uuid(s).map(FieldValue::Uuid).unwrap_or(value),
            FieldFormat::IsoDate => parse_datetime(s)
                .map(FieldValue::DateTime)
                .unwrap_or(value),
            FieldFormat::Numeric => {
                let trimmed = s.trim();
                if let Ok(i) = trimmed.parse::<i64>() {
                    FieldValue::Integer(i)
                } else {
                    trimmed.parse::<f64>().map(FieldValue::Float).unwrap_or(value)
                }
            }
            FieldFormat::Phone => value,
        }
    }

    fn is_valid_phone(phone: &str) -> bool {
        static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = PHONE_REGEX.get_or_init(|| {
            // At least 8 digits, max 15 (E.164 standard)
            Regex::new(r"^\+?[1-9]\d{7,14}$").expect("phone pattern is valid")
        });
        regex.is_match(phone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(FieldValue::from_json(&json!("a")), FieldValue::String("a".into()));
        assert_eq!(FieldValue::from_json(&json!(3)), FieldValue::Integer(3));
        assert_eq!(FieldValue::from_json(&json!(2.5)), FieldValue::Float(2.5));
        assert_eq!(FieldValue::from_json(&json!(true)), FieldValue::Boolean(true));
        assert!(FieldValue::from_json(&json!(null)).is_null());
        assert!(FieldValue::from_json(&json!([1])).is_null());
    }

    #[test]
    fn test_uuid_validation() {
        let format = FieldFormat::Uuid;
        let valid_uuid = Uuid::new_v4().to_string();

        assert!(format.validate(&FieldValue::String(valid_uuid)));
        assert!(!format.validate(&FieldValue::String("not-a-uuid".to_string())));
        assert!(!format.validate(&FieldValue::Integer(4)));
    }

    #[test]
    fn test_uuid_requires_hyphenated_form() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string().to_uppercase()), Some(id));
        for raw in [
            id.simple().to_string(),
            id.braced().to_string(),
            id.urn().to_string(),
        ] {
            assert_eq!(parse_uuid(&raw), None, "{raw}");
            assert!(!FieldFormat::Uuid.validate_str(&raw));
        }
    }

    #[test]
    fn test_iso_date_validation() {
        let format = FieldFormat::IsoDate;
        assert!(format.validate_str("2024-01-15"));
        assert!(format.validate_str("2024-01-15T10:30:00Z"));
        assert!(format.validate_str("2024-01-15T10:30:00.123"));
        assert!(!format.validate_str("15/01/2024"));
    }

    #[test]
    fn test_numeric_validation() {
        let format = FieldFormat::Numeric;
        assert!(format.validate(&FieldValue::String("42".into())));
        assert!(format.validate(&FieldValue::String("4.2".into())));
        assert!(format.validate(&FieldValue::Float(1.0)));
        assert!(!format.validate(&FieldValue::String("forty".into())));
    }

    #[test]
    fn test_phone_validation() {
        let format = FieldFormat::Phone;

        assert!(format.validate(&FieldValue::String("+33612345678".to_string())));
        assert!(format.validate(&FieldValue::String("33612345678".to_string())));
        assert!(!format.validate(&FieldValue::String("123".to_string())));
    }

    #[test]
    fn test_coerce_to_typed_values() {
        let id = Uuid::new_v4();
        assert_eq!(
            FieldFormat::Uuid.coerce(FieldValue::String(id.to_string())),
            FieldValue::Uuid(id)
        );
        assert_eq!(
            FieldFormat::Numeric.coerce(FieldValue::String("12".into())),
            FieldValue::Integer(12)
        );
        assert!(matches!(
            FieldFormat::IsoDate.coerce(FieldValue::String("2024-01-15".into())),
            FieldValue::DateTime(_)
        ));
    }

    #[test]
    fn test_compare_datetime_against_stored_string() {
        let cutoff = parse_datetime("2024-06-01T00:00:00Z").unwrap();
        let operand = FieldValue::DateTime(cutoff);

        assert_eq!(
            operand.compare_json(&json!("2024-05-31T23:59:59Z")),
            Some(Ordering::Less)
        );
        assert_eq!(
            operand.compare_json(&json!("2024-06-01T00:00:00+00:00")),
            Some(Ordering::Equal)
        );
        assert_eq!(operand.compare_json(&json!(null)), None);
    }

    #[test]
    fn test_string_operand_meets_numeric_column() {
        let operand = FieldValue::String("362521879".into());
        assert!(operand.matches_json(&json!(362521879)));
        assert!(!operand.matches_json(&json!(1)));
    }

    #[test]
    fn test_uuid_operand_matches_stored_string() {
        let id = Uuid::new_v4();
        assert!(FieldValue::Uuid(id).matches_json(&json!(id.to_string())));
        assert!(!FieldValue::Uuid(id).matches_json(&json!(Uuid::new_v4().to_string())));
    }

    #[test]
    fn test_null_matches_only_null() {
        assert!(FieldValue::Null.matches_json(&json!(null)));
        assert!(!FieldValue::Null.matches_json(&json!("x")));
    }
}
