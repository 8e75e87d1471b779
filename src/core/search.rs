//! Allow-listed search parameters
//!
//! Each entity kind declares which query parameters may reach its store and,
//! optionally, a [`FieldFormat`] the value must satisfy. Anything not on the
//! list is dropped; a listed value that fails its format rejects the whole
//! request.

use crate::core::error::{CatalogResult, QueryError};
use crate::core::field::{FieldFormat, FieldValue};
use crate::core::query::Condition;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// A named, allow-listed query parameter
#[derive(Debug, Clone)]
pub struct SearchFieldDescriptor {
    pub name: String,
    pub validator: Option<FieldFormat>,
}

impl SearchFieldDescriptor {
    /// Allow the field without any format check
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validator: None,
        }
    }

    /// Allow the field when its value satisfies `format`
    pub fn validated(name: impl Into<String>, format: FieldFormat) -> Self {
        Self {
            name: name.into(),
            validator: Some(format),
        }
    }
}

/// Filtered search parameters, in allow-list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    fields: IndexMap<String, FieldValue>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Equality conditions matching every filtered field
    pub fn to_conditions(&self) -> Vec<Condition> {
        self.fields
            .iter()
            .map(|(name, value)| Condition::eq(name.clone(), value.clone()))
            .collect()
    }
}

/// Keep the allowed, present and valid parameters from `params`
///
/// Values that are absent or JSON `null` are skipped. Validated values are
/// coerced to their typed form (a UUID field yields [`FieldValue::Uuid`]).
pub fn filter_search_params(
    allowed: &[SearchFieldDescriptor],
    params: &Map<String, Value>,
) -> CatalogResult<SearchFilter> {
    let mut fields = IndexMap::new();

    for descriptor in allowed {
        let Some(raw) = params.get(&descriptor.name) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }

        let mut value = FieldValue::from_json(raw);
        if let Some(format) = &descriptor.validator {
            if !format.validate(&value) {
                tracing::warn!(field = %descriptor.name, "rejected search parameter");
                return Err(QueryError::InvalidParameter {
                    field: descriptor.name.clone(),
                    value: display_raw(raw),
                }
                .into());
            }
            value = format.coerce(value);
        }

        fields.insert(descriptor.name.clone(), value);
    }

    Ok(SearchFilter { fields })
}

fn display_raw(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
