//! Validation schemas for inbound payloads
//!
//! A schema lists the fields an entity kind accepts, the filters that
//! transform each raw value and the validators that check the result.
//! Undeclared fields never make it past a schema.

use super::filters::FieldFilter;
use super::validators::FieldValidator;
use crate::core::error::{CatalogResult, FieldValidationError, ValidationError};
use serde_json::{Map, Value};

/// How absent fields are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every non-optional declared field must be present (create, replace)
    Strict,
    /// Absent fields are not required (update)
    Partial,
}

/// Rules for a single declared field
#[derive(Clone)]
pub struct FieldRule {
    name: String,
    optional: bool,
    filters: Vec<FieldFilter>,
    validators: Vec<FieldValidator>,
}

impl FieldRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            filters: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Absence is allowed even in strict mode; an explicit `null` is kept
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn validate(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, raw: Value, errors: &mut Vec<FieldValidationError>) -> Option<Value> {
        let mut value = raw;
        for filter in &self.filters {
            match filter(&self.name, value) {
                Ok(next) => value = next,
                Err(message) => {
                    errors.push(FieldValidationError::new(&self.name, message));
                    return None;
                }
            }
        }

        let before = errors.len();
        for validator in &self.validators {
            if let Err(message) = validator(&self.name, &value) {
                errors.push(FieldValidationError::new(&self.name, message));
            }
        }
        (errors.len() == before).then_some(value)
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("filters", &self.filters.len())
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Field rules of one payload shape
#[derive(Debug, Clone)]
pub struct ValidationSchema {
    name: String,
    rules: Vec<FieldRule>,
}

impl ValidationSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
        }
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(FieldRule::name)
    }

    /// Transform and validate `payload`
    ///
    /// Returns an object holding only the declared fields. Every violated
    /// field is reported in a single [`ValidationError::FieldErrors`].
    pub fn validate_and_transform(
        &self,
        payload: Value,
        mode: ValidationMode,
    ) -> CatalogResult<Value> {
        let Value::Object(mut input) = payload else {
            return Err(ValidationError::FieldErrors(vec![FieldValidationError::new(
                self.name.as_str(),
                "payload must be a JSON object",
            )])
            .into());
        };

        let mut output = Map::new();
        let mut errors = Vec::new();

        for rule in &self.rules {
            match input.remove(&rule.name) {
                None | Some(Value::Null) if !rule.optional => {
                    if mode == ValidationMode::Strict {
                        errors.push(FieldValidationError::new(
                            &rule.name,
                            format!("'{}' is required", rule.name),
                        ));
                    }
                }
                None => {}
                Some(Value::Null) => {
                    output.insert(rule.name.clone(), Value::Null);
                }
                Some(raw) => {
                    if let Some(value) = rule.apply(raw, &mut errors) {
                        output.insert(rule.name.clone(), value);
                    }
                }
            }
        }

        if !input.is_empty() {
            let dropped: Vec<&String> = input.keys().collect();
            tracing::debug!(schema = %self.name, ?dropped, "dropping undeclared fields");
        }

        if errors.is_empty() {
            Ok(Value::Object(output))
        } else {
            tracing::warn!(schema = %self.name, count = errors.len(), "payload rejected");
            Err(ValidationError::FieldErrors(errors).into())
        }
    }
}
