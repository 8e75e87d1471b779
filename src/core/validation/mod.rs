//! Payload validation and filtering
//!
//! Schemas declare, per field, the filters that normalise a raw value and
//! the validators that check it. Boundaries run a schema before any payload
//! reaches an [`EntityStore`](crate::core::service::EntityStore).

pub mod filters;
pub mod schema;
pub mod validators;

pub use filters::FieldFilter;
pub use schema::{FieldRule, ValidationMode, ValidationSchema};
pub use validators::FieldValidator;
