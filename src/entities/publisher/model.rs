//! Publisher model

use crate::core::entity::Entity;
use crate::core::field::FieldFormat;
use crate::core::search::SearchFieldDescriptor;
use crate::core::service::EntityOptions;
use crate::core::validation::{FieldRule, ValidationSchema, filters, validators};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    /// French company registration number
    pub siret: i64,
    pub phone: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>, siret: i64, phone: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            siret,
            phone: phone.into(),
        }
    }
}

impl Entity for Publisher {
    fn entity_type() -> &'static str {
        "publisher"
    }

    fn resource_name() -> &'static str {
        "publishers"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn publisher_options() -> EntityOptions {
    EntityOptions::new()
        .search_field(SearchFieldDescriptor::new("name"))
        .search_field(SearchFieldDescriptor::validated("siret", FieldFormat::Numeric))
}

pub fn publisher_schema() -> ValidationSchema {
    ValidationSchema::new("publisher")
        .field(
            FieldRule::new("name")
                .filter(filters::trim())
                .validate(validators::string_length(1, 255)),
        )
        .field(FieldRule::new("siret").validate(validators::is_integer()))
        .field(
            FieldRule::new("phone")
                .filter(filters::trim())
                .validate(validators::matches_format(FieldFormat::Phone)),
        )
}
