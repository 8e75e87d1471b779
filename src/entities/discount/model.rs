//! Discount model

use crate::core::entity::Entity;
use crate::core::relation::{RelationSpec, SortDirection, SubRelationSpec};
use crate::core::search::SearchFieldDescriptor;
use crate::core::service::EntityOptions;
use crate::core::validation::{FieldRule, ValidationSchema, filters, validators};
use crate::entities::game::Game;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Well-known discount names; at most one discount exists per name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscountName {
    /// Applied by the lifecycle policy to games past their prime
    #[serde(rename = "OLDGAME")]
    OldGame,
}

impl DiscountName {
    pub const ALL: [DiscountName; 1] = [DiscountName::OldGame];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountName::OldGame => "OLDGAME",
        }
    }
}

impl fmt::Display for DiscountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: Uuid,
    pub name: DiscountName,
    /// Reduction applied to the price, 0 to 100
    pub percent: f64,
    /// Games carrying this discount, when joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub games: Option<Vec<Game>>,
}

impl Discount {
    pub fn new(name: DiscountName, percent: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            percent,
            games: None,
        }
    }
}

impl Entity for Discount {
    fn entity_type() -> &'static str {
        "discount"
    }

    fn resource_name() -> &'static str {
        "discounts"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Discounts list their games by title, each with its publisher
pub fn discount_options() -> EntityOptions {
    EntityOptions::new()
        .search_field(SearchFieldDescriptor::new("name"))
        .relation(
            RelationSpec::new("games")
                .order_by("title", SortDirection::Asc)
                .with_subrelation(SubRelationSpec::new("publisher")),
        )
}

pub fn discount_schema() -> ValidationSchema {
    let names = DiscountName::ALL
        .iter()
        .map(|n| n.as_str().to_string())
        .collect();

    ValidationSchema::new("discount")
        .field(
            FieldRule::new("name")
                .filter(filters::trim())
                .validate(validators::in_list(names)),
        )
        .field(
            FieldRule::new("percent")
                .filter(filters::round_decimals(2))
                .validate(validators::number_range(0.0, 100.0)),
        )
}
