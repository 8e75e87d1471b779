//! Game model and its public response shape

use crate::core::entity::Entity;
use crate::core::field::FieldFormat;
use crate::core::relation::RelationSpec;
use crate::core::search::SearchFieldDescriptor;
use crate::core::service::EntityOptions;
use crate::core::validation::{FieldRule, ValidationSchema, filters, validators};
use crate::entities::discount::Discount;
use crate::entities::publisher::Publisher;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub release_date: DateTime<Utc>,
    pub publisher_id: Uuid,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub discount_id: Option<Uuid>,

    // Joined relations, never persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<Publisher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
}

impl Game {
    pub fn new(
        title: impl Into<String>,
        price: f64,
        release_date: DateTime<Utc>,
        publisher_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            price,
            release_date,
            publisher_id,
            tags: None,
            discount_id: None,
            publisher: None,
            discount: None,
        }
    }

    /// Price after the joined discount, rounded to cents
    ///
    /// Without a joined discount the list price is returned unchanged. A joined
    /// discount that no longer matches `discount_id` is ignored.
    pub fn sale_price(&self) -> f64 {
        match &self.discount {
            Some(discount) if self.discount_id == Some(discount.id) => {
                let discounted = self.price * (100.0 - discount.percent) / 100.0;
                (discounted * 100.0).round() / 100.0
            }
            _ => self.price,
        }
    }
}

impl Entity for Game {
    fn entity_type() -> &'static str {
        "game"
    }

    fn resource_name() -> &'static str {
        "games"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

/// What clients see of a game
///
/// `publisherId` is exposed as `publisher`; the discount reference and the
/// joined discount stay internal and only surface through `salePrice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResponse {
    pub id: Uuid,
    pub title: String,
    pub price: f64,
    pub release_date: DateTime<Utc>,
    pub publisher: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    pub sale_price: f64,
}

impl From<&Game> for GameResponse {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            price: game.price,
            release_date: game.release_date,
            publisher: game.publisher_id,
            tags: game.tags.clone(),
            sale_price: game.sale_price(),
        }
    }
}

pub fn game_options() -> EntityOptions {
    EntityOptions::new()
        .search_field(SearchFieldDescriptor::new("title"))
        .search_field(SearchFieldDescriptor::validated("publisherId", FieldFormat::Uuid))
        .search_field(SearchFieldDescriptor::validated("discountId", FieldFormat::Uuid))
        .relation(RelationSpec::new("discount"))
}

pub fn create_game_schema() -> ValidationSchema {
    ValidationSchema::new("game")
        .field(
            FieldRule::new("title")
                .filter(filters::trim())
                .validate(validators::is_string()),
        )
        .field(FieldRule::new("price").validate(validators::is_number()))
        .field(
            FieldRule::new("releaseDate")
                .filter(filters::iso_datetime())
                .validate(validators::is_date_string()),
        )
        .field(
            FieldRule::new("publisherId")
                .filter(filters::canonical_uuid())
                .validate(validators::is_uuid()),
        )
        .field(
            FieldRule::new("tags")
                .optional()
                .validate(validators::each_length(2, 20)),
        )
        .field(
            FieldRule::new("discountId")
                .optional()
                .filter(filters::canonical_uuid())
                .validate(validators::is_uuid()),
        )
}
