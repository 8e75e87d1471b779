//! Entities module - contains the catalog's business entities

pub mod discount;
pub mod game;
pub mod publisher;

pub use discount::{Discount, DiscountName, DiscountService};
pub use game::{Game, GameResponse, GameService, LifecyclePolicy};
pub use publisher::Publisher;

use crate::storage::DatabaseSchema;

/// Relations and constraints between the catalog tables
pub fn catalog_schema() -> DatabaseSchema {
    DatabaseSchema::new()
        .to_one("game", "publisher", "publisher", "publisherId")
        .to_one("game", "discount", "discount", "discountId")
        .to_many("discount", "games", "game", "discountId")
        .unique("discount", "name")
}
