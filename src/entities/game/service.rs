//! Game service

use super::model::Game;
use crate::core::error::{CatalogResult, EntityError};
use crate::core::relation::JoinPlan;
use crate::core::service::EntityStore;
use crate::entities::publisher::Publisher;
use uuid::Uuid;

/// Game lookups that go beyond plain CRUD
#[derive(Clone)]
pub struct GameService {
    store: EntityStore<Game>,
}

impl GameService {
    pub fn new(store: EntityStore<Game>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore<Game> {
        &self.store
    }

    /// The publisher of an existing game
    pub async fn get_publisher_by_game_id(&self, id: &Uuid) -> CatalogResult<Publisher> {
        self.store.ensure_exists(id).await?;

        let game = self
            .store
            .repository()
            .find_one(id, &JoinPlan::single("publisher"))
            .await?;

        game.and_then(|g| g.publisher).ok_or_else(|| {
            EntityError::NotFoundBy {
                entity_type: "publisher".to_string(),
                field: "gameId".to_string(),
                value: id.to_string(),
            }
            .into()
        })
    }
}
