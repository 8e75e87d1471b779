//! Wiring of the game catalog
//!
//! A [`Catalog`] owns one store per entity kind, the boundaries that guard
//! them and the lifecycle policy. Repositories are injected, so tests can
//! wrap or replace the in-memory ones.

use crate::config::LifecycleConfig;
use crate::core::boundary::{CrudBoundary, ResponseShape};
use crate::core::error::CatalogResult;
use crate::core::service::EntityStore;
use crate::core::store::Repository;
use crate::entities::discount::{
    Discount, DiscountDescriptor, DiscountService, discount_options, discount_schema,
};
use crate::entities::game::{
    Game, GameDescriptor, GameResponse, GameService, LifecyclePolicy, create_game_schema,
    game_options,
};
use crate::entities::publisher::{
    Publisher, PublisherDescriptor, publisher_options, publisher_schema,
};
use crate::entities::catalog_schema;
use crate::server::EntityRegistry;
use crate::storage::MemoryDatabase;
use std::sync::Arc;

/// Repositories backing each entity kind
pub struct CatalogRepositories {
    pub games: Arc<dyn Repository<Game>>,
    pub publishers: Arc<dyn Repository<Publisher>>,
    pub discounts: Arc<dyn Repository<Discount>>,
}

impl CatalogRepositories {
    pub fn in_memory(db: &MemoryDatabase) -> Self {
        Self {
            games: Arc::new(db.repository::<Game>()),
            publishers: Arc::new(db.repository::<Publisher>()),
            discounts: Arc::new(db.repository::<Discount>()),
        }
    }
}

#[derive(Clone)]
pub struct Catalog {
    pub games: CrudBoundary<Game>,
    pub publishers: CrudBoundary<Publisher>,
    pub discounts: CrudBoundary<Discount>,
    pub game_service: GameService,
    pub discount_service: DiscountService,
    pub lifecycle: LifecyclePolicy,
}

impl Catalog {
    /// A catalog over a fresh in-memory database
    pub fn in_memory(lifecycle: LifecycleConfig) -> Self {
        let db = MemoryDatabase::new(catalog_schema());
        Self::new(CatalogRepositories::in_memory(&db), lifecycle)
    }

    pub fn new(repositories: CatalogRepositories, lifecycle: LifecycleConfig) -> Self {
        let game_store = EntityStore::new(repositories.games, game_options());
        let publisher_store = EntityStore::new(repositories.publishers, publisher_options());
        let discount_store = EntityStore::new(repositories.discounts, discount_options());

        let game_service = GameService::new(game_store.clone());
        let discount_service = DiscountService::new(discount_store.clone());
        let lifecycle = LifecyclePolicy::new(game_store.clone(), discount_service.clone(), lifecycle);

        Self {
            games: CrudBoundary::new(game_store, create_game_schema())
                .with_response(ResponseShape::of::<GameResponse>()),
            publishers: CrudBoundary::new(publisher_store, publisher_schema()),
            discounts: CrudBoundary::new(discount_store, discount_schema()),
            game_service,
            discount_service,
            lifecycle,
        }
    }

    /// Insert the configured named discount unless it already exists
    ///
    /// Does nothing when no seed percent is configured.
    pub async fn seed(&self) -> CatalogResult<Option<Discount>> {
        let config = self.lifecycle.config();
        let Some(percent) = config.seed_discount_percent else {
            return Ok(None);
        };

        match self
            .discount_service
            .get_discount_by_name(config.discount_name)
            .await
        {
            Ok(existing) => Ok(Some(existing)),
            Err(e) if e.is_not_found() => {
                let discount = Discount::new(config.discount_name, percent);
                let created = self.discount_service.store().repository().insert(discount).await?;
                tracing::info!(name = %created.name, percent, "discount seeded");
                Ok(Some(created))
            }
            Err(e) => Err(e),
        }
    }

    /// Descriptors for every entity kind
    pub fn registry(&self) -> EntityRegistry {
        let mut registry = EntityRegistry::new();
        registry.register(Box::new(PublisherDescriptor::new(self.publishers.clone())));
        registry.register(Box::new(DiscountDescriptor::new(self.discounts.clone())));
        registry.register(Box::new(GameDescriptor::new(
            self.games.clone(),
            self.game_service.clone(),
            self.lifecycle.clone(),
        )));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DiscountName;

    #[tokio::test]
    async fn test_seed_is_noop_without_percent() {
        let catalog = Catalog::in_memory(LifecycleConfig::default());
        assert!(catalog.seed().await.unwrap().is_none());
        assert!(
            catalog
                .discount_service
                .get_discount_by_name(DiscountName::OldGame)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_seed_inserts_once() {
        let catalog = Catalog::in_memory(LifecycleConfig {
            seed_discount_percent: Some(30.0),
            ..LifecycleConfig::default()
        });
        let first = catalog.seed().await.unwrap().unwrap();
        let second = catalog.seed().await.unwrap().unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.percent, 30.0);
    }

    #[test]
    fn test_registry_lists_every_kind() {
        let catalog = Catalog::in_memory(LifecycleConfig::default());
        assert_eq!(
            catalog.registry().entity_types(),
            vec!["publisher", "discount", "game"]
        );
    }
}
