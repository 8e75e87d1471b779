//! Shared fixtures for the catalog integration tests
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod catalog_harness;
//! use catalog_harness::*;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let fx = Fixture::new();
//!     let publisher = fx.insert_publisher().await;
//!     let game = fx.insert_game("Hades", 24.5, months_ago(18), publisher.id).await;
//! }
//! ```
//!
//! Every repository handed to the catalog is wrapped in a [`CountingRepository`]
//! so tests can assert how many storage round-trips an operation made.

#![allow(dead_code)]

pub mod repository_tests;

use async_trait::async_trait;
use catalog::prelude::*;
use chrono::{Months, TimeZone};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Reference instant used by every lifecycle test
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
}

/// `now()` shifted back by whole calendar months
pub fn months_ago(months: u32) -> DateTime<Utc> {
    now().checked_sub_months(Months::new(months)).unwrap()
}

// =============================================================================
// Call counting
// =============================================================================

/// Shared call counters for one repository
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl CallCounter {
    /// Every repository call so far, reads and writes
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// insert, save, update_many, delete and delete_many calls so far
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn write(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Repository decorator that counts calls before delegating
pub struct CountingRepository<T: Entity> {
    inner: Arc<dyn Repository<T>>,
    counter: CallCounter,
}

impl<T: Entity> CountingRepository<T> {
    pub fn new(inner: Arc<dyn Repository<T>>) -> (Self, CallCounter) {
        let counter = CallCounter::default();
        (
            Self {
                inner,
                counter: counter.clone(),
            },
            counter,
        )
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for CountingRepository<T> {
    async fn find(&self, conditions: &[Condition]) -> CatalogResult<Vec<T>> {
        self.counter.read();
        self.inner.find(conditions).await
    }

    async fn find_one(&self, id: &Uuid, joins: &JoinPlan) -> CatalogResult<Option<T>> {
        self.counter.read();
        self.inner.find_one(id, joins).await
    }

    async fn find_one_by(&self, field: &str, value: FieldValue) -> CatalogResult<Option<T>> {
        self.counter.read();
        self.inner.find_one_by(field, value).await
    }

    async fn exists(&self, id: &Uuid) -> CatalogResult<bool> {
        self.counter.read();
        self.inner.exists(id).await
    }

    async fn insert(&self, entity: T) -> CatalogResult<T> {
        self.counter.write();
        self.inner.insert(entity).await
    }

    async fn save(&self, entity: T) -> CatalogResult<T> {
        self.counter.write();
        self.inner.save(entity).await
    }

    async fn update_many(&self, ids: &[Uuid], patch: Value) -> CatalogResult<usize> {
        self.counter.write();
        self.inner.update_many(ids, patch).await
    }

    async fn delete(&self, id: &Uuid) -> CatalogResult<()> {
        self.counter.write();
        self.inner.delete(id).await
    }

    async fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<usize> {
        self.counter.write();
        self.inner.delete_many(ids).await
    }
}

// =============================================================================
// Fixture
// =============================================================================

/// A catalog over a fresh in-memory database, with counted repositories
pub struct Fixture {
    pub db: MemoryDatabase,
    pub catalog: Catalog,
    pub games: CallCounter,
    pub publishers: CallCounter,
    pub discounts: CallCounter,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_lifecycle(LifecycleConfig::default())
    }

    pub fn with_lifecycle(lifecycle: LifecycleConfig) -> Self {
        let db = MemoryDatabase::new(catalog::entities::catalog_schema());

        let (games_repo, games) = CountingRepository::new(Arc::new(db.repository::<Game>()));
        let (publishers_repo, publishers) =
            CountingRepository::new(Arc::new(db.repository::<Publisher>()));
        let (discounts_repo, discounts) =
            CountingRepository::new(Arc::new(db.repository::<Discount>()));

        let repositories = CatalogRepositories {
            games: Arc::new(games_repo),
            publishers: Arc::new(publishers_repo),
            discounts: Arc::new(discounts_repo),
        };

        Self {
            catalog: Catalog::new(repositories, lifecycle),
            db,
            games,
            publishers,
            discounts,
        }
    }

    // Direct inserts bypass the counters so setup never skews assertions.

    pub async fn insert_publisher(&self) -> Publisher {
        self.db
            .repository::<Publisher>()
            .insert(Publisher::new("Supergiant", 52184734700019, "+33612345678"))
            .await
            .unwrap()
    }

    pub async fn insert_discount(&self, percent: f64) -> Discount {
        self.db
            .repository::<Discount>()
            .insert(Discount::new(DiscountName::OldGame, percent))
            .await
            .unwrap()
    }

    pub async fn insert_game(
        &self,
        title: &str,
        price: f64,
        release_date: DateTime<Utc>,
        publisher_id: Uuid,
    ) -> Game {
        self.db
            .repository::<Game>()
            .insert(Game::new(title, price, release_date, publisher_id))
            .await
            .unwrap()
    }

    pub async fn insert_discounted_game(
        &self,
        title: &str,
        price: f64,
        release_date: DateTime<Utc>,
        publisher_id: Uuid,
        discount_id: Uuid,
    ) -> Game {
        let mut game = Game::new(title, price, release_date, publisher_id);
        game.discount_id = Some(discount_id);
        self.db.repository::<Game>().insert(game).await.unwrap()
    }

    /// Read a game straight from storage, no joins
    pub async fn stored_game(&self, id: &Uuid) -> Option<Game> {
        self.db
            .repository::<Game>()
            .find_one(id, &JoinPlan::none())
            .await
            .unwrap()
    }
}

/// A create payload that passes the game schema
pub fn game_payload(publisher_id: Uuid) -> Value {
    json!({
        "title": "Hollow Knight",
        "price": 14.99,
        "releaseDate": "2017-02-24T00:00:00Z",
        "publisherId": publisher_id,
        "tags": ["metroidvania", "indie"]
    })
}

pub fn publisher_payload() -> Value {
    json!({
        "name": "Team Cherry",
        "siret": 12345678900011i64,
        "phone": "+61412345678"
    })
}
