//! Persistence collaborator contract

use crate::core::entity::Entity;
use crate::core::error::CatalogResult;
use crate::core::field::FieldValue;
use crate::core::query::Condition;
use crate::core::relation::JoinPlan;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Storage operations the CRUD engine and the lifecycle policy rely on
///
/// Implementations own connection handling. Every method is one round-trip;
/// nothing here is transactional across calls.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// All rows matching every condition (no joins)
    async fn find(&self, conditions: &[Condition]) -> CatalogResult<Vec<T>>;

    /// The row with this id, with the plan's relations joined
    async fn find_one(&self, id: &Uuid, joins: &JoinPlan) -> CatalogResult<Option<T>>;

    /// First row whose `field` equals `value` (used for unique non-id fields)
    async fn find_one_by(&self, field: &str, value: FieldValue) -> CatalogResult<Option<T>>;

    /// Whether a row with this id exists
    async fn exists(&self, id: &Uuid) -> CatalogResult<bool>;

    /// Insert a new row; fails if the id is already taken. Returns `entity` as given
    async fn insert(&self, entity: T) -> CatalogResult<T>;

    /// Write the full row, replacing what is stored under its id. Returns `entity` as given
    async fn save(&self, entity: T) -> CatalogResult<T>;

    /// Apply the same partial patch to every listed row, returns rows touched
    async fn update_many(&self, ids: &[Uuid], patch: Value) -> CatalogResult<usize>;

    /// Delete one row by id
    async fn delete(&self, id: &Uuid) -> CatalogResult<()>;

    /// Delete every listed row, returns rows removed
    async fn delete_many(&self, ids: &[Uuid]) -> CatalogResult<usize>;
}
