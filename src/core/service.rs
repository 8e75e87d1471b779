//! Generic CRUD engine

use crate::core::entity::Entity;
use crate::core::error::{CatalogResult, EntityError, StorageError, ValidationError};
use crate::core::relation::{JoinPlan, RelationSpec};
use crate::core::search::{SearchFieldDescriptor, filter_search_params};
use crate::core::store::Repository;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Per-kind data the engine is composed with
#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    /// Query parameters `list_all` accepts
    pub search_fields: Vec<SearchFieldDescriptor>,
    /// Relations joined by `get_by_id` and everything built on it
    pub relations: Vec<RelationSpec>,
}

impl EntityOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_field(mut self, field: SearchFieldDescriptor) -> Self {
        self.search_fields.push(field);
        self
    }

    pub fn relation(mut self, relation: RelationSpec) -> Self {
        self.relations.push(relation);
        self
    }
}

/// Create/read/update/delete for one entity kind
///
/// The store never keeps entities around: every operation goes back to the
/// repository. Existence checks always run before any write.
pub struct EntityStore<T: Entity> {
    repository: Arc<dyn Repository<T>>,
    options: Arc<EntityOptions>,
    joins: Arc<JoinPlan>,
}

impl<T: Entity> Clone for EntityStore<T> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            options: self.options.clone(),
            joins: self.joins.clone(),
        }
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new(repository: Arc<dyn Repository<T>>, options: EntityOptions) -> Self {
        let joins = JoinPlan::from_specs(&options.relations);
        Self {
            repository,
            options: Arc::new(options),
            joins: Arc::new(joins),
        }
    }

    /// Underlying repository, for callers that need raw query primitives
    pub fn repository(&self) -> &Arc<dyn Repository<T>> {
        &self.repository
    }

    pub fn options(&self) -> &EntityOptions {
        &self.options
    }

    /// Entities matching the allowed search parameters by equality
    pub async fn list_all(&self, params: &Map<String, Value>) -> CatalogResult<Vec<T>> {
        let filter = filter_search_params(&self.options.search_fields, params)?;
        tracing::debug!(
            entity = T::entity_type(),
            filters = filter.len(),
            "listing entities"
        );
        self.repository.find(&filter.to_conditions()).await
    }

    /// The entity with its configured relations joined
    pub async fn get_by_id(&self, id: &Uuid) -> CatalogResult<T> {
        self.repository
            .find_one(id, &self.joins)
            .await?
            .ok_or_else(|| not_found::<T>(id))
    }

    /// Persist a new entity seeded from `payload`, then read it back joined
    ///
    /// The identifier is always generated here; an `id` in the payload is
    /// ignored.
    pub async fn create(&self, payload: Value) -> CatalogResult<T> {
        let mut fields = into_object(payload)?;
        let id = Uuid::new_v4();
        fields.insert("id".to_string(), Value::String(id.to_string()));

        let entity = from_fields::<T>(fields)?;
        let saved = self.repository.insert(entity).await?;
        tracing::debug!(entity = T::entity_type(), id = %saved.id(), "entity created");

        self.get_by_id(&saved.id()).await
    }

    /// Shallow-merge `payload` onto the stored entity and persist it
    ///
    /// Payload fields win; fields absent from the payload keep their current
    /// value. The returned entity is the merged value as saved, without a
    /// second read.
    pub async fn update(&self, id: &Uuid, payload: Value) -> CatalogResult<T> {
        self.ensure_exists(id).await?;
        let existing = self.get_by_id(id).await?;

        let mut fields = to_fields(&existing)?;
        for (key, value) in into_object(payload)? {
            if key == "id" {
                continue;
            }
            fields.insert(key, value);
        }

        let merged = from_fields::<T>(fields)?;
        let saved = self.repository.save(merged).await?;
        tracing::debug!(entity = T::entity_type(), id = %id, "entity updated");
        Ok(saved)
    }

    /// Delete the entity and return its joined state from before deletion
    pub async fn delete(&self, id: &Uuid) -> CatalogResult<T> {
        self.ensure_exists(id).await?;
        let entity = self.get_by_id(id).await?;
        self.repository.delete(id).await?;
        tracing::debug!(entity = T::entity_type(), id = %id, "entity deleted");
        Ok(entity)
    }

    /// Fail with `NotFound` unless the entity exists
    pub async fn ensure_exists(&self, id: &Uuid) -> CatalogResult<()> {
        if self.repository.exists(id).await? {
            Ok(())
        } else {
            Err(not_found::<T>(id))
        }
    }
}

pub(crate) fn not_found<T: Entity>(id: &Uuid) -> crate::core::error::CatalogError {
    EntityError::NotFound {
        entity_type: T::entity_type().to_string(),
        id: *id,
    }
    .into()
}

fn into_object(payload: Value) -> CatalogResult<Map<String, Value>> {
    match payload {
        Value::Object(fields) => Ok(fields),
        other => Err(ValidationError::InvalidJson {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
        }
        .into()),
    }
}

fn to_fields<T: Entity>(entity: &T) -> CatalogResult<Map<String, Value>> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StorageError::SerializationError {
            entity_type: T::entity_type().to_string(),
            message: format!("entity serialized as {}", json_kind(&other)),
        }
        .into()),
        Err(e) => Err(StorageError::SerializationError {
            entity_type: T::entity_type().to_string(),
            message: e.to_string(),
        }
        .into()),
    }
}

fn from_fields<T: Entity>(fields: Map<String, Value>) -> CatalogResult<T> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| {
        ValidationError::InvalidJson {
            message: format!("{}: {}", T::entity_type(), e),
        }
        .into()
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
