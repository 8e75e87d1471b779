//! Request/response edge of an entity kind
//!
//! [`CrudBoundary`] sits between raw inbound data (path segments, query
//! strings, JSON bodies) and an [`EntityStore`]. Payloads are run through a
//! [`ValidationSchema`] on the way in; entities are projected through an
//! optional [`ResponseShape`] on the way out.

use crate::core::entity::Entity;
use crate::core::error::{CatalogError, CatalogResult, StorageError, ValidationError};
use crate::core::field::parse_uuid;
use crate::core::service::EntityStore;
use crate::core::validation::{ValidationMode, ValidationSchema};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

type Projector<T> = Arc<dyn Fn(&T) -> CatalogResult<Value> + Send + Sync>;

/// Outbound projection of an entity into its public form
pub struct ResponseShape<T: Entity> {
    project: Projector<T>,
}

impl<T: Entity> Clone for ResponseShape<T> {
    fn clone(&self) -> Self {
        Self {
            project: self.project.clone(),
        }
    }
}

impl<T: Entity> ResponseShape<T> {
    /// Project through a response type built from a borrowed entity
    ///
    /// ```rust,ignore
    /// let shape = ResponseShape::<Game>::of::<GameResponse>();
    /// ```
    pub fn of<R>() -> Self
    where
        R: Serialize + for<'a> From<&'a T> + 'static,
    {
        Self::with(|entity: &T| serde_json::to_value(R::from(entity)))
    }

    /// Project through an arbitrary serialising function
    pub fn with<F>(project: F) -> Self
    where
        F: Fn(&T) -> serde_json::Result<Value> + Send + Sync + 'static,
    {
        Self {
            project: Arc::new(move |entity: &T| {
                project(entity).map_err(|e| {
                    CatalogError::from(StorageError::SerializationError {
                        entity_type: T::entity_type().to_string(),
                        message: e.to_string(),
                    })
                })
            }),
        }
    }

    pub fn apply(&self, entity: &T) -> CatalogResult<Value> {
        (self.project)(entity)
    }
}

/// Validate a path segment as an entity identifier
pub fn parse_path_id(param: &str, raw: &str) -> CatalogResult<Uuid> {
    parse_uuid(raw).ok_or_else(|| {
        tracing::debug!(param, value = raw, "rejected path identifier");
        ValidationError::InvalidIdentifier {
            param: param.to_string(),
            value: raw.to_string(),
        }
        .into()
    })
}

/// Validated, projected CRUD over one entity kind
pub struct CrudBoundary<T: Entity> {
    store: EntityStore<T>,
    create_schema: Arc<ValidationSchema>,
    update_schema: Option<Arc<ValidationSchema>>,
    response: Option<ResponseShape<T>>,
}

impl<T: Entity> Clone for CrudBoundary<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            create_schema: self.create_schema.clone(),
            update_schema: self.update_schema.clone(),
            response: self.response.clone(),
        }
    }
}

impl<T: Entity> CrudBoundary<T> {
    pub fn new(store: EntityStore<T>, create_schema: ValidationSchema) -> Self {
        Self {
            store,
            create_schema: Arc::new(create_schema),
            update_schema: None,
            response: None,
        }
    }

    /// Use a dedicated schema for updates instead of the create schema
    pub fn with_update_schema(mut self, schema: ValidationSchema) -> Self {
        self.update_schema = Some(Arc::new(schema));
        self
    }

    pub fn with_response(mut self, shape: ResponseShape<T>) -> Self {
        self.response = Some(shape);
        self
    }

    pub fn store(&self) -> &EntityStore<T> {
        &self.store
    }

    pub async fn get_all(&self, params: &Map<String, Value>) -> CatalogResult<Value> {
        let entities = self.store.list_all(params).await?;
        self.project_many(&entities)
    }

    pub async fn get_by_id(&self, raw_id: &str) -> CatalogResult<Value> {
        let id = parse_path_id("id", raw_id)?;
        let entity = self.store.get_by_id(&id).await?;
        self.project(&entity)
    }

    pub async fn create(&self, payload: Value, skip_validation: bool) -> CatalogResult<Value> {
        let payload = self.inbound(&self.create_schema, payload, ValidationMode::Strict, skip_validation)?;
        let entity = self.store.create(payload).await?;
        self.project(&entity)
    }

    /// Partial update: only the fields present in `payload` are checked
    pub async fn update(
        &self,
        raw_id: &str,
        payload: Value,
        skip_validation: bool,
    ) -> CatalogResult<Value> {
        let id = parse_path_id("id", raw_id)?;
        let schema = self.update_schema.as_ref().unwrap_or(&self.create_schema);
        let payload = self.inbound(schema, payload, ValidationMode::Partial, skip_validation)?;
        let entity = self.store.update(&id, payload).await?;
        self.project(&entity)
    }

    /// Full replacement: the payload must satisfy the create schema
    pub async fn replace(
        &self,
        raw_id: &str,
        payload: Value,
        skip_validation: bool,
    ) -> CatalogResult<Value> {
        let id = parse_path_id("id", raw_id)?;
        let payload = self.inbound(&self.create_schema, payload, ValidationMode::Strict, skip_validation)?;
        let entity = self.store.update(&id, payload).await?;
        self.project(&entity)
    }

    pub async fn delete(&self, raw_id: &str) -> CatalogResult<Value> {
        let id = parse_path_id("id", raw_id)?;
        let entity = self.store.delete(&id).await?;
        self.project(&entity)
    }

    /// Public form of one entity; the raw entity when no shape is configured
    pub fn project(&self, entity: &T) -> CatalogResult<Value> {
        match &self.response {
            Some(shape) => shape.apply(entity),
            None => serde_json::to_value(entity).map_err(|e| {
                StorageError::SerializationError {
                    entity_type: T::entity_type().to_string(),
                    message: e.to_string(),
                }
                .into()
            }),
        }
    }

    pub fn project_many(&self, entities: &[T]) -> CatalogResult<Value> {
        entities
            .iter()
            .map(|e| self.project(e))
            .collect::<CatalogResult<Vec<_>>>()
            .map(Value::Array)
    }

    fn inbound(
        &self,
        schema: &ValidationSchema,
        payload: Value,
        mode: ValidationMode,
        skip_validation: bool,
    ) -> CatalogResult<Value> {
        if skip_validation {
            tracing::debug!(entity = T::entity_type(), "validation skipped");
            return Ok(payload);
        }
        schema.validate_and_transform(payload, mode)
    }
}
