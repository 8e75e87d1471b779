//! Generic CRUD handlers
//!
//! Every entity kind gets the same five routes through [`crud_routes`]; the
//! handlers only move data between axum extractors and a [`CrudBoundary`].

use crate::core::boundary::CrudBoundary;
use crate::core::entity::Entity;
use crate::core::error::CatalogError;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// `GET/POST /{plural}` and `GET/PUT/PATCH/DELETE /{plural}/{id}`
pub fn crud_routes<T: Entity>(boundary: CrudBoundary<T>) -> Router {
    let collection = format!("/{}", T::resource_name());
    let item = format!("/{}/{{id}}", T::resource_name());

    Router::new()
        .route(&collection, get(list_entities::<T>).post(create_entity::<T>))
        .route(
            &item,
            get(get_entity::<T>)
                .put(replace_entity::<T>)
                .patch(update_entity::<T>)
                .delete(delete_entity::<T>),
        )
        .with_state(boundary)
}

pub async fn list_entities<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, CatalogError> {
    let params: Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    Ok(Json(boundary.get_all(&params).await?))
}

pub async fn get_entity<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CatalogError> {
    Ok(Json(boundary.get_by_id(&id).await?))
}

pub async fn create_entity<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), CatalogError> {
    let created = boundary.create(payload, false).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_entity<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, CatalogError> {
    Ok(Json(boundary.update(&id, payload, false).await?))
}

pub async fn replace_entity<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, CatalogError> {
    Ok(Json(boundary.replace(&id, payload, false).await?))
}

pub async fn delete_entity<T: Entity>(
    State(boundary): State<CrudBoundary<T>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CatalogError> {
    Ok(Json(boundary.delete(&id).await?))
}
