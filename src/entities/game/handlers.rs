//! Game-specific HTTP handlers

use super::lifecycle::{ActualizeSummary, LifecyclePolicy};
use super::service::GameService;
use crate::core::boundary::parse_path_id;
use crate::core::error::CatalogError;
use crate::entities::publisher::Publisher;
use axum::{
    Json,
    extract::{Path, State},
};

/// State of the routes that sit next to the generic game CRUD
#[derive(Clone)]
pub struct GameAppState {
    pub games: GameService,
    pub lifecycle: LifecyclePolicy,
}

/// `POST /games/actualize`
pub async fn actualize_games(
    State(state): State<GameAppState>,
) -> Result<Json<ActualizeSummary>, CatalogError> {
    Ok(Json(state.lifecycle.actualize().await?))
}

/// `GET /games/{id}/publisher`
pub async fn get_game_publisher(
    State(state): State<GameAppState>,
    Path(id): Path<String>,
) -> Result<Json<Publisher>, CatalogError> {
    let id = parse_path_id("id", &id)?;
    Ok(Json(state.games.get_publisher_by_game_id(&id).await?))
}
