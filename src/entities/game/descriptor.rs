//! Entity descriptor for Game

use super::handlers::{GameAppState, actualize_games, get_game_publisher};
use super::lifecycle::LifecyclePolicy;
use super::model::Game;
use super::service::GameService;
use crate::core::boundary::CrudBoundary;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::handlers::crud_routes;
use axum::{
    Router,
    routing::{get, post},
};

/// Descriptor for the Game entity
pub struct GameDescriptor {
    pub boundary: CrudBoundary<Game>,
    pub games: GameService,
    pub lifecycle: LifecyclePolicy,
}

impl GameDescriptor {
    pub fn new(boundary: CrudBoundary<Game>, games: GameService, lifecycle: LifecyclePolicy) -> Self {
        Self {
            boundary,
            games,
            lifecycle,
        }
    }
}

impl EntityDescriptor for GameDescriptor {
    fn entity_type(&self) -> &str {
        "game"
    }

    fn plural(&self) -> &str {
        "games"
    }

    fn build_routes(&self) -> Router {
        let state = GameAppState {
            games: self.games.clone(),
            lifecycle: self.lifecycle.clone(),
        };

        let extras = Router::new()
            .route("/games/actualize", post(actualize_games))
            .route("/games/{id}/publisher", get(get_game_publisher))
            .with_state(state);

        crud_routes(self.boundary.clone()).merge(extras)
    }
}
