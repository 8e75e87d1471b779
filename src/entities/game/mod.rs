//! Game entity module

pub mod descriptor;
pub mod handlers;
pub mod lifecycle;
pub mod model;
pub mod service;

pub use descriptor::GameDescriptor;
pub use lifecycle::{ActualizeSummary, LifecyclePolicy};
pub use model::{Game, GameResponse, create_game_schema, game_options};
pub use service::GameService;
