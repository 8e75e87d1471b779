//! # Game Catalog
//!
//! A generic CRUD layer for entity kinds, applied to a small game catalog.
//!
//! ## Features
//!
//! - **Allow-listed search**: each kind declares the query parameters that may
//!   reach its store, with optional format checks
//! - **Declarative relation joins**: relations and one nested sub-relation,
//!   each independently ordered
//! - **Generic entity store**: list, get, create, update (shallow merge) and
//!   delete with existence checks before every write
//! - **DTO boundary**: schema validation with aggregated field errors on the
//!   way in, typed response projections on the way out
//! - **Lifecycle policy**: purge old games and discount ageing ones
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog::prelude::*;
//!
//! let catalog = Catalog::in_memory(LifecycleConfig::default());
//! let created = catalog
//!     .games
//!     .create(json!({
//!         "title": "Hades",
//!         "price": 24.5,
//!         "releaseDate": "2020-09-17",
//!         "publisherId": publisher_id,
//!     }), false)
//!     .await?;
//!
//! let summary = catalog.lifecycle.actualize().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        Condition, CrudBoundary, Entity, EntityOptions, EntityStore, FieldFormat, FieldValue,
        JoinPlan, RelationSpec, Repository, ResponseShape, SearchFieldDescriptor, SortDirection,
        SubRelationSpec, parse_path_id,
        error::{CatalogError, CatalogResult, EntityError, ValidationError},
        validation::{FieldRule, ValidationMode, ValidationSchema, filters, validators},
    };

    // === Entities ===
    pub use crate::entities::{
        Discount, DiscountName, DiscountService, Game, GameResponse, GameService,
        LifecyclePolicy, Publisher, game::ActualizeSummary,
    };

    // === Wiring ===
    pub use crate::catalog::{Catalog, CatalogRepositories};
    pub use crate::config::{AppConfig, LifecycleConfig, ServerConfig};
    pub use crate::server::{EntityDescriptor, EntityRegistry, ServerBuilder};
    pub use crate::storage::{DatabaseSchema, MemoryDatabase};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use uuid::Uuid;
}
