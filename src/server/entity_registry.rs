//! Registry of entity descriptors and the routes they contribute

use axum::Router;
use indexmap::IndexMap;

/// How an entity kind exposes itself over HTTP
///
/// Descriptors usually delegate to [`crud_routes`](super::handlers::crud_routes)
/// and merge in whatever kind-specific routes they need.
pub trait EntityDescriptor: Send + Sync {
    /// Singular kind name (e.g. "game")
    fn entity_type(&self) -> &str;

    /// Plural resource name used as the route prefix (e.g. "games")
    fn plural(&self) -> &str;

    fn build_routes(&self) -> Router;
}

/// Every entity kind the catalog serves, in registration order
#[derive(Default)]
pub struct EntityRegistry {
    descriptors: IndexMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second descriptor for the same kind replaces the first
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) {
        let entity_type = descriptor.entity_type().to_string();
        tracing::debug!(entity = %entity_type, plural = descriptor.plural(), "entity registered");
        self.descriptors.insert(entity_type, descriptor);
    }

    /// Merge the routes of every registered kind
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, d| router.merge(d.build_routes()))
    }

    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(|s| s.as_str()).collect()
    }

    pub fn plurals(&self) -> Vec<&str> {
        self.descriptors.values().map(|d| d.plural()).collect()
    }
}
