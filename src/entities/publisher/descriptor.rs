//! Entity descriptor for Publisher

use super::model::Publisher;
use crate::core::boundary::CrudBoundary;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::handlers::crud_routes;
use axum::Router;

pub struct PublisherDescriptor {
    pub boundary: CrudBoundary<Publisher>,
}

impl PublisherDescriptor {
    pub fn new(boundary: CrudBoundary<Publisher>) -> Self {
        Self { boundary }
    }
}

impl EntityDescriptor for PublisherDescriptor {
    fn entity_type(&self) -> &str {
        "publisher"
    }

    fn plural(&self) -> &str {
        "publishers"
    }

    fn build_routes(&self) -> Router {
        crud_routes(self.boundary.clone())
    }
}
