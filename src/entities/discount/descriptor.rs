//! Entity descriptor for Discount

use super::model::Discount;
use crate::core::boundary::CrudBoundary;
use crate::server::entity_registry::EntityDescriptor;
use crate::server::handlers::crud_routes;
use axum::Router;

pub struct DiscountDescriptor {
    pub boundary: CrudBoundary<Discount>,
}

impl DiscountDescriptor {
    pub fn new(boundary: CrudBoundary<Discount>) -> Self {
        Self { boundary }
    }
}

impl EntityDescriptor for DiscountDescriptor {
    fn entity_type(&self) -> &str {
        "discount"
    }

    fn plural(&self) -> &str {
        "discounts"
    }

    fn build_routes(&self) -> Router {
        crud_routes(self.boundary.clone())
    }
}
