//! Discount service

use super::model::{Discount, DiscountName};
use crate::core::error::{CatalogResult, EntityError};
use crate::core::field::FieldValue;
use crate::core::service::EntityStore;

/// CRUD over discounts plus lookup by name
#[derive(Clone)]
pub struct DiscountService {
    store: EntityStore<Discount>,
}

impl DiscountService {
    pub fn new(store: EntityStore<Discount>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &EntityStore<Discount> {
        &self.store
    }

    /// The discount registered under `name`
    ///
    /// A missing named discount is a setup problem, reported as `NotFoundBy`.
    pub async fn get_discount_by_name(&self, name: DiscountName) -> CatalogResult<Discount> {
        self.store
            .repository()
            .find_one_by("name", FieldValue::from(name.as_str()))
            .await?
            .ok_or_else(|| {
                EntityError::NotFoundBy {
                    entity_type: "discount".to_string(),
                    field: "name".to_string(),
                    value: name.to_string(),
                }
                .into()
            })
    }
}
