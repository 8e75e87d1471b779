//! Discount entity module

pub mod descriptor;
pub mod model;
pub mod service;

pub use descriptor::DiscountDescriptor;
pub use model::{Discount, DiscountName, discount_options, discount_schema};
pub use service::DiscountService;
