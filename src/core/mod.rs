//! Core building blocks shared by every entity kind

pub mod boundary;
pub mod entity;
pub mod error;
pub mod field;
pub mod query;
pub mod relation;
pub mod search;
pub mod service;
pub mod store;
pub mod validation;

pub use boundary::{CrudBoundary, ResponseShape, parse_path_id};
pub use entity::Entity;
pub use error::{CatalogError, CatalogResult};
pub use field::{FieldFormat, FieldValue};
pub use query::Condition;
pub use relation::{JoinPlan, RelationSpec, SortDirection, SubRelationSpec};
pub use search::{SearchFieldDescriptor, SearchFilter, filter_search_params};
pub use service::{EntityOptions, EntityStore};
pub use store::Repository;
