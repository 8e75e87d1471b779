//! Storage implementations of the [`Repository`](crate::core::store::Repository) contract

pub mod in_memory;

pub use in_memory::{DatabaseSchema, MemoryDatabase, MemoryRepository, RelationKind};
