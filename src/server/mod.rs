//! HTTP exposure of the catalog
//!
//! - [`handlers`]: generic CRUD handlers over a [`CrudBoundary`](crate::core::boundary::CrudBoundary)
//! - [`EntityRegistry`]: descriptors contributing each kind's routes
//! - [`ServerBuilder`]: health check, tracing layer, graceful shutdown

pub mod builder;
pub mod entity_registry;
pub mod handlers;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use handlers::crud_routes;
