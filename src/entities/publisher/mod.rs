//! Publisher entity module

pub mod descriptor;
pub mod model;

pub use descriptor::PublisherDescriptor;
pub use model::{Publisher, publisher_options, publisher_schema};
