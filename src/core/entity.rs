//! Entity trait shared by every persisted kind

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for all persisted records.
///
/// Entities travel through repositories as serde values, so every kind is
/// `Serialize + DeserializeOwned`. The identifier is assigned once on create
/// and never changes afterwards.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Singular kind name, also the table name (e.g. "game")
    fn entity_type() -> &'static str;

    /// Plural resource name used in URLs (e.g. "games")
    fn resource_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;
}
