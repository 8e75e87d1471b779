//! Typed error handling for the catalog
//!
//! Every failure raised by the CRUD engine, the DTO boundary or the lifecycle
//! policy is a [`CatalogError`]. Errors are raised where they are detected and
//! travel unmodified up to the HTTP edge, which turns them into a status code
//! and a JSON body through [`IntoResponse`].
//!
//! # Error Categories
//!
//! - [`EntityError`]: a requested entity (or a required named record) is missing
//! - [`ValidationError`]: a payload or a path parameter failed its checks
//! - [`QueryError`]: a search parameter was rejected by the allow-list
//! - [`StorageError`]: the persistence collaborator failed
//! - [`ConfigError`]: configuration could not be loaded or is inconsistent
//!
//! # Example
//!
//! ```rust,ignore
//! match games.get_by_id(&id).await {
//!     Ok(game) => println!("{}", game.title),
//!     Err(CatalogError::Entity(EntityError::NotFound { id, .. })) => {
//!         println!("game {} is gone", id);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type of the catalog
#[derive(Debug)]
pub enum CatalogError {
    /// Missing entities or named records
    Entity(EntityError),

    /// Payload and path parameter validation
    Validation(ValidationError),

    /// Search parameter rejection
    Query(QueryError),

    /// Persistence collaborator failures
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Entity(e) => write!(f, "{}", e),
            CatalogError::Validation(e) => write!(f, "{}", e),
            CatalogError::Query(e) => write!(f, "{}", e),
            CatalogError::Storage(e) => write!(f, "{}", e),
            CatalogError::Config(e) => write!(f, "{}", e),
            CatalogError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Entity(e) => Some(e),
            CatalogError::Validation(e) => Some(e),
            CatalogError::Query(e) => Some(e),
            CatalogError::Storage(e) => Some(e),
            CatalogError::Config(e) => Some(e),
            CatalogError::Internal(_) => None,
        }
    }
}

/// Error body returned to HTTP clients
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Entity(_) => StatusCode::NOT_FOUND,
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Query(_) => StatusCode::BAD_REQUEST,
            CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::Entity(e) => e.error_code(),
            CatalogError::Validation(e) => e.error_code(),
            CatalogError::Query(_) => "INVALID_PARAMETER",
            CatalogError::Storage(_) => "STORAGE_ERROR",
            CatalogError::Config(_) => "CONFIG_ERROR",
            CatalogError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the error reports a missing entity or named record
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Entity(_))
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            CatalogError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            CatalogError::Entity(EntityError::NotFoundBy {
                entity_type,
                field,
                value,
            }) => Some(serde_json::json!({
                "entity_type": entity_type,
                "field": field,
                "value": value
            })),
            CatalogError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            CatalogError::Query(QueryError::InvalidParameter { field, .. }) => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors raised when a record cannot be located
#[derive(Debug)]
pub enum EntityError {
    /// No entity of that kind carries the identifier
    NotFound { entity_type: String, id: Uuid },

    /// No entity of that kind has the given value in a unique field
    NotFoundBy {
        entity_type: String,
        field: String,
        value: String,
    },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity_type, id } => {
                write!(f, "{} with id '{}' not found", entity_type, id)
            }
            EntityError::NotFoundBy {
                entity_type,
                field,
                value,
            } => {
                write!(f, "{} with {} '{}' not found", entity_type, field, value)
            }
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::NotFoundBy { .. } => "NAMED_ENTITY_NOT_FOUND",
        }
    }
}

impl From<EntityError> for CatalogError {
    fn from(err: EntityError) -> Self {
        CatalogError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to inbound payloads and path parameters
#[derive(Debug)]
pub enum ValidationError {
    /// One or more fields failed the schema; always carries every violation
    FieldErrors(Vec<FieldValidationError>),

    /// A path parameter is not a well-formed identifier
    InvalidIdentifier { param: String, value: String },

    /// The payload could not be read as the expected JSON shape
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::InvalidIdentifier { param, value } => {
                write!(f, "Parameter :{} should be a uuid (got '{}')", param, value)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidIdentifier { .. } => "INVALID_IDENTIFIER",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }

    /// Field errors carried by this error, empty for the other variants
    pub fn field_errors(&self) -> &[FieldValidationError] {
        match self {
            ValidationError::FieldErrors(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(err: ValidationError) -> Self {
        CatalogError::Validation(err)
    }
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors raised while filtering search parameters
#[derive(Debug)]
pub enum QueryError {
    /// An allowed search field carries a value its validator rejects
    InvalidParameter { field: String, value: String },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::InvalidParameter { field, value } => {
                write!(f, "Param {} is not valid (got '{}')", field, value)
            }
        }
    }
}

impl std::error::Error for QueryError {}

impl From<QueryError> for CatalogError {
    fn from(err: QueryError) -> Self {
        CatalogError::Query(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors surfaced by the persistence collaborator
#[derive(Debug)]
pub enum StorageError {
    /// Query execution error
    QueryError { backend: String, message: String },

    /// The backend lock was poisoned by a panicking writer
    LockError { message: String },

    /// Constraint violation (foreign key, unique column, duplicate id)
    IntegrityError { message: String },

    /// A stored row could not be converted to or from its entity type
    SerializationError {
        entity_type: String,
        message: String,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
            StorageError::LockError { message } => {
                write!(f, "Failed to acquire storage lock: {}", message)
            }
            StorageError::IntegrityError { message } => {
                write!(f, "Data integrity error: {}", message)
            }
            StorageError::SerializationError {
                entity_type,
                message,
            } => {
                write!(f, "Failed to convert {} row: {}", entity_type, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for CatalogError {
    fn from(err: StorageError) -> Self {
        CatalogError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound { path: String },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CatalogError {
    fn from(err: ConfigError) -> Self {
        CatalogError::Config(err)
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
