//! # API Error Type
//!
//! Unified error type for register commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Register                           │
//! │                                                                         │
//! │  CLI / caller                Register commands                          │
//! │  ────────────                ─────────────────                          │
//! │                                                                         │
//! │  retreat-register buy ...                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Storage failure? ─── CoreError::Storage("...") ───┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Validation Error? ── CoreError::Validation ───── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  error: [CartError] Cart is empty          (exit status 1)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal failures are logged with their detail and surfaced with a
//! generic message; operator mistakes keep the domain message.

use serde::Serialize;
use retreat_core::CoreError;
use retreat_db::DbError;

use crate::state::ConfigError;

/// Error returned from register commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "CART_ERROR",
///   "message": "Cart is empty"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item or receipt not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Operation not allowed in the current state (e.g. resuming a paid receipt)
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed (empty cart, invalid lines)
    CartError,

    /// Export could not be delivered
    ShareError,

    /// Configuration could not be loaded
    ConfigError,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Failed to encode stored value: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptList { key, reason } => {
                tracing::error!(key = %key, "Refusing to overwrite unreadable list: {}", reason);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored {} is unreadable; nothing was changed", key),
                )
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            CoreError::InvalidState(reason) => ApiError::new(ErrorCode::BusinessLogic, reason),
            err @ (CoreError::EmptyCart | CoreError::InvalidItems { .. }) => {
                ApiError::cart(err.to_string())
            }
            CoreError::Storage(e) => {
                tracing::error!("Storage failure: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            CoreError::Share(e) => {
                tracing::error!("Export delivery failed: {}", e);
                ApiError::new(ErrorCode::ShareError, format!("Export failed: {}", e))
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use retreat_core::ValidationError;

    #[test]
    fn test_cart_errors_keep_message() {
        let err = ApiError::from(CoreError::EmptyCart);
        assert_eq!(err.code, ErrorCode::CartError);
        assert_eq!(err.message, "Cart is empty");

        let err = ApiError::from(CoreError::InvalidItems {
            count: 1,
            names: vec!["Candle".into()],
        });
        assert_eq!(err.code, ErrorCode::CartError);
        assert!(err.message.contains("Candle"));
    }

    #[test]
    fn test_storage_detail_is_hidden() {
        let err = ApiError::from(CoreError::Storage("disk I/O error at page 7".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn test_validation_and_not_found() {
        let err = ApiError::from(CoreError::from(ValidationError::Required {
            field: "buyer name".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "buyer name is required");

        let err = ApiError::from(DbError::not_found("Receipt", "r-1"));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.to_string(), "[NotFound] Receipt not found: r-1");
    }

    #[test]
    fn test_corrupt_list_names_the_list() {
        let err = ApiError::from(DbError::CorruptList {
            key: "receipt_list".into(),
            reason: "expected value at line 1 column 1".into(),
        });
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("receipt_list"));
        assert!(!err.message.contains("column 1"));
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_string(&ApiError::cart("Cart is empty")).unwrap();
        assert_eq!(json, r#"{"code":"CART_ERROR","message":"Cart is empty"}"#);
    }
}
