//! # Error Types
//!
//! Domain-specific error types for retreat-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  retreat-core errors (this file)                                       │
//! │  ├── CoreError        - Use-case outcomes (not found, empty cart, ...) │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  retreat-db errors (separate crate)                                    │
//! │  └── DbError          - Storage failures, folded into CoreError        │
//! │                                                                         │
//! │  Register host errors                                                  │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every fallible use case returns `CoreResult<T>`; nothing in this crate
//! panics on bad input.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Use-case failures.
///
/// The variants are the error kinds callers branch on when they turn a
/// failed operation into an operator-facing message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Field-level validation failed (blank name, non-positive quantity, ...).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Item or receipt is absent from the collection.
    ///
    /// ## When This Occurs
    /// - Removing a cart line that was already removed
    /// - Looking up a receipt id that was deleted
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An internal invariant does not hold (e.g. zero quantity on a stored
    /// line while deriving its unit price).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Checkout or validation was attempted on a cart with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// One or more lines have a non-positive quantity or total.
    #[error("Cart contains {count} invalid item(s): {names:?}")]
    InvalidItems { count: usize, names: Vec<String> },

    /// The storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The share collaborator failed.
    #[error("Share failed: {0}")]
    Share(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate item name).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Value does not fit in the amount or count it is stored as.
    #[error("{field} is too large")]
    TooLarge { field: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }

    pub(crate) fn too_large(field: &str) -> Self {
        ValidationError::TooLarge {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
