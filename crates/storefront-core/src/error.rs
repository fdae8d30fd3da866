//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Inconsistent data reaching the engine          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  NOT errors: OfferErrorCode (expired, sold out, ...) is returned as   │
//! │  data inside ResolutionResult, never raised.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Failures that are not business outcomes.
///
/// A code that is expired or sold out is a normal answer. These variants mean
/// the data handed to the engine does not hang together, and the caller
/// cannot produce a meaningful checkout price.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item references a product outside the loaded catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A product belongs to a different seller than the catalog.
    #[error("Product {permalink} belongs to seller {actual}, expected {expected}")]
    SellerMismatch {
        permalink: String,
        expected: String,
        actual: String,
    },

    /// Two live codes of one seller share a string.
    #[error("Duplicate live offer code: {0}")]
    DuplicateOfferCode(String),

    /// A submitted checkout form names a custom field the seller does not have.
    #[error("Custom field not found: {0}")]
    CustomFieldNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised when a seller creates or edits an offer code, before anything
/// is persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., characters not allowed in a code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Validity window ends before it starts.
    #[error("expires_at must be after valid_at")]
    InvertedWindow,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
