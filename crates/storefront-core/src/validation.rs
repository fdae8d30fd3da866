//! # Validation Module
//!
//! Input validation for offer codes, checkout parameters and checkout form
//! custom fields.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Seller saves an offer code                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_offer_code(&offer) ← THIS MODULE                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OfferCodeRepository::insert (UNIQUE(seller_id, code) for live codes)   │
//! │                                                                         │
//! │  Buyer opens checkout                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_quantity(qty) ← THIS MODULE, before resolving                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Buyer-supplied code strings are NOT validated here: a malformed URL code
//! is simply not found, and the resolver reports `invalid_offer`.
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{validate_code_string, validate_quantity};
//!
//! validate_code_string("SPRING-20").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use chrono::{DateTime, Utc};
use url::Url;

use crate::checkout_form::{CustomField, CustomFieldType};
use crate::error::ValidationError;
use crate::types::{Discount, OfferCode};
use crate::{MAX_ITEM_QUANTITY, MAX_OFFER_CODE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates the code string a seller chooses.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_OFFER_CODE_LENGTH`] characters
/// - Letters, digits, hyphens and underscores only
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_code_string;
///
/// assert!(validate_code_string("SPRING_20").is_ok());
/// assert!(validate_code_string("").is_err());
/// assert!(validate_code_string("has space").is_err());
/// ```
pub fn validate_code_string(code: &str) -> ValidationResult<()> {
    if code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() > MAX_OFFER_CODE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_OFFER_CODE_LENGTH,
        });
    }

    if !code.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a checkout quantity: 1 to [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 || qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(MAX_ITEM_QUANTITY),
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free products).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount amount.
///
/// ## Rules
/// - Fixed: at least one cent
/// - Percentage: 1 to 100
pub fn validate_discount(discount: &Discount) -> ValidationResult<()> {
    match discount {
        Discount::Fixed(amount) if amount.cents() <= 0 => Err(ValidationError::OutOfRange {
            field: "amount_cents".to_string(),
            min: 1,
            max: i64::MAX,
        }),
        Discount::Percentage(pct) if *pct == 0 || *pct > 100 => Err(ValidationError::OutOfRange {
            field: "amount_percentage".to_string(),
            min: 1,
            max: 100,
        }),
        _ => Ok(()),
    }
}

/// Validates that a window ends after it starts.
pub fn validate_window(
    valid_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
) -> ValidationResult<()> {
    match (valid_at, expires_at) {
        (Some(start), Some(end)) if end <= start => Err(ValidationError::InvertedWindow),
        _ => Ok(()),
    }
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates an offer code before it is persisted.
///
/// A scoped code must name at least one product.
pub fn validate_offer_code(offer: &OfferCode) -> ValidationResult<()> {
    validate_code_string(&offer.code)?;
    validate_discount(&offer.discount)?;
    validate_window(offer.valid_at, offer.expires_at)?;

    if !offer.universal && offer.product_permalinks.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    Ok(())
}

/// Validates a checkout form custom field after submitted attributes are
/// merged in.
///
/// ## Rules
/// - Name must not be blank
/// - A terms field's name is the terms page and must be an http(s) URL
/// - A non-global field must name at least one product
pub fn validate_custom_field(field: &CustomField) -> ValidationResult<()> {
    if field.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if field.field_type == CustomFieldType::Terms {
        let is_web_url = Url::parse(field.name.trim())
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_web_url {
            return Err(ValidationError::InvalidFormat {
                field: "name".to_string(),
                reason: "terms field name must be a URL".to_string(),
            });
        }
    }

    if !field.global && field.product_permalinks.is_empty() {
        return Err(ValidationError::Required {
            field: "products".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
