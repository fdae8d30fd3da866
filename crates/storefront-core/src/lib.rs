//! # storefront-core: Pure Business Logic for Storefront Offers
//!
//! This crate decides which discount a buyer gets at checkout. It contains
//! the offer code model, the discount rules engine and the best-offer
//! resolver as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Checkout Flow                            │
//! │                                                                         │
//! │  Buyer opens /l/<permalink>?code=SPRING                                 │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           storefront-db: OfferResolutionService                 │   │
//! │  │    loads SellerCatalog snapshot from SQLite                     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │ discount  │  │ resolver  │  │   money   │  │   │
//! │  │   │ snapshot  │─►│  engine   │─►│ best code │  │  cents    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Seller, Product, OfferCode, Discount)
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - Per-seller snapshot used for lookups
//! - [`checkout_form`] - Seller checkout form settings and custom fields
//! - [`discount`] - Discount rules engine and its error codes
//! - [`resolver`] - URL code vs default code arbitration
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation for offer codes and custom fields
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::types::Discount;
//!
//! let price = Money::from_cents(1000);
//! assert_eq!(Discount::Percentage(20).amount_off(price).cents(), 200);
//! assert_eq!(Discount::Fixed(Money::from_cents(400)).amount_off(price).cents(), 400);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod checkout_form;
pub mod discount;
pub mod error;
pub mod money;
pub mod resolver;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{ProductOffers, SellerCatalog};
pub use checkout_form::{
    CheckoutForm, CheckoutFormSettings, CheckoutFormUpdate, CustomField, CustomFieldInput, CustomFieldType,
    RecommendationType,
};
pub use discount::{DiscountEngine, DiscountOutcome, LineItem, OfferCodeDiscountComputer, OfferErrorCode};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use resolver::{BestOfferCodeResolver, DiscountableProduct, ResolutionResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity used when the purchase flow does not specify one.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Maximum length of an offer code string.
pub const MAX_OFFER_CODE_LENGTH: usize = 100;

/// Maximum quantity a single checkout line may request.
pub const MAX_ITEM_QUANTITY: u32 = 9_999;
