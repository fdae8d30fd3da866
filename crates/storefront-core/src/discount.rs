//! # Discount Engine
//!
//! Decides whether an offer code may discount a set of line items.
//!
//! ## Rule Order
//! ```text
//! compute("SPRING", [ebook × 2])
//!      │
//!      ├── code not live for seller?          → invalid_offer
//!      ├── product not in catalog?            → Err(ProductNotFound)
//!      ├── code does not cover product?       → invalid_offer
//!      ├── valid_at in the future?            → inactive
//!      ├── expires_at reached?                → expired
//!      ├── no uses left?                      → sold_out
//!      ├── fewer uses left than quantity?     → insufficient_times_of_use
//!      ├── quantity below minimum?            → unmet_minimum_purchase_quantity
//!      │
//!      └── Applied(discount)
//! ```
//!
//! Rejections are data. Only a catalog that cannot answer the question at
//! all produces an `Err`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;
use ts_rs::TS;

use crate::catalog::SellerCatalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Discount, OfferCode};

// =============================================================================
// Error Codes
// =============================================================================

/// Why a code cannot be used. Sent to the checkout frontend verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OfferErrorCode {
    /// No code was supplied for the slot.
    MissingCode,
    /// The code does not exist for this product or seller.
    InvalidOffer,
    /// The validity window has not started.
    Inactive,
    /// The validity window has ended.
    Expired,
    /// Every use has been consumed.
    SoldOut,
    /// Some uses remain, but fewer than the requested quantity.
    InsufficientTimesOfUse,
    /// Quantity is below the code's minimum.
    UnmetMinimumPurchaseQuantity,
}

impl OfferErrorCode {
    /// Wire name of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            OfferErrorCode::MissingCode => "missing_code",
            OfferErrorCode::InvalidOffer => "invalid_offer",
            OfferErrorCode::Inactive => "inactive",
            OfferErrorCode::Expired => "expired",
            OfferErrorCode::SoldOut => "sold_out",
            OfferErrorCode::InsufficientTimesOfUse => "insufficient_times_of_use",
            OfferErrorCode::UnmetMinimumPurchaseQuantity => "unmet_minimum_purchase_quantity",
        }
    }
}

impl fmt::Display for OfferErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Engine Interface
// =============================================================================

/// One product in the cart being priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub permalink: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(permalink: impl Into<String>, quantity: u32) -> Self {
        LineItem {
            permalink: permalink.into(),
            quantity,
        }
    }
}

/// Result of running the rules for one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountOutcome {
    Applied(Discount),
    Rejected(OfferErrorCode),
}

/// The discount computation the resolver consults.
///
/// `compute` may fail for infrastructure reasons; business rejections come
/// back as [`DiscountOutcome::Rejected`].
pub trait DiscountEngine {
    type Error: std::error::Error;

    /// Validates `code` against the line items.
    fn compute(&self, code: &str, items: &[LineItem]) -> Result<DiscountOutcome, Self::Error>;

    /// Amount `offer` saves against `price`, used for comparison only.
    fn amount_off(&self, offer: &OfferCode, price: Money) -> Money {
        offer.amount_off(price)
    }
}

// =============================================================================
// Catalog-backed Engine
// =============================================================================

/// Rules engine over a [`SellerCatalog`] at a fixed instant.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use storefront_core::discount::{DiscountEngine, DiscountOutcome, LineItem, OfferCodeDiscountComputer};
/// use storefront_core::{Discount, OfferCode, Product, Seller, SellerCatalog};
///
/// let seller = Seller::new("Maya");
/// let product = Product::new(&seller.id, "ebook", "Ebook", 1000);
/// let code = OfferCode::new(&seller.id, "SPRING", Discount::Percentage(20)).for_products(["ebook"]);
/// let catalog = SellerCatalog::new(seller, vec![product], vec![code]).unwrap();
///
/// let engine = OfferCodeDiscountComputer::new(&catalog, Utc::now());
/// let outcome = engine.compute("SPRING", &[LineItem::new("ebook", 1)]).unwrap();
/// assert_eq!(outcome, DiscountOutcome::Applied(Discount::Percentage(20)));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OfferCodeDiscountComputer<'a> {
    catalog: &'a SellerCatalog,
    now: DateTime<Utc>,
}

impl<'a> OfferCodeDiscountComputer<'a> {
    pub fn new(catalog: &'a SellerCatalog, now: DateTime<Utc>) -> Self {
        OfferCodeDiscountComputer { catalog, now }
    }

    /// Checks one code against the whole cart. First failure wins.
    fn check(&self, offer: &OfferCode, items: &[LineItem]) -> CoreResult<Option<OfferErrorCode>> {
        for item in items {
            if self.catalog.product(&item.permalink).is_none() {
                return Err(CoreError::ProductNotFound(item.permalink.clone()));
            }
            if !offer.applies_to(&item.permalink) {
                return Ok(Some(OfferErrorCode::InvalidOffer));
            }
        }

        if offer.is_pending_at(self.now) {
            return Ok(Some(OfferErrorCode::Inactive));
        }
        if offer.is_expired_at(self.now) {
            return Ok(Some(OfferErrorCode::Expired));
        }

        if let Some(remaining) = offer.remaining_uses() {
            let requested: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
            if remaining == 0 {
                return Ok(Some(OfferErrorCode::SoldOut));
            }
            if u64::from(remaining) < requested {
                return Ok(Some(OfferErrorCode::InsufficientTimesOfUse));
            }
        }

        if items.iter().any(|i| i.quantity < offer.minimum_quantity) {
            return Ok(Some(OfferErrorCode::UnmetMinimumPurchaseQuantity));
        }

        Ok(None)
    }
}

impl DiscountEngine for OfferCodeDiscountComputer<'_> {
    type Error = CoreError;

    fn compute(&self, code: &str, items: &[LineItem]) -> CoreResult<DiscountOutcome> {
        let Some(offer) = self.catalog.find_live_code(code) else {
            trace!(code = %code, "Offer code not found for seller");
            return Ok(DiscountOutcome::Rejected(OfferErrorCode::InvalidOffer));
        };

        let outcome = match self.check(offer, items)? {
            Some(error_code) => DiscountOutcome::Rejected(error_code),
            None => DiscountOutcome::Applied(offer.discount),
        };

        trace!(code = %code, ?outcome, "Offer code computed");
        Ok(outcome)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
