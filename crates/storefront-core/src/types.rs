//! # Domain Types
//!
//! Core domain types for discount-code resolution.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Seller       │   │    Product      │   │   OfferCode     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  seller_id      │   │  seller_id      │       │
//! │  │  display_offer_ │   │  permalink      │◄──│  permalinks     │       │
//! │  │   code_field    │   │  price_cents    │   │  discount       │       │
//! │  └─────────────────┘   │  default_code ──┼──►│  window, uses   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────┐                                       │
//! │  │  Discount                   │                                       │
//! │  │  Fixed(Money) | Percentage  │                                       │
//! │  └─────────────────────────────┘                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has a UUID `id` used for relations. Products are also
//! addressed by `unique_permalink` (the public URL slug) and offer codes by
//! `code` (what the buyer types), both scoped to a seller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::checkout_form::RecommendationType;
use crate::money::Money;

// =============================================================================
// Seller
// =============================================================================

/// A seller account and its checkout form settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Seller {
    pub id: String,
    pub name: String,

    /// Checkout form setting: show the discount code field only if a
    /// discount is available (`true`), or never (`false`).
    pub display_offer_code_field: bool,

    /// Checkout form setting: which products are recommended at checkout.
    pub recommendation_type: RecommendationType,

    /// Checkout form setting: buyers may add a tip.
    pub tipping_enabled: bool,
}

impl Seller {
    /// Creates a seller with a fresh id, the code field hidden, own-product
    /// recommendations and tipping off.
    pub fn new(name: impl Into<String>) -> Self {
        Seller {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            display_offer_code_field: false,
            recommendation_type: RecommendationType::default(),
            tipping_enabled: false,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Seller that owns this product.
    pub seller_id: String,

    /// Public URL slug, unique across the platform.
    pub unique_permalink: String,

    /// Display name.
    pub name: String,

    /// Base price in cents.
    pub price_cents: i64,

    /// Offer code applied automatically when the buyer supplies none.
    pub default_offer_code_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a product with a fresh id and no default code.
    pub fn new(
        seller_id: impl Into<String>,
        unique_permalink: impl Into<String>,
        name: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        Product {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.into(),
            unique_permalink: unique_permalink.into(),
            name: name.into(),
            price_cents,
            default_offer_code_id: None,
            created_at: Utc::now(),
        }
    }

    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Discount
// =============================================================================

/// What an offer code takes off the price.
///
/// Serialized as `{"kind": "fixed", "amount": 400}` or
/// `{"kind": "percentage", "amount": 20}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum Discount {
    /// A fixed amount in cents.
    Fixed(Money),
    /// A whole-number percentage of the price.
    Percentage(u32),
}

impl Discount {
    /// Amount saved against `price`.
    ///
    /// Fixed discounts are not capped at the price; the checkout clamps the
    /// final total separately.
    pub fn amount_off(&self, price: Money) -> Money {
        match self {
            Discount::Fixed(amount) => *amount,
            Discount::Percentage(percent) => price.percentage_of(*percent),
        }
    }
}

// =============================================================================
// Offer Code
// =============================================================================

/// A seller-defined discount code.
///
/// ## Scope
/// ```text
/// universal = true   → applies to every product of `seller_id`
/// universal = false  → applies only to `product_permalinks`
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfferCode {
    pub id: String,
    pub seller_id: String,

    /// Case-sensitive lookup key typed by buyers.
    pub code: String,

    pub discount: Discount,

    /// Smallest quantity the code accepts; 0 means no minimum.
    pub minimum_quantity: u32,

    /// Code becomes usable at this instant.
    #[ts(as = "Option<String>")]
    pub valid_at: Option<DateTime<Utc>>,

    /// Code stops being usable at this instant.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Total units the code may discount; `None` is unlimited.
    pub max_purchase_count: Option<u32>,

    /// Units already discounted.
    pub times_used: u32,

    pub universal: bool,

    /// Products a non-universal code applies to.
    pub product_permalinks: Vec<String>,

    /// Soft-delete marker. Deleted codes are invisible to every lookup.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl OfferCode {
    /// Creates an unrestricted, product-scoped code with no products yet.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    /// use storefront_core::types::{Discount, OfferCode};
    ///
    /// let code = OfferCode::new("seller-1", "SPRING", Discount::Percentage(20))
    ///     .for_products(["ebook"])
    ///     .minimum_quantity(2);
    ///
    /// assert!(code.applies_to("ebook"));
    /// assert_eq!(code.amount_off(Money::from_cents(1000)).cents(), 200);
    /// ```
    pub fn new(seller_id: impl Into<String>, code: impl Into<String>, discount: Discount) -> Self {
        OfferCode {
            id: Uuid::new_v4().to_string(),
            seller_id: seller_id.into(),
            code: code.into(),
            discount,
            minimum_quantity: 0,
            valid_at: None,
            expires_at: None,
            max_purchase_count: None,
            times_used: 0,
            universal: false,
            product_permalinks: Vec::new(),
            deleted_at: None,
        }
    }

    /// Scopes the code to the given product permalinks.
    pub fn for_products<I, S>(mut self, permalinks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.universal = false;
        self.product_permalinks = permalinks.into_iter().map(Into::into).collect();
        self
    }

    /// Makes the code apply to every product of the seller.
    pub fn universal(mut self) -> Self {
        self.universal = true;
        self.product_permalinks.clear();
        self
    }

    /// Sets the minimum purchase quantity.
    pub fn minimum_quantity(mut self, quantity: u32) -> Self {
        self.minimum_quantity = quantity;
        self
    }

    /// Sets the validity window.
    pub fn valid_between(
        mut self,
        valid_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.valid_at = valid_at;
        self.expires_at = expires_at;
        self
    }

    /// Caps the number of units the code may discount.
    pub fn max_purchase_count(mut self, count: u32) -> Self {
        self.max_purchase_count = Some(count);
        self
    }

    /// Whether the code has not been soft-deleted.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Whether the code covers the product with this permalink.
    ///
    /// Seller ownership is checked by the catalog, not here.
    pub fn applies_to(&self, permalink: &str) -> bool {
        self.universal || self.product_permalinks.iter().any(|p| p == permalink)
    }

    /// Amount this code saves against `price`.
    #[inline]
    pub fn amount_off(&self, price: Money) -> Money {
        self.discount.amount_off(price)
    }

    /// Whether `now` is before the start of the validity window.
    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_at.is_some_and(|start| now < start)
    }

    /// Whether `now` is at or past the end of the validity window.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|end| now >= end)
    }

    /// Units still available, `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<u32> {
        self.max_purchase_count
            .map(|max| max.saturating_sub(self.times_used))
    }

    /// Quantity the code is evaluated at: never below its minimum.
    #[inline]
    pub fn effective_quantity(&self, requested: u32) -> u32 {
        requested.max(self.minimum_quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
