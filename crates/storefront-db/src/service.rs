//! # Offer Resolution Service
//!
//! Async entry point used by checkout: loads one seller's catalog snapshot
//! and runs the offer code resolver over it.
//!
//! ## Flow
//! ```text
//! best_offer_code("ebook", Some("SPRING"), Some(2))
//!      │
//!      ├── quantity (None → DEFAULT_QUANTITY), validated
//!      ├── products().get_by_permalink("ebook")      → NotFound if missing
//!      ├── load_catalog(product.seller_id)
//!      │      sellers + products + live offer codes
//!      ▼
//! BestOfferCodeResolver::new(OfferCodeDiscountComputer::new(&catalog, now))
//!      .resolve(&catalog.product_offers("ebook"), Some("SPRING"), 2)
//! ```
//!
//! Resolution is read-only. Recording usage after payment is a separate
//! call to [`OfferCodeRepository::record_use`](crate::OfferCodeRepository::record_use).

use chrono::{DateTime, Utc};
use storefront_core::validation::validate_quantity;
use storefront_core::{
    BestOfferCodeResolver, CustomField, OfferCodeDiscountComputer, ResolutionResult, SellerCatalog, DEFAULT_QUANTITY,
};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Resolves the best offer code for a checkout.
#[derive(Debug, Clone)]
pub struct OfferResolutionService {
    db: Database,
}

impl OfferResolutionService {
    pub fn new(db: Database) -> Self {
        OfferResolutionService { db }
    }

    /// Loads a snapshot of the seller's products and live offer codes.
    pub async fn load_catalog(&self, seller_id: &str) -> DbResult<SellerCatalog> {
        let seller = self
            .db
            .sellers()
            .get_by_id(seller_id)
            .await?
            .ok_or_else(|| DbError::not_found("Seller", seller_id))?;

        let products = self.db.products().list_for_seller(seller_id).await?;
        let offer_codes = self.db.offer_codes().list_live_for_seller(seller_id).await?;

        debug!(
            seller_id = %seller_id,
            products = products.len(),
            offer_codes = offer_codes.len(),
            "Loaded seller catalog"
        );

        Ok(SellerCatalog::new(seller, products, offer_codes)?)
    }

    /// Picks the better of the URL code and the product's default code,
    /// evaluated now.
    ///
    /// A missing quantity counts as [`DEFAULT_QUANTITY`]. `Ok(None)` when
    /// there is neither a URL code nor a default code.
    pub async fn best_offer_code(
        &self,
        permalink: &str,
        url_code: Option<&str>,
        quantity: Option<u32>,
    ) -> DbResult<Option<ResolutionResult>> {
        self.best_offer_code_at(permalink, url_code, quantity, Utc::now())
            .await
    }

    /// [`best_offer_code`](Self::best_offer_code) evaluated at a fixed instant.
    pub async fn best_offer_code_at(
        &self,
        permalink: &str,
        url_code: Option<&str>,
        quantity: Option<u32>,
        now: DateTime<Utc>,
    ) -> DbResult<Option<ResolutionResult>> {
        let quantity = quantity.unwrap_or(DEFAULT_QUANTITY);
        validate_quantity(quantity)?;

        let catalog = self.catalog_for(permalink).await?;
        let offers = catalog
            .product_offers(permalink)
            .ok_or_else(|| DbError::not_found("Product", permalink))?;

        let resolver = BestOfferCodeResolver::new(OfferCodeDiscountComputer::new(&catalog, now));
        let result = resolver.resolve(&offers, url_code, quantity)?;

        info!(
            permalink = %permalink,
            quantity,
            valid = result.as_ref().map(ResolutionResult::is_valid),
            code = ?result.as_ref().and_then(ResolutionResult::code),
            "Resolved best offer code"
        );

        Ok(result)
    }

    /// Whether the purchase form for this product shows the discount code field.
    pub async fn shows_offer_code_field(&self, permalink: &str) -> DbResult<bool> {
        let catalog = self.catalog_for(permalink).await?;
        Ok(catalog.shows_offer_code_field(permalink))
    }

    /// Custom fields the purchase form for this product asks, in form order.
    pub async fn checkout_fields(&self, permalink: &str) -> DbResult<Vec<CustomField>> {
        let product = self
            .db
            .products()
            .get_by_permalink(permalink)
            .await?
            .ok_or_else(|| DbError::not_found("Product", permalink))?;

        let form = self.db.checkout_forms().get(&product.seller_id).await?;
        Ok(form.fields_for(permalink).cloned().collect())
    }

    async fn catalog_for(&self, permalink: &str) -> DbResult<SellerCatalog> {
        let product = self
            .db
            .products()
            .get_by_permalink(permalink)
            .await?
            .ok_or_else(|| DbError::not_found("Product", permalink))?;

        self.load_catalog(&product.seller_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
