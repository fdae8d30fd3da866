//! # Seller Catalog
//!
//! A read-only snapshot of one seller's products and offer codes.
//!
//! The database layer loads a snapshot once per checkout evaluation; the
//! engine and resolver then run against it without touching storage.
//!
//! ## Lookup Scopes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SellerCatalog::find_live_code("SPRING")                                │
//! │     every live code of the seller, applicable or not                    │
//! │                                                                         │
//! │  ProductOffers::find_offer_code("SPRING")                               │
//! │     live codes that cover THIS product (scoped or universal)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::resolver::DiscountableProduct;
use crate::types::{OfferCode, Product, Seller};

/// Snapshot of one seller's catalog.
#[derive(Debug, Clone)]
pub struct SellerCatalog {
    seller: Seller,
    products: Vec<Product>,
    offer_codes: Vec<OfferCode>,
}

impl SellerCatalog {
    /// Builds a snapshot, rejecting rows owned by another seller and two
    /// live codes sharing one string.
    pub fn new(seller: Seller, products: Vec<Product>, offer_codes: Vec<OfferCode>) -> CoreResult<Self> {
        if let Some(stray) = products.iter().find(|p| p.seller_id != seller.id) {
            return Err(CoreError::SellerMismatch {
                permalink: stray.unique_permalink.clone(),
                expected: seller.id.clone(),
                actual: stray.seller_id.clone(),
            });
        }

        if let Some(stray) = offer_codes.iter().find(|c| c.seller_id != seller.id) {
            return Err(CoreError::SellerMismatch {
                permalink: stray.code.clone(),
                expected: seller.id.clone(),
                actual: stray.seller_id.clone(),
            });
        }

        // same rule as the live-code unique index in storage
        let duplicate = {
            let mut live = HashSet::new();
            offer_codes
                .iter()
                .filter(|c| c.is_alive())
                .find(|c| !live.insert(c.code.as_str()))
                .map(|c| c.code.clone())
        };
        if let Some(code) = duplicate {
            return Err(CoreError::DuplicateOfferCode(code));
        }

        Ok(SellerCatalog {
            seller,
            products,
            offer_codes,
        })
    }

    pub fn seller(&self) -> &Seller {
        &self.seller
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn offer_codes(&self) -> &[OfferCode] {
        &self.offer_codes
    }

    /// Finds a product by permalink.
    pub fn product(&self, permalink: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.unique_permalink == permalink)
    }

    /// Finds a live code by its exact string, regardless of applicability.
    pub fn find_live_code(&self, code: &str) -> Option<&OfferCode> {
        self.offer_codes
            .iter()
            .find(|c| c.is_alive() && c.code == code)
    }

    /// Finds a live code by id.
    pub fn live_code_by_id(&self, id: &str) -> Option<&OfferCode> {
        self.offer_codes.iter().find(|c| c.is_alive() && c.id == id)
    }

    /// Returns the resolver's view of a product.
    pub fn product_offers(&self, permalink: &str) -> Option<ProductOffers<'_>> {
        self.product(permalink).map(|product| ProductOffers {
            product,
            catalog: self,
        })
    }

    /// Whether the purchase form for this product shows the discount code
    /// field.
    ///
    /// True only when the seller chose "only if a discount is available"
    /// and some live code covers the product. Validity windows and usage
    /// limits are not consulted; the field only advertises that codes exist.
    pub fn shows_offer_code_field(&self, permalink: &str) -> bool {
        if !self.seller.display_offer_code_field {
            return false;
        }

        self.offer_codes
            .iter()
            .any(|c| c.is_alive() && c.applies_to(permalink))
    }
}

// =============================================================================
// Product View
// =============================================================================

/// A product together with the catalog it was loaded from.
#[derive(Debug, Clone, Copy)]
pub struct ProductOffers<'a> {
    product: &'a Product,
    catalog: &'a SellerCatalog,
}

impl<'a> ProductOffers<'a> {
    pub fn product(&self) -> &'a Product {
        self.product
    }
}

impl DiscountableProduct for ProductOffers<'_> {
    fn unique_permalink(&self) -> &str {
        &self.product.unique_permalink
    }

    fn price(&self) -> Money {
        self.product.price()
    }

    /// A default pointing at a deleted code counts as no default.
    fn default_offer_code(&self) -> Option<&OfferCode> {
        self.product
            .default_offer_code_id
            .as_deref()
            .and_then(|id| self.catalog.live_code_by_id(id))
    }

    fn find_offer_code(&self, code: &str) -> Option<&OfferCode> {
        let permalink = &self.product.unique_permalink;
        self.catalog
            .offer_codes
            .iter()
            .find(|c| c.is_alive() && c.code == code && c.applies_to(permalink))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Discount;
    use chrono::Utc;

    fn catalog(display_field: bool) -> SellerCatalog {
        let mut seller = Seller::new("Maya");
        seller.display_offer_code_field = display_field;

        let mut ebook = Product::new(&seller.id, "ebook", "Ebook", 1000);
        let course = Product::new(&seller.id, "course", "Course", 5000);

        let scoped = OfferCode::new(&seller.id, "EBOOK10", Discount::Percentage(10)).for_products(["ebook"]);
        let universal = OfferCode::new(&seller.id, "ALL5", Discount::Percentage(5)).universal();
        let mut deleted = OfferCode::new(&seller.id, "OLD", Discount::Percentage(50)).for_products(["ebook"]);
        deleted.deleted_at = Some(Utc::now());

        ebook.default_offer_code_id = Some(scoped.id.clone());

        SellerCatalog::new(seller, vec![ebook, course], vec![scoped, universal, deleted]).unwrap()
    }

    #[test]
    fn test_rejects_foreign_rows() {
        let seller = Seller::new("Maya");
        let foreign = Product::new("someone-else", "p", "P", 100);
        let err = SellerCatalog::new(seller.clone(), vec![foreign], vec![]).unwrap_err();
        assert!(matches!(err, CoreError::SellerMismatch { .. }));

        let foreign_code = OfferCode::new("someone-else", "X", Discount::Percentage(1));
        let err = SellerCatalog::new(seller, vec![], vec![foreign_code]).unwrap_err();
        assert!(matches!(err, CoreError::SellerMismatch { .. }));
    }

    #[test]
    fn test_find_offer_code_is_scoped_to_product() {
        let catalog = catalog(true);
        let ebook = catalog.product_offers("ebook").unwrap();
        let course = catalog.product_offers("course").unwrap();

        assert!(ebook.find_offer_code("EBOOK10").is_some());
        assert!(course.find_offer_code("EBOOK10").is_none());
        // seller-level lookup still sees it
        assert!(catalog.find_live_code("EBOOK10").is_some());

        assert!(ebook.find_offer_code("ALL5").is_some());
        assert!(course.find_offer_code("ALL5").is_some());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = catalog(true);
        let ebook = catalog.product_offers("ebook").unwrap();
        assert!(ebook.find_offer_code("ebook10").is_none());
    }

    #[test]
    fn test_deleted_codes_are_invisible() {
        let catalog = catalog(true);
        let ebook = catalog.product_offers("ebook").unwrap();
        assert!(ebook.find_offer_code("OLD").is_none());
        assert!(catalog.find_live_code("OLD").is_none());
    }

    #[test]
    fn test_default_offer_code() {
        let catalog = catalog(true);
        let ebook = catalog.product_offers("ebook").unwrap();
        assert_eq!(ebook.default_offer_code().map(|c| c.code.as_str()), Some("EBOOK10"));

        let course = catalog.product_offers("course").unwrap();
        assert!(course.default_offer_code().is_none());
    }

    #[test]
    fn test_shows_offer_code_field() {
        let shown = catalog(true);
        assert!(shown.shows_offer_code_field("ebook"));
        // universal code covers the course
        assert!(shown.shows_offer_code_field("course"));

        let hidden = catalog(false);
        assert!(!hidden.shows_offer_code_field("ebook"));
    }

    #[test]
    fn test_rejects_duplicate_live_codes() {
        let seller = Seller::new("Maya");
        let ebook = Product::new(&seller.id, "ebook", "Ebook", 1000);
        let course = Product::new(&seller.id, "course", "Course", 5000);
        let for_course = OfferCode::new(&seller.id, "DUP", Discount::Percentage(10)).for_products(["course"]);
        let for_ebook = OfferCode::new(&seller.id, "DUP", Discount::Percentage(30)).for_products(["ebook"]);

        let err = SellerCatalog::new(seller, vec![ebook, course], vec![for_course, for_ebook]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateOfferCode(ref code) if code == "DUP"));
    }

    #[test]
    fn test_deleted_code_frees_its_string() {
        let seller = Seller::new("Maya");
        let ebook = Product::new(&seller.id, "ebook", "Ebook", 1000);
        let mut old = OfferCode::new(&seller.id, "DUP", Discount::Percentage(10)).for_products(["ebook"]);
        old.deleted_at = Some(Utc::now());
        let current = OfferCode::new(&seller.id, "DUP", Discount::Percentage(30)).for_products(["ebook"]);

        let catalog = SellerCatalog::new(seller, vec![ebook], vec![old, current]).unwrap();
        let offers = catalog.product_offers("ebook").unwrap();
        let found = offers.find_offer_code("DUP").unwrap();
        assert_eq!(found.discount, Discount::Percentage(30));
        assert_eq!(catalog.find_live_code("DUP").map(|c| &c.id), Some(&found.id));
    }

    #[test]
    fn test_shows_offer_code_field_without_codes() {
        let mut seller = Seller::new("Maya");
        seller.display_offer_code_field = true;
        let product = Product::new(&seller.id, "ebook", "Ebook", 1000);
        let catalog = SellerCatalog::new(seller, vec![product], vec![]).unwrap();
        assert!(!catalog.shows_offer_code_field("ebook"));
    }
}
