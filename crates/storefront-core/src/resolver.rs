//! # Best Offer Code Resolver
//!
//! Picks between the code in the checkout URL and the product's default
//! code.
//!
//! ## Decision Table
//! ```text
//! ┌─────────────┬──────────────┬──────────────────────────────────────────┐
//! │  URL code   │ Default code │ Result                                   │
//! ├─────────────┼──────────────┼──────────────────────────────────────────┤
//! │  blank      │ blank        │ None (no discount context)               │
//! │  invalid    │ invalid      │ URL code's error                         │
//! │  invalid    │ valid        │ default code                             │
//! │  valid      │ invalid      │ URL code                                 │
//! │  valid      │ valid        │ larger amount off; tie → default code    │
//! └─────────────┴──────────────┴──────────────────────────────────────────┘
//! ```
//!
//! Both precedence rules (URL error first, default wins ties) are product
//! policy and are covered by tests below.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::discount::{DiscountEngine, DiscountOutcome, LineItem, OfferErrorCode};
use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{Discount, OfferCode};

// =============================================================================
// Product Interface
// =============================================================================

/// What the resolver needs to know about a product.
pub trait DiscountableProduct {
    /// Identifier handed to the discount engine.
    fn unique_permalink(&self) -> &str;

    /// Base price used to compare discounts.
    fn price(&self) -> Money;

    /// Seller-configured code applied when the buyer brings none.
    fn default_offer_code(&self) -> Option<&OfferCode>;

    /// Looks up a code that covers this product, universal codes included.
    fn find_offer_code(&self, code: &str) -> Option<&OfferCode>;
}

// =============================================================================
// Resolution Result
// =============================================================================

/// Outcome for one candidate code, or the winner of the two.
///
/// Serializes to the mapping the checkout frontend reads:
/// `{"valid": true, "code": "...", "discount": {...}}` or
/// `{"valid": false, "error_code": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResolutionPayload", try_from = "ResolutionPayload")]
pub enum ResolutionResult {
    Valid { code: String, discount: Discount },
    Invalid { error_code: OfferErrorCode },
}

impl ResolutionResult {
    pub fn invalid(error_code: OfferErrorCode) -> Self {
        ResolutionResult::Invalid { error_code }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ResolutionResult::Valid { .. })
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ResolutionResult::Valid { code, .. } => Some(code),
            ResolutionResult::Invalid { .. } => None,
        }
    }

    pub fn discount(&self) -> Option<Discount> {
        match self {
            ResolutionResult::Valid { discount, .. } => Some(*discount),
            ResolutionResult::Invalid { .. } => None,
        }
    }

    pub fn error_code(&self) -> Option<OfferErrorCode> {
        match self {
            ResolutionResult::Valid { .. } => None,
            ResolutionResult::Invalid { error_code } => Some(*error_code),
        }
    }
}

/// Flat wire shape of [`ResolutionResult`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, rename = "ResolutionResult")]
pub struct ResolutionPayload {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error_code: Option<OfferErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub discount: Option<Discount>,
}

impl From<ResolutionResult> for ResolutionPayload {
    fn from(result: ResolutionResult) -> Self {
        match result {
            ResolutionResult::Valid { code, discount } => ResolutionPayload {
                valid: true,
                error_code: None,
                code: Some(code),
                discount: Some(discount),
            },
            ResolutionResult::Invalid { error_code } => ResolutionPayload {
                valid: false,
                error_code: Some(error_code),
                code: None,
                discount: None,
            },
        }
    }
}

impl TryFrom<ResolutionPayload> for ResolutionResult {
    type Error = ValidationError;

    fn try_from(payload: ResolutionPayload) -> Result<Self, Self::Error> {
        let required = |field: &str| ValidationError::Required {
            field: field.to_string(),
        };

        if payload.valid {
            Ok(ResolutionResult::Valid {
                code: payload.code.ok_or_else(|| required("code"))?,
                discount: payload.discount.ok_or_else(|| required("discount"))?,
            })
        } else {
            Ok(ResolutionResult::Invalid {
                error_code: payload.error_code.ok_or_else(|| required("error_code"))?,
            })
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Arbitrates between the URL code and the product's default code.
///
/// Stateless apart from the engine; a resolver can be reused across
/// products and requests.
#[derive(Debug, Clone)]
pub struct BestOfferCodeResolver<E> {
    engine: E,
}

impl<E: DiscountEngine> BestOfferCodeResolver<E> {
    pub fn new(engine: E) -> Self {
        BestOfferCodeResolver { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns the better of the two candidate codes.
    ///
    /// `Ok(None)` means neither a URL code nor a default code exists.
    /// Expired, unknown or sold-out codes come back as
    /// [`ResolutionResult::Invalid`]; only engine failures are `Err`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::Utc;
    /// use storefront_core::{
    ///     BestOfferCodeResolver, Discount, Money, OfferCode, OfferCodeDiscountComputer,
    ///     Product, Seller, SellerCatalog,
    /// };
    ///
    /// let seller = Seller::new("Maya");
    /// let mut product = Product::new(&seller.id, "ebook", "Ebook", 1000);
    /// let url = OfferCode::new(&seller.id, "URL", Discount::Fixed(Money::from_cents(400))).for_products(["ebook"]);
    /// let default = OfferCode::new(&seller.id, "DEFAULT", Discount::Percentage(20)).for_products(["ebook"]);
    /// product.default_offer_code_id = Some(default.id.clone());
    /// let catalog = SellerCatalog::new(seller, vec![product], vec![url, default]).unwrap();
    ///
    /// let resolver = BestOfferCodeResolver::new(OfferCodeDiscountComputer::new(&catalog, Utc::now()));
    /// let offers = catalog.product_offers("ebook").unwrap();
    /// let result = resolver.resolve(&offers, Some("URL"), 1).unwrap().unwrap();
    /// assert_eq!(result.code(), Some("URL"));
    /// ```
    pub fn resolve<P>(
        &self,
        product: &P,
        url_code: Option<&str>,
        quantity: u32,
    ) -> Result<Option<ResolutionResult>, E::Error>
    where
        P: DiscountableProduct + ?Sized,
    {
        let url_code = present(url_code);
        let default_code = present(product.default_offer_code().map(|c| c.code.as_str()));

        if url_code.is_none() && default_code.is_none() {
            return Ok(None);
        }

        let url_result = self.evaluate(product, url_code, quantity)?;
        let default_result = self.evaluate(product, default_code, quantity)?;

        debug!(
            permalink = %product.unique_permalink(),
            url = ?url_result,
            default = ?default_result,
            "Evaluated offer code candidates"
        );

        let chosen = match (url_result.is_valid(), default_result.is_valid()) {
            (false, false) | (true, false) => url_result,
            (false, true) => default_result,
            (true, true) => {
                let url_amount = self.comparison_amount(product, url_code);
                let default_amount = self.comparison_amount(product, default_code);

                debug!(
                    url_amount = url_amount.cents(),
                    default_amount = default_amount.cents(),
                    "Comparing valid offer codes"
                );

                // strictly greater: ties go to the default code
                if url_amount > default_amount {
                    url_result
                } else {
                    default_result
                }
            }
        };

        Ok(Some(chosen))
    }

    /// Validates one candidate slot on its own.
    fn evaluate<P>(
        &self,
        product: &P,
        code: Option<&str>,
        quantity: u32,
    ) -> Result<ResolutionResult, E::Error>
    where
        P: DiscountableProduct + ?Sized,
    {
        let Some(code) = code else {
            return Ok(ResolutionResult::invalid(OfferErrorCode::MissingCode));
        };

        let Some(offer) = product.find_offer_code(code) else {
            return Ok(ResolutionResult::invalid(OfferErrorCode::InvalidOffer));
        };

        let item = LineItem::new(product.unique_permalink(), offer.effective_quantity(quantity));

        let result = match self.engine.compute(code, std::slice::from_ref(&item))? {
            DiscountOutcome::Rejected(error_code) => ResolutionResult::invalid(error_code),
            DiscountOutcome::Applied(discount) => ResolutionResult::Valid {
                code: code.to_string(),
                discount,
            },
        };

        Ok(result)
    }

    /// Amount off used for comparison; a code that no longer resolves
    /// counts as zero.
    fn comparison_amount<P>(&self, product: &P, code: Option<&str>) -> Money
    where
        P: DiscountableProduct + ?Sized,
    {
        code.and_then(|c| product.find_offer_code(c))
            .map(|offer| self.engine.amount_off(offer, product.price()))
            .unwrap_or_default()
    }
}

/// Treats absent, empty and whitespace-only codes alike.
fn present(code: Option<&str>) -> Option<&str> {
    code.filter(|c| !c.trim().is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SellerCatalog;
    use crate::discount::OfferCodeDiscountComputer;
    use crate::error::CoreError;
    use crate::types::{Product, Seller};
    use chrono::{DateTime, Duration, Utc};
    use std::cell::RefCell;

    // -------------------------------------------------------------------------
    // Fixtures
    // -------------------------------------------------------------------------

    /// A seller with one $10.00 product ("ebook") and one other product.
    struct Shop {
        seller: Seller,
        product: Product,
        other: Product,
        codes: Vec<OfferCode>,
        now: DateTime<Utc>,
    }

    impl Shop {
        fn new() -> Self {
            let seller = Seller::new("Maya");
            let product = Product::new(&seller.id, "ebook", "Ebook", 1000);
            let other = Product::new(&seller.id, "course", "Course", 1000);
            Shop {
                seller,
                product,
                other,
                codes: Vec::new(),
                now: Utc::now(),
            }
        }

        fn fixed(&self, code: &str, cents: i64) -> OfferCode {
            OfferCode::new(&self.seller.id, code, Discount::Fixed(Money::from_cents(cents)))
                .for_products(["ebook"])
        }

        fn percent(&self, code: &str, percent: u32) -> OfferCode {
            OfferCode::new(&self.seller.id, code, Discount::Percentage(percent)).for_products(["ebook"])
        }

        fn add(mut self, code: OfferCode) -> Self {
            self.codes.push(code);
            self
        }

        fn with_default(mut self, code: OfferCode) -> Self {
            self.product.default_offer_code_id = Some(code.id.clone());
            self.codes.push(code);
            self
        }

        fn resolve(self, url_code: Option<&str>, quantity: u32) -> Option<ResolutionResult> {
            let catalog =
                SellerCatalog::new(self.seller, vec![self.product, self.other], self.codes).unwrap();
            let resolver = BestOfferCodeResolver::new(OfferCodeDiscountComputer::new(&catalog, self.now));
            let offers = catalog.product_offers("ebook").unwrap();
            resolver.resolve(&offers, url_code, quantity).unwrap()
        }
    }

    fn code_of(result: &Option<ResolutionResult>) -> Option<&str> {
        result.as_ref().and_then(|r| r.code())
    }

    // -------------------------------------------------------------------------
    // Blank handling
    // -------------------------------------------------------------------------

    #[test]
    fn test_both_blank_returns_none() {
        assert_eq!(Shop::new().resolve(None, 1), None);
        assert_eq!(Shop::new().resolve(Some(""), 1), None);
        assert_eq!(Shop::new().resolve(Some("   "), 1), None);
    }

    #[test]
    fn test_only_url_code_valid() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 200);
        let result = shop.add(url).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("URL10"));
        assert!(result.unwrap().is_valid());
    }

    #[test]
    fn test_only_url_code_unknown() {
        let result = Shop::new().resolve(Some("INVALID"), 1);
        assert_eq!(result, Some(ResolutionResult::invalid(OfferErrorCode::InvalidOffer)));
    }

    #[test]
    fn test_only_default_code_valid() {
        let shop = Shop::new();
        let default = shop.fixed("DEFAULT10", 200);
        let result = shop.with_default(default).resolve(None, 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_blank_url_code_falls_back_to_default() {
        let shop = Shop::new();
        let default = shop.fixed("DEFAULT10", 200);
        let result = shop.with_default(default).resolve(Some("  "), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_deleted_default_counts_as_blank() {
        let shop = Shop::new();
        let mut default = shop.fixed("DEFAULT10", 200);
        default.deleted_at = Some(Utc::now());
        assert_eq!(shop.with_default(default).resolve(None, 1), None);
    }

    // -------------------------------------------------------------------------
    // Comparison
    // -------------------------------------------------------------------------

    #[test]
    fn test_url_fixed_beats_default_percentage() {
        // 400 > 20% of 1000
        let shop = Shop::new();
        let (url, default) = (shop.fixed("URL", 400), shop.percent("DEFAULT", 20));
        let result = shop.add(url).with_default(default).resolve(Some("URL"), 1);
        assert_eq!(code_of(&result), Some("URL"));
    }

    #[test]
    fn test_default_fixed_beats_url_fixed() {
        let shop = Shop::new();
        let (url, default) = (shop.fixed("URL", 200), shop.fixed("DEFAULT", 400));
        let result = shop.add(url).with_default(default).resolve(Some("URL"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT"));
    }

    #[test]
    fn test_url_percentage_beats_default_fixed() {
        // 30% of 1000 = 300 > 200
        let shop = Shop::new();
        let (url, default) = (shop.percent("URL30", 30), shop.fixed("DEFAULT", 200));
        let result = shop.add(url).with_default(default).resolve(Some("URL30"), 1);
        assert_eq!(code_of(&result), Some("URL30"));
    }

    #[test]
    fn test_default_percentage_beats_url_percentage() {
        let shop = Shop::new();
        let (url, default) = (shop.percent("URL20", 20), shop.percent("DEFAULT30", 30));
        let result = shop.add(url).with_default(default).resolve(Some("URL20"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT30"));
    }

    #[test]
    fn test_fixed_beats_percentage_when_larger() {
        // 400 > 30% of 1000
        let shop = Shop::new();
        let (url, default) = (shop.fixed("URL_FIXED", 400), shop.percent("DEFAULT_PERCENT", 30));
        let result = shop.add(url).with_default(default).resolve(Some("URL_FIXED"), 1);
        assert_eq!(code_of(&result), Some("URL_FIXED"));
    }

    #[test]
    fn test_tie_goes_to_default() {
        let shop = Shop::new();
        let (url, default) = (shop.fixed("URL10", 200), shop.fixed("DEFAULT10", 200));
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_tie_across_kinds_goes_to_default() {
        // 20% of 1000 == 200 fixed
        let shop = Shop::new();
        let (url, default) = (shop.percent("URL20", 20), shop.fixed("DEFAULT", 200));
        let result = shop.add(url).with_default(default).resolve(Some("URL20"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT"));
    }

    #[test]
    fn test_valid_result_carries_discount() {
        let shop = Shop::new();
        let url = shop.percent("URL30", 30);
        let result = shop.add(url).resolve(Some("URL30"), 1).unwrap();
        assert_eq!(result.discount(), Some(Discount::Percentage(30)));
    }

    // -------------------------------------------------------------------------
    // Invalid candidates
    // -------------------------------------------------------------------------

    #[test]
    fn test_unknown_url_code_falls_back_to_default() {
        let shop = Shop::new();
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.with_default(default).resolve(Some("INVALID"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_both_invalid_prefers_url_error() {
        let shop = Shop::new();
        let default = shop.fixed("DEFAULT10", 300).max_purchase_count(0);
        let result = shop.with_default(default).resolve(Some("INVALID1"), 1);
        // default is sold out, but the URL code's error is reported
        assert_eq!(result, Some(ResolutionResult::invalid(OfferErrorCode::InvalidOffer)));
    }

    #[test]
    fn test_blank_url_and_invalid_default_reports_missing_code() {
        let shop = Shop::new();
        let default = shop.fixed("DEFAULT10", 300).max_purchase_count(0);
        let result = shop.with_default(default).resolve(None, 1);
        assert_eq!(result, Some(ResolutionResult::invalid(OfferErrorCode::MissingCode)));
    }

    #[test]
    fn test_inactive_url_code_falls_back() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 500).valid_between(Some(shop.now + Duration::days(1)), None);
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_expired_url_code_falls_back() {
        let shop = Shop::new();
        let url = shop
            .fixed("URL10", 500)
            .valid_between(Some(shop.now - Duration::days(2)), Some(shop.now - Duration::days(1)));
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_expired_url_code_alone_reports_engine_code() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 500).valid_between(None, Some(shop.now - Duration::days(1)));
        let result = shop.add(url).resolve(Some("URL10"), 1);
        assert_eq!(result, Some(ResolutionResult::invalid(OfferErrorCode::Expired)));
    }

    #[test]
    fn test_sold_out_url_code_falls_back() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 500).max_purchase_count(0);
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_code_for_other_product_falls_back() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 500).for_products(["course"]);
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    // -------------------------------------------------------------------------
    // Universal codes
    // -------------------------------------------------------------------------

    #[test]
    fn test_universal_url_code_better() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 400).universal();
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("URL10"));
    }

    #[test]
    fn test_universal_url_code_worse() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 200).universal();
        let default = shop.fixed("DEFAULT10", 300);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    // -------------------------------------------------------------------------
    // Quantity
    // -------------------------------------------------------------------------

    #[test]
    fn test_quantity_meeting_minimum() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 400).minimum_quantity(2);
        let default = shop.fixed("DEFAULT10", 300).minimum_quantity(1);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 2);
        assert_eq!(code_of(&result), Some("URL10"));
    }

    #[test]
    fn test_quantity_below_minimum_prefers_better_default() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 200).minimum_quantity(2);
        let default = shop.fixed("DEFAULT10", 300).minimum_quantity(1);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    #[test]
    fn test_minimum_quantity_raises_evaluated_quantity() {
        // Two uses left, minimum of three: evaluated at 3, not at 1.
        let shop = Shop::new();
        let url = shop.fixed("URL10", 400).minimum_quantity(3).max_purchase_count(2);
        let result = shop.add(url).resolve(Some("URL10"), 1);
        assert_eq!(
            result,
            Some(ResolutionResult::invalid(OfferErrorCode::InsufficientTimesOfUse))
        );
    }

    #[test]
    fn test_quantity_error_falls_back_to_default() {
        let shop = Shop::new();
        let url = shop.fixed("URL10", 400).minimum_quantity(3).max_purchase_count(2);
        let default = shop.fixed("DEFAULT10", 100);
        let result = shop.add(url).with_default(default).resolve(Some("URL10"), 1);
        assert_eq!(code_of(&result), Some("DEFAULT10"));
    }

    // -------------------------------------------------------------------------
    // Engine seam
    // -------------------------------------------------------------------------

    struct FakeProduct {
        codes: Vec<OfferCode>,
        default: Option<usize>,
    }

    impl DiscountableProduct for FakeProduct {
        fn unique_permalink(&self) -> &str {
            "fake"
        }

        fn price(&self) -> Money {
            Money::from_cents(1000)
        }

        fn default_offer_code(&self) -> Option<&OfferCode> {
            self.default.map(|i| &self.codes[i])
        }

        fn find_offer_code(&self, code: &str) -> Option<&OfferCode> {
            self.codes.iter().find(|c| c.code == code)
        }
    }

    /// Applies every code and records the quantities it was asked about.
    #[derive(Default)]
    struct RecordingEngine {
        seen: RefCell<Vec<(String, u32)>>,
    }

    impl DiscountEngine for RecordingEngine {
        type Error = CoreError;

        fn compute(&self, code: &str, items: &[LineItem]) -> Result<DiscountOutcome, CoreError> {
            self.seen
                .borrow_mut()
                .push((code.to_string(), items[0].quantity));
            Ok(DiscountOutcome::Applied(Discount::Percentage(10)))
        }
    }

    struct FailingEngine;

    impl DiscountEngine for FailingEngine {
        type Error = CoreError;

        fn compute(&self, _code: &str, items: &[LineItem]) -> Result<DiscountOutcome, CoreError> {
            Err(CoreError::ProductNotFound(items[0].permalink.clone()))
        }
    }

    fn fake_product() -> FakeProduct {
        FakeProduct {
            codes: vec![
                OfferCode::new("s", "URL", Discount::Percentage(10)).minimum_quantity(4),
                OfferCode::new("s", "DEFAULT", Discount::Percentage(10)),
            ],
            default: Some(1),
        }
    }

    #[test]
    fn test_engine_receives_effective_quantity() {
        let resolver = BestOfferCodeResolver::new(RecordingEngine::default());
        resolver.resolve(&fake_product(), Some("URL"), 1).unwrap();

        let seen = resolver.engine().seen.borrow().clone();
        assert_eq!(
            seen,
            vec![("URL".to_string(), 4), ("DEFAULT".to_string(), 1)]
        );
    }

    #[test]
    fn test_unknown_code_skips_engine() {
        let resolver = BestOfferCodeResolver::new(RecordingEngine::default());
        let product = FakeProduct {
            default: None,
            ..fake_product()
        };
        let result = resolver.resolve(&product, Some("NOPE"), 1).unwrap();
        assert_eq!(result, Some(ResolutionResult::invalid(OfferErrorCode::InvalidOffer)));
        assert!(resolver.engine().seen.borrow().is_empty());
    }

    #[test]
    fn test_engine_failure_propagates() {
        let resolver = BestOfferCodeResolver::new(FailingEngine);
        let err = resolver.resolve(&fake_product(), Some("URL"), 1).unwrap_err();
        assert!(matches!(err, CoreError::ProductNotFound(p) if p == "fake"));
    }

    #[test]
    fn test_no_candidates_skips_engine() {
        let resolver = BestOfferCodeResolver::new(FailingEngine);
        let product = FakeProduct {
            codes: Vec::new(),
            default: None,
        };
        assert_eq!(resolver.resolve(&product, None, 1).unwrap(), None);
    }

    // -------------------------------------------------------------------------
    // Wire format
    // -------------------------------------------------------------------------

    #[test]
    fn test_serializes_to_checkout_mapping() {
        let valid = ResolutionResult::Valid {
            code: "URL10".to_string(),
            discount: Discount::Fixed(Money::from_cents(200)),
        };
        assert_eq!(
            serde_json::to_value(&valid).unwrap(),
            serde_json::json!({
                "valid": true,
                "code": "URL10",
                "discount": {"kind": "fixed", "amount": 200}
            })
        );

        let invalid = ResolutionResult::invalid(OfferErrorCode::InvalidOffer);
        assert_eq!(
            serde_json::to_value(&invalid).unwrap(),
            serde_json::json!({"valid": false, "error_code": "invalid_offer"})
        );
    }

    #[test]
    fn test_deserialize_rejects_incomplete_mapping() {
        let parsed: ResolutionResult =
            serde_json::from_str(r#"{"valid": false, "error_code": "sold_out"}"#).unwrap();
        assert_eq!(parsed.error_code(), Some(OfferErrorCode::SoldOut));

        let missing = serde_json::from_str::<ResolutionResult>(r#"{"valid": true, "code": "X"}"#);
        assert!(missing.is_err());
    }
}
