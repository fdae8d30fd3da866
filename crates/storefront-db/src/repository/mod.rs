//! # Repository Module
//!
//! Database repository implementations for the storefront.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OfferResolutionService                                                │
//! │       │                                                                 │
//! │       │  db.products().get_by_permalink("ebook")                        │
//! │       │  db.sellers().get_by_id(seller_id)                              │
//! │       │  db.offer_codes().list_live_for_seller(seller_id)               │
//! │       ▼                                                                 │
//! │  Repositories ──► SQL ──► SQLite                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  storefront-core types (Seller, Product, OfferCode)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are decoded into private `*Row` structs and converted, so
//! storefront-core never depends on sqlx.
//!
//! ## Available Repositories
//!
//! - [`SellerRepository`](seller::SellerRepository) - Sellers and their checkout switches
//! - [`CheckoutFormRepository`](checkout_form::CheckoutFormRepository) - Checkout form settings and custom fields
//! - [`ProductRepository`](product::ProductRepository) - Products and their default code
//! - [`OfferCodeRepository`](offer_code::OfferCodeRepository) - Offer codes and product scope

pub mod checkout_form;
pub mod offer_code;
pub mod product;
pub mod seller;
