//! # storefront-db: Database Layer for Storefront Offers
//!
//! Persists sellers, checkout forms, products and offer codes in SQLite (via sqlx) and
//! answers "which discount applies to this checkout?" by loading a
//! [`storefront_core::SellerCatalog`] and handing it to the resolver.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Data Flow                               │
//! │                                                                         │
//! │  Checkout controller (permalink, ?code=, quantity)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Service    │  │   │
//! │  │   │   (pool.rs)   │◄───│ seller        │◄───│ OfferResolu- │  │   │
//! │  │   │ SqlitePool    │    │ product       │    │ tionService  │  │   │
//! │  │   │ + migrations  │    │ offer_code    │    │              │  │   │
//! │  │   │               │    │ checkout_form │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────┬───────┘  │   │
//! │  └────────────────────────────────────────────────────┼──────────┘   │
//! │                                                       ▼              │
//! │                               storefront-core: BestOfferCodeResolver │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Seller, product, offer code and checkout form repositories
//! - [`service`] - Offer code resolution over a loaded catalog
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("storefront.db")).await?;
//! let result = db.offer_resolution().best_offer_code("ebook", Some("SPRING"), None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StorefrontConfig};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use service::OfferResolutionService;

pub use repository::checkout_form::CheckoutFormRepository;
pub use repository::offer_code::OfferCodeRepository;
pub use repository::product::ProductRepository;
pub use repository::seller::SellerRepository;
