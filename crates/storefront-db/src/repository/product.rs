//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by public permalink (checkout entry point)
//! - Listing a seller's catalog
//! - Assigning the default offer code
//!
//! ## Default Code Rules
//! ```text
//! set_default_offer_code(product, Some(code))
//!      │
//!      ├── product missing?                  → NotFound(Product)
//!      ├── code missing or deleted?          → NotFound(OfferCode)
//!      ├── code owned by another seller?     → NotFound(OfferCode)
//!      └── saved
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use storefront_core::validation::{validate_code_string, validate_price_cents};
use storefront_core::Product;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    seller_id: String,
    unique_permalink: String,
    name: String,
    price_cents: i64,
    default_offer_code_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            seller_id: row.seller_id,
            unique_permalink: row.unique_permalink,
            name: row.name,
            price_cents: row.price_cents,
            default_offer_code_id: row.default_offer_code_id,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, seller_id, unique_permalink, name, price_cents, default_offer_code_id, created_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// Permalinks follow the same character rules as offer codes.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - permalink already taken
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(permalink = %product.unique_permalink, "Inserting product");

        validate_code_string(&product.unique_permalink)?;
        validate_price_cents(product.price_cents)?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, seller_id, unique_permalink, name,
                price_cents, default_offer_code_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&product.id)
        .bind(&product.seller_id)
        .bind(&product.unique_permalink)
        .bind(&product.name)
        .bind(product.price_cents)
        .bind(&product.default_offer_code_id)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Gets a product by its public permalink.
    pub async fn get_by_permalink(&self, permalink: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE unique_permalink = ?1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(permalink)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Lists every product of a seller, ordered by name.
    pub async fn list_for_seller(&self, seller_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = ?1 ORDER BY name");

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(seller_id = %seller_id, count = rows.len(), "Listed seller products");
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Sets or clears the product's default offer code.
    ///
    /// The code must be live and belong to the product's seller.
    pub async fn set_default_offer_code(&self, product_id: &str, offer_code_id: Option<&str>) -> DbResult<()> {
        debug!(product_id = %product_id, offer_code_id = ?offer_code_id, "Setting default offer code");

        let product = self
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", product_id))?;

        if let Some(code_id) = offer_code_id {
            let owner: Option<String> = sqlx::query_scalar(
                "SELECT seller_id FROM offer_codes WHERE id = ?1 AND deleted_at IS NULL",
            )
            .bind(code_id)
            .fetch_optional(&self.pool)
            .await?;

            if owner.as_deref() != Some(product.seller_id.as_str()) {
                return Err(DbError::not_found("OfferCode", code_id));
            }
        }

        sqlx::query("UPDATE products SET default_offer_code_id = ?2 WHERE id = ?1")
            .bind(product_id)
            .bind(offer_code_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::{Discount, OfferCode, Product, Seller};

    use crate::error::DbError;
    use crate::repository::fixtures;

    #[tokio::test]
    async fn test_get_by_permalink() {
        let (db, _, ebook, _) = fixtures::shop().await;
        let loaded = db.products().get_by_permalink("ebook").await.unwrap().unwrap();
        assert_eq!(loaded.id, ebook.id);
        assert_eq!(loaded.price_cents, 1000);
        assert!(db.products().get_by_permalink("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_for_seller() {
        let (db, seller, _, _) = fixtures::shop().await;
        let products = db.products().list_for_seller(&seller.id).await.unwrap();
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Course", "Ebook"]);
    }

    #[tokio::test]
    async fn test_duplicate_permalink_rejected() {
        let (db, seller, _, _) = fixtures::shop().await;
        let err = db
            .products()
            .insert(&Product::new(&seller.id, "ebook", "Another", 100))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_price_rejected() {
        let (db, seller, _, _) = fixtures::shop().await;
        let err = db
            .products()
            .insert(&Product::new(&seller.id, "free", "Free", -1))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_set_and_clear_default_offer_code() {
        let (db, seller, ebook, _) = fixtures::shop().await;
        let code = db
            .offer_codes()
            .insert(&OfferCode::new(&seller.id, "DEFAULT", Discount::Percentage(10)).for_products(["ebook"]))
            .await
            .unwrap();

        db.products().set_default_offer_code(&ebook.id, Some(&code.id)).await.unwrap();
        let loaded = db.products().get_by_id(&ebook.id).await.unwrap().unwrap();
        assert_eq!(loaded.default_offer_code_id.as_deref(), Some(code.id.as_str()));

        db.products().set_default_offer_code(&ebook.id, None).await.unwrap();
        let loaded = db.products().get_by_id(&ebook.id).await.unwrap().unwrap();
        assert!(loaded.default_offer_code_id.is_none());
    }

    #[tokio::test]
    async fn test_default_offer_code_from_other_seller_rejected() {
        let (db, _, ebook, _) = fixtures::shop().await;
        let other = db.sellers().insert(&Seller::new("Other")).await.unwrap();
        db.products()
            .insert(&Product::new(&other.id, "other-ebook", "Other Ebook", 1000))
            .await
            .unwrap();
        let foreign = db
            .offer_codes()
            .insert(&OfferCode::new(&other.id, "THEIRS", Discount::Percentage(10)).for_products(["other-ebook"]))
            .await
            .unwrap();

        let err = db
            .products()
            .set_default_offer_code(&ebook.id, Some(&foreign.id))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "OfferCode"));
    }
}
