//! # Checkout Form Repository
//!
//! Reads and saves a seller's checkout form: the switches on the seller row
//! plus the ordered custom fields.
//!
//! ## Storage Layout
//! ```text
//! sellers                        custom_fields                  custom_field_products
//! ┌──────────────────────────┐   ┌────────────────────────┐     ┌─────────────────────┐
//! │ display_offer_code_field │   │ id, seller_id          │◄────│ custom_field_id     │
//! │ recommendation_type      │◄──│ field_type, name       │     │ product_id ──►      │
//! │ tipping_enabled          │   │ required, global       │     │   products          │
//! └──────────────────────────┘   │ collect_per_product    │     └─────────────────────┘
//!                                │ position               │
//!                                └────────────────────────┘
//! ```
//!
//! Saving replaces the whole field list in one transaction: submitted fields
//! are upserted in submission order and stored fields left out are deleted.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use storefront_core::{CheckoutForm, CheckoutFormUpdate, CoreError, CustomField, Seller};
use tracing::{debug, info};

use super::seller::{SellerRow, SELLER_COLUMNS};
use crate::error::{DbError, DbResult};

const TABLE: &str = "custom_fields";

#[derive(Debug, sqlx::FromRow)]
struct CustomFieldRow {
    id: String,
    seller_id: String,
    field_type: String,
    name: String,
    required: bool,
    global: bool,
    collect_per_product: bool,
}

impl CustomFieldRow {
    fn into_custom_field(self, product_permalinks: Vec<String>) -> DbResult<CustomField> {
        let field_type = self
            .field_type
            .parse()
            .map_err(|_| DbError::corrupt(TABLE, self.id.as_str(), format!("unknown field type '{}'", self.field_type)))?;

        Ok(CustomField {
            id: self.id,
            seller_id: self.seller_id,
            field_type,
            name: self.name,
            required: self.required,
            global: self.global,
            collect_per_product: self.collect_per_product,
            product_permalinks,
        })
    }
}

/// Repository for checkout form database operations.
#[derive(Debug, Clone)]
pub struct CheckoutFormRepository {
    pool: SqlitePool,
}

impl CheckoutFormRepository {
    /// Creates a new CheckoutFormRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutFormRepository { pool }
    }

    /// Loads the seller's checkout form.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such seller
    pub async fn get(&self, seller_id: &str) -> DbResult<CheckoutForm> {
        let row = sqlx::query_as::<_, SellerRow>(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?1"))
            .bind(seller_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Seller", seller_id))?;
        let seller = Seller::try_from(row)?;

        let rows = sqlx::query_as::<_, CustomFieldRow>(
            r#"
            SELECT id, seller_id, field_type, name, required, global, collect_per_product
            FROM custom_fields
            WHERE seller_id = ?1
            ORDER BY position
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        let links: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT cfp.custom_field_id, p.unique_permalink
            FROM custom_field_products cfp
            JOIN custom_fields cf ON cf.id = cfp.custom_field_id
            JOIN products p ON p.id = cfp.product_id
            WHERE cf.seller_id = ?1
            ORDER BY p.unique_permalink
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        let mut permalinks: HashMap<String, Vec<String>> = HashMap::new();
        for (field_id, permalink) in links {
            permalinks.entry(field_id).or_default().push(permalink);
        }

        let custom_fields = rows
            .into_iter()
            .map(|row| {
                let linked = permalinks.remove(&row.id).unwrap_or_default();
                row.into_custom_field(linked)
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(CheckoutForm {
            settings: seller.checkout_settings(),
            custom_fields,
        })
    }

    /// Saves a submitted checkout form and returns the stored result.
    ///
    /// Attributes left out of a submitted field keep their stored value;
    /// stored fields whose id is not submitted are deleted.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such seller, a submitted id is not one
    ///   of the seller's fields, or a permalink is not one of the seller's products
    /// * `Err(DbError::Validation)` - blank name, terms field without a URL,
    ///   or a non-global field without products
    pub async fn update(&self, seller_id: &str, update: &CheckoutFormUpdate) -> DbResult<CheckoutForm> {
        debug!(seller_id = %seller_id, fields = update.custom_fields.len(), "Saving checkout form");

        let current = self.get(seller_id).await?;
        let next = current.apply(seller_id, update).map_err(|e| match e {
            CoreError::CustomFieldNotFound(id) => DbError::not_found("CustomField", id),
            CoreError::Validation(v) => DbError::Validation(v),
            other => DbError::Domain(other),
        })?;
        let removed = current.removed_field_ids(&next);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE sellers SET
                display_offer_code_field = ?2,
                recommendation_type = ?3,
                tipping_enabled = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(seller_id)
        .bind(next.settings.display_offer_code_field)
        .bind(next.settings.recommendation_type.as_str())
        .bind(next.settings.tipping_enabled)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        for id in &removed {
            sqlx::query("DELETE FROM custom_fields WHERE id = ?1 AND seller_id = ?2")
                .bind(*id)
                .bind(seller_id)
                .execute(&mut *tx)
                .await?;
        }

        let now = Utc::now();
        for (position, field) in next.custom_fields.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO custom_fields (
                    id, seller_id, field_type, name, required, global,
                    collect_per_product, position, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                ON CONFLICT(id) DO UPDATE SET
                    field_type = excluded.field_type,
                    name = excluded.name,
                    required = excluded.required,
                    global = excluded.global,
                    collect_per_product = excluded.collect_per_product,
                    position = excluded.position
                "#,
            )
            .bind(&field.id)
            .bind(seller_id)
            .bind(field.field_type.as_str())
            .bind(&field.name)
            .bind(field.required)
            .bind(field.global)
            .bind(field.collect_per_product)
            .bind(i64::try_from(position).unwrap_or(i64::MAX))
            .bind(now)
            .execute(&mut *tx)
            .await?;

            sqlx::query("DELETE FROM custom_field_products WHERE custom_field_id = ?1")
                .bind(&field.id)
                .execute(&mut *tx)
                .await?;

            for permalink in &field.product_permalinks {
                let product_id: Option<String> = sqlx::query_scalar(
                    "SELECT id FROM products WHERE unique_permalink = ?1 AND seller_id = ?2",
                )
                .bind(permalink)
                .bind(seller_id)
                .fetch_optional(&mut *tx)
                .await?;

                let product_id = product_id.ok_or_else(|| DbError::not_found("Product", permalink.as_str()))?;

                sqlx::query("INSERT OR IGNORE INTO custom_field_products (custom_field_id, product_id) VALUES (?1, ?2)")
                    .bind(&field.id)
                    .bind(&product_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        info!(
            seller_id = %seller_id,
            fields = next.custom_fields.len(),
            removed = removed.len(),
            "Checkout form saved"
        );
        Ok(next)
    }
}
