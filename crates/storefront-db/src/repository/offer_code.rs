//! # Offer Code Repository
//!
//! Database operations for offer codes and their product scope.
//!
//! ## Storage Layout
//! ```text
//! offer_codes                           offer_code_products
//! ┌──────────────────────────────┐      ┌──────────────────────────┐
//! │ id, seller_id, code          │◄─────│ offer_code_id            │
//! │ discount_kind                │      │ product_id ──► products  │
//! │ amount_cents | amount_pct    │      └──────────────────────────┘
//! │ minimum_quantity             │
//! │ valid_at, expires_at         │      universal = 1 → no link rows
//! │ max_purchase_count           │      universal = 0 → one row per
//! │ times_used, universal        │                      scoped product
//! │ deleted_at                   │
//! └──────────────────────────────┘
//! ```
//!
//! A code string is unique among the seller's live codes only; a deleted
//! code frees its string for reuse.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use storefront_core::validation::{validate_offer_code, validate_quantity};
use storefront_core::{Discount, Money, OfferCode};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};

const TABLE: &str = "offer_codes";

const OFFER_CODE_COLUMNS: &str = r#"
    id, seller_id, code, discount_kind, amount_cents, amount_percentage,
    minimum_quantity, valid_at, expires_at, max_purchase_count, times_used,
    universal, deleted_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct OfferCodeRow {
    id: String,
    seller_id: String,
    code: String,
    discount_kind: String,
    amount_cents: Option<i64>,
    amount_percentage: Option<i64>,
    minimum_quantity: i64,
    valid_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    max_purchase_count: Option<i64>,
    times_used: i64,
    universal: bool,
    deleted_at: Option<DateTime<Utc>>,
}

impl OfferCodeRow {
    fn into_offer_code(self, product_permalinks: Vec<String>) -> DbResult<OfferCode> {
        let discount = match (self.discount_kind.as_str(), self.amount_cents, self.amount_percentage) {
            ("fixed", Some(cents), _) => Discount::Fixed(Money::from_cents(cents)),
            ("percentage", _, Some(pct)) => Discount::Percentage(self.counter("amount_percentage", pct)?),
            (kind, _, _) => {
                return Err(DbError::corrupt(
                    TABLE,
                    self.id.as_str(),
                    format!("unusable discount kind '{kind}'"),
                ))
            }
        };

        let minimum_quantity = self.counter("minimum_quantity", self.minimum_quantity)?;
        let times_used = self.counter("times_used", self.times_used)?;
        let max_purchase_count = self
            .max_purchase_count
            .map(|max| self.counter("max_purchase_count", max))
            .transpose()?;

        Ok(OfferCode {
            id: self.id,
            seller_id: self.seller_id,
            code: self.code,
            discount,
            minimum_quantity,
            valid_at: self.valid_at,
            expires_at: self.expires_at,
            max_purchase_count,
            times_used,
            universal: self.universal,
            product_permalinks,
            deleted_at: self.deleted_at,
        })
    }

    fn counter(&self, column: &str, value: i64) -> DbResult<u32> {
        u32::try_from(value)
            .map_err(|_| DbError::corrupt(TABLE, self.id.as_str(), format!("{column} out of range: {value}")))
    }
}

/// Discount columns as stored: `(kind, amount_cents, amount_percentage)`.
fn discount_columns(discount: &Discount) -> (&'static str, Option<i64>, Option<i64>) {
    match discount {
        Discount::Fixed(amount) => ("fixed", Some(amount.cents()), None),
        Discount::Percentage(pct) => ("percentage", None, Some(i64::from(*pct))),
    }
}

/// Repository for offer code database operations.
#[derive(Debug, Clone)]
pub struct OfferCodeRepository {
    pool: SqlitePool,
}

impl OfferCodeRepository {
    /// Creates a new OfferCodeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferCodeRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new offer code together with its product links.
    ///
    /// Scoped permalinks must name products of the same seller. The code row
    /// and its links are written in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - malformed code, discount or window
    /// * `Err(DbError::NotFound)` - a permalink is not one of the seller's products
    /// * `Err(DbError::UniqueViolation)` - the seller already has a live code with this string
    pub async fn insert(&self, offer: &OfferCode) -> DbResult<OfferCode> {
        debug!(code = %offer.code, seller_id = %offer.seller_id, "Inserting offer code");

        validate_offer_code(offer)?;

        let (kind, amount_cents, amount_percentage) = discount_columns(&offer.discount);

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO offer_codes (
                id, seller_id, code, discount_kind, amount_cents, amount_percentage,
                minimum_quantity, valid_at, expires_at, max_purchase_count, times_used,
                universal, deleted_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&offer.id)
        .bind(&offer.seller_id)
        .bind(&offer.code)
        .bind(kind)
        .bind(amount_cents)
        .bind(amount_percentage)
        .bind(i64::from(offer.minimum_quantity))
        .bind(offer.valid_at)
        .bind(offer.expires_at)
        .bind(offer.max_purchase_count.map(i64::from))
        .bind(i64::from(offer.times_used))
        .bind(offer.universal)
        .bind(offer.deleted_at)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, offer.code.as_str()),
            other => other,
        })?;

        if !offer.universal {
            for permalink in &offer.product_permalinks {
                let product_id: Option<String> = sqlx::query_scalar(
                    "SELECT id FROM products WHERE unique_permalink = ?1 AND seller_id = ?2",
                )
                .bind(permalink)
                .bind(&offer.seller_id)
                .fetch_optional(&mut *tx)
                .await?;

                // dropping `tx` rolls the code row back
                let product_id = product_id.ok_or_else(|| DbError::not_found("Product", permalink.as_str()))?;

                sqlx::query("INSERT OR IGNORE INTO offer_code_products (offer_code_id, product_id) VALUES (?1, ?2)")
                    .bind(&offer.id)
                    .bind(&product_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;

        info!(id = %offer.id, code = %offer.code, "Offer code created");
        Ok(offer.clone())
    }

    /// Soft-deletes a live offer code.
    ///
    /// Products that still reference it as their default fall back to having
    /// no default code at resolution time.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting offer code");

        let result = sqlx::query("UPDATE offer_codes SET deleted_at = ?2 WHERE id = ?1 AND deleted_at IS NULL")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("OfferCode", id));
        }

        Ok(())
    }

    /// Records `quantity` discounted units against the code's usage count.
    ///
    /// Returns `false` without changing anything when the code is deleted or
    /// the units would exceed `max_purchase_count`. The check and increment
    /// run as one statement, so concurrent checkouts cannot oversell.
    pub async fn record_use(&self, id: &str, quantity: u32) -> DbResult<bool> {
        validate_quantity(quantity)?;

        let result = sqlx::query(
            r#"
            UPDATE offer_codes SET times_used = times_used + ?2
            WHERE id = ?1
              AND deleted_at IS NULL
              AND (max_purchase_count IS NULL OR times_used + ?2 <= max_purchase_count)
            "#,
        )
        .bind(id)
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;

        let recorded = result.rows_affected() == 1;
        if !recorded {
            warn!(id = %id, quantity, "Offer code use not recorded");
        }

        Ok(recorded)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Finds a live code of the seller by its exact, case-sensitive string.
    pub async fn find_live_by_code(&self, seller_id: &str, code: &str) -> DbResult<Option<OfferCode>> {
        let sql = format!(
            "SELECT {OFFER_CODE_COLUMNS} FROM offer_codes \
             WHERE seller_id = ?1 AND code = ?2 AND deleted_at IS NULL"
        );

        let row = sqlx::query_as::<_, OfferCodeRow>(&sql)
            .bind(seller_id)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let permalinks: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT p.unique_permalink
            FROM offer_code_products ocp
            JOIN products p ON p.id = ocp.product_id
            WHERE ocp.offer_code_id = ?1
            ORDER BY p.unique_permalink
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        row.into_offer_code(permalinks).map(Some)
    }

    /// Lists every live code of the seller, ordered by code string.
    pub async fn list_live_for_seller(&self, seller_id: &str) -> DbResult<Vec<OfferCode>> {
        let sql = format!(
            "SELECT {OFFER_CODE_COLUMNS} FROM offer_codes \
             WHERE seller_id = ?1 AND deleted_at IS NULL ORDER BY code"
        );

        let rows = sqlx::query_as::<_, OfferCodeRow>(&sql)
            .bind(seller_id)
            .fetch_all(&self.pool)
            .await?;

        let links: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT ocp.offer_code_id, p.unique_permalink
            FROM offer_code_products ocp
            JOIN offer_codes oc ON oc.id = ocp.offer_code_id
            JOIN products p ON p.id = ocp.product_id
            WHERE oc.seller_id = ?1 AND oc.deleted_at IS NULL
            ORDER BY p.unique_permalink
            "#,
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        let mut permalinks: HashMap<String, Vec<String>> = HashMap::new();
        for (offer_code_id, permalink) in links {
            permalinks.entry(offer_code_id).or_default().push(permalink);
        }

        debug!(seller_id = %seller_id, count = rows.len(), "Listed live offer codes");

        rows.into_iter()
            .map(|row| {
                let scoped = permalinks.remove(&row.id).unwrap_or_default();
                row.into_offer_code(scoped)
            })
            .collect()
    }
}
