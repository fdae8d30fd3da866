//! # Seller Repository
//!
//! Sellers and the checkout form switches stored on their row. Custom
//! fields live in [`CheckoutFormRepository`](super::checkout_form::CheckoutFormRepository).

use chrono::Utc;
use sqlx::SqlitePool;
use storefront_core::Seller;
use tracing::debug;

use crate::error::{DbError, DbResult};

pub(crate) const SELLER_COLUMNS: &str = "id, name, display_offer_code_field, recommendation_type, tipping_enabled";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SellerRow {
    id: String,
    name: String,
    display_offer_code_field: bool,
    recommendation_type: String,
    tipping_enabled: bool,
}

impl TryFrom<SellerRow> for Seller {
    type Error = DbError;

    fn try_from(row: SellerRow) -> DbResult<Self> {
        let recommendation_type = row
            .recommendation_type
            .parse()
            .map_err(|_| DbError::corrupt("sellers", row.id.as_str(), format!("unknown recommendation type '{}'", row.recommendation_type)))?;

        Ok(Seller {
            id: row.id,
            name: row.name,
            display_offer_code_field: row.display_offer_code_field,
            recommendation_type,
            tipping_enabled: row.tipping_enabled,
        })
    }
}

/// Repository for seller database operations.
#[derive(Debug, Clone)]
pub struct SellerRepository {
    pool: SqlitePool,
}

impl SellerRepository {
    /// Creates a new SellerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SellerRepository { pool }
    }

    /// Inserts a new seller.
    pub async fn insert(&self, seller: &Seller) -> DbResult<Seller> {
        debug!(id = %seller.id, "Inserting seller");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO sellers (
                id, name, display_offer_code_field, recommendation_type, tipping_enabled,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&seller.id)
        .bind(&seller.name)
        .bind(seller.display_offer_code_field)
        .bind(seller.recommendation_type.as_str())
        .bind(seller.tipping_enabled)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(seller.clone())
    }

    /// Gets a seller by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Seller>> {
        let row = sqlx::query_as::<_, SellerRow>(&format!("SELECT {SELLER_COLUMNS} FROM sellers WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Seller::try_from).transpose()
    }
}
