use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use std::str::FromStr;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::models::LocalProduct;
use crate::utils::error::{AppError, Result};

/// Boundary to the local catalog store. The reconciler only ever lists the
/// matchable records and issues one targeted price write per record id.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Records carrying a usable product link or display name.
    async fn select_linked_records(&self) -> Result<Vec<LocalProduct>>;

    /// Single-record price write. The timestamp is set in the same statement,
    /// so it lands if and only if the price does.
    async fn update_price(&self, id: i64, price: Decimal, updated_at: DateTime<Utc>)
    -> Result<()>;
}

pub struct SqliteCatalogStore {
    pool: SqlitePool,
}

impl SqliteCatalogStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the products table when it does not exist yet. Prices are kept
    /// as TEXT; SQLite has no decimal type and float columns would reintroduce
    /// the rounding the Decimal type exists to avoid.
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                display_name TEXT,
                product_link TEXT,
                current_price TEXT,
                last_updated_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn row_to_product(row: &SqliteRow) -> std::result::Result<LocalProduct, sqlx::Error> {
        let price_text: Option<String> = row.try_get("current_price")?;
        Ok(LocalProduct {
            id: row.try_get("id")?,
            display_name: row.try_get("display_name")?,
            product_link: row.try_get("product_link")?,
            current_price: price_text.as_deref().and_then(|s| Decimal::from_str(s).ok()),
            last_updated_at: row.try_get("last_updated_at")?,
        })
    }
}

#[async_trait]
impl PriceStore for SqliteCatalogStore {
    async fn select_linked_records(&self) -> Result<Vec<LocalProduct>> {
        let rows = sqlx::query(
            r#"
            SELECT id, display_name, product_link, current_price, last_updated_at
            FROM products
            WHERE (product_link IS NOT NULL AND TRIM(product_link) != '')
               OR (display_name IS NOT NULL AND TRIM(display_name) != '')
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Self::row_to_product(row).map_err(AppError::from))
            .collect()
    }

    async fn update_price(
        &self,
        id: i64,
        price: Decimal,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE products SET current_price = ?1, last_updated_at = ?2 WHERE id = ?3",
        )
        .bind(price.to_string())
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::UpdateRejected { id });
        }
        Ok(())
    }
}
