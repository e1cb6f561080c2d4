use crate::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use core_types::{CoreError, Holding};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::sqlite::SqlitePool;

/// Descriptive metadata stored alongside a holding. None of it affects valuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingDetails {
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub region: Option<String>,
}

/// This struct represents a row fetched from the holdings table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DbHolding {
    pub symbol: String,
    pub quantity: i64,
    pub name: Option<String>,
    pub asset_type: Option<String>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbHolding {
    /// Converts the row into the validated domain type used by the valuation engine.
    pub fn to_holding(&self) -> Result<Holding, DbError> {
        let quantity = u64::try_from(self.quantity).map_err(|_| {
            CoreError::InvalidInput(
                "quantity".to_string(),
                format!("stored quantity {} for {} is negative", self.quantity, self.symbol),
            )
        })?;
        Ok(Holding::new(&self.symbol, quantity)?)
    }
}

/// The create/list/update/delete contract for owned holdings.
#[async_trait]
pub trait HoldingsStore: Send + Sync {
    /// Inserts a holding, replacing quantity and details if the symbol already exists.
    async fn upsert_holding(
        &self,
        holding: &Holding,
        details: &HoldingDetails,
    ) -> Result<DbHolding, DbError>;

    /// All holdings, ordered by symbol.
    async fn list_holdings(&self) -> Result<Vec<DbHolding>, DbError>;

    async fn get_holding(&self, symbol: &str) -> Result<Option<DbHolding>, DbError>;

    /// Fails with `NotFound` if the symbol is not held.
    async fn update_quantity(&self, symbol: &str, quantity: u64) -> Result<DbHolding, DbError>;

    /// Fails with `NotFound` if the symbol is not held.
    async fn delete_holding(&self, symbol: &str) -> Result<(), DbError>;

    /// The current holdings as validated domain values, ready for a valuation run.
    async fn current_holdings(&self) -> Result<Vec<Holding>, DbError> {
        self.list_holdings()
            .await?
            .iter()
            .map(DbHolding::to_holding)
            .collect()
    }
}

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: SqlitePool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn quantity_param(holding: &Holding) -> Result<i64, DbError> {
    i64::try_from(holding.quantity).map_err(|_| {
        DbError::InvalidHolding(CoreError::InvalidInput(
            "quantity".to_string(),
            format!("{} is too large to store", holding.quantity),
        ))
    })
}

#[async_trait]
impl HoldingsStore for DbRepository {
    async fn upsert_holding(
        &self,
        holding: &Holding,
        details: &HoldingDetails,
    ) -> Result<DbHolding, DbError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, DbHolding>(
            r#"
            INSERT INTO holdings (symbol, quantity, name, asset_type, region, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(symbol) DO UPDATE SET
                quantity = excluded.quantity,
                name = excluded.name,
                asset_type = excluded.asset_type,
                region = excluded.region,
                updated_at = excluded.updated_at
            RETURNING symbol, quantity, name, asset_type, region, created_at, updated_at
            "#,
        )
        .bind(normalize_symbol(&holding.symbol))
        .bind(quantity_param(holding)?)
        .bind(&details.name)
        .bind(&details.asset_type)
        .bind(&details.region)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(symbol = %row.symbol, quantity = row.quantity, "Holding saved");
        Ok(row)
    }

    async fn list_holdings(&self) -> Result<Vec<DbHolding>, DbError> {
        let rows = sqlx::query_as::<_, DbHolding>(
            "SELECT symbol, quantity, name, asset_type, region, created_at, updated_at FROM holdings ORDER BY symbol",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_holding(&self, symbol: &str) -> Result<Option<DbHolding>, DbError> {
        let row = sqlx::query_as::<_, DbHolding>(
            "SELECT symbol, quantity, name, asset_type, region, created_at, updated_at FROM holdings WHERE symbol = ?",
        )
        .bind(normalize_symbol(symbol))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_quantity(&self, symbol: &str, quantity: u64) -> Result<DbHolding, DbError> {
        let holding = Holding::new(symbol, quantity)?;
        let row = sqlx::query_as::<_, DbHolding>(
            r#"
            UPDATE holdings SET quantity = ?, updated_at = ?
            WHERE symbol = ?
            RETURNING symbol, quantity, name, asset_type, region, created_at, updated_at
            "#,
        )
        .bind(quantity_param(&holding)?)
        .bind(Utc::now())
        .bind(&holding.symbol)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::NotFound(holding.symbol.clone()))?;

        tracing::info!(symbol = %row.symbol, quantity = row.quantity, "Holding quantity updated");
        Ok(row)
    }

    async fn delete_holding(&self, symbol: &str) -> Result<(), DbError> {
        let symbol = normalize_symbol(symbol);
        let result = sqlx::query("DELETE FROM holdings WHERE symbol = ?")
            .bind(&symbol)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound(symbol));
        }
        tracing::info!(symbol = %symbol, "Holding deleted");
        Ok(())
    }
}
