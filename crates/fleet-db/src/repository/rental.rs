//! # Rental Repository
//!
//! Database operations for rentals.
//!
//! Rentals are created by the coordinator inside a write transaction (see
//! `store.rs`); this repository covers the read side plus single-row writes.
//!
//! ## Rental Row
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │ id │ asset_id │ customer_id │ agent_id │ start │ end │ cost │ status │
//! └──────────────────────────────────────────────────────────────────────┘
//!          │            │
//!          ▼            ▼
//!       assets(id)  customers(id)      (foreign keys only, no joins cached)
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use fleet_core::{Rental, RentalStatus, ValidationError};

pub(crate) const RENTAL_COLUMNS: &str = r#"
    id, asset_id, customer_id, agent_id, start_date, end_date,
    total_cost_cents, status, created_at, updated_at
"#;

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

/// Inserts `rental` using any SQLite executor (pool or open transaction).
pub(crate) async fn insert_with<'e, E>(executor: E, rental: &Rental) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO rentals (
            id, asset_id, customer_id, agent_id, start_date, end_date,
            total_cost_cents, status, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
    )
    .bind(&rental.id)
    .bind(&rental.asset_id)
    .bind(&rental.customer_id)
    .bind(&rental.agent_id)
    .bind(rental.start_date)
    .bind(rental.end_date)
    .bind(rental.total_cost_cents)
    .bind(rental.status)
    .bind(rental.created_at)
    .bind(rental.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

impl RentalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Inserts a fully-formed rental.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Asset or customer does not exist
    pub async fn insert(&self, rental: &Rental) -> DbResult<Rental> {
        debug!(rental_id = %rental.id, asset_id = %rental.asset_id, "Inserting rental");
        insert_with(&self.pool, rental).await?;
        Ok(rental.clone())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Rental>> {
        let sql = format!("SELECT {RENTAL_COLUMNS} FROM rentals WHERE id = ?1");
        let rental = sqlx::query_as::<_, Rental>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(rental)
    }

    /// Every rental, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Rental>> {
        let sql = format!("SELECT {RENTAL_COLUMNS} FROM rentals ORDER BY created_at DESC");
        let rentals = sqlx::query_as::<_, Rental>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    /// Rentals whose inclusive date range overlaps `from..=to`, by start date.
    ///
    /// A rental spanning the whole window counts, as do ones that only touch
    /// its first or last day.
    ///
    /// ## Returns
    /// * `Err(DbError::Validation)` - `from` is after `to`
    pub async fn list_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Rental>> {
        if from > to {
            return Err(ValidationError::InvalidFormat {
                field: "date_range".to_string(),
                reason: format!("{from} is after {to}"),
            }
            .into());
        }

        let sql = format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals \
             WHERE start_date <= ?2 AND end_date >= ?1 \
             ORDER BY start_date, created_at"
        );
        let rentals = sqlx::query_as::<_, Rental>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        debug!(%from, %to, count = rentals.len(), "Listed rentals by date range");
        Ok(rentals)
    }

    /// Rentals of one asset, newest first.
    pub async fn list_by_asset(&self, asset_id: &str) -> DbResult<Vec<Rental>> {
        let sql = format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE asset_id = ?1 ORDER BY created_at DESC"
        );
        let rentals = sqlx::query_as::<_, Rental>(&sql)
            .bind(asset_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    /// Rentals of one customer, newest first.
    pub async fn list_by_customer(&self, customer_id: &str) -> DbResult<Vec<Rental>> {
        let sql = format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE customer_id = ?1 ORDER BY created_at DESC"
        );
        let rentals = sqlx::query_as::<_, Rental>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    pub async fn list_by_status(&self, status: RentalStatus) -> DbResult<Vec<Rental>> {
        let sql = format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE status = ?1 ORDER BY created_at DESC"
        );
        let rentals = sqlx::query_as::<_, Rental>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(rentals)
    }

    /// Number of ACTIVE rentals for an asset. Never more than one.
    pub async fn count_active_for_asset(&self, asset_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM rentals WHERE asset_id = ?1 AND status = ?2")
                .bind(asset_id)
                .bind(RentalStatus::Active)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Sets a rental's status without checking the previous one.
    ///
    /// Returns `false` when no rental has that id.
    pub async fn update_status(&self, id: &str, status: RentalStatus) -> DbResult<bool> {
        debug!(rental_id = %id, status = %status, "Updating rental status");

        let result = sqlx::query("UPDATE rentals SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
