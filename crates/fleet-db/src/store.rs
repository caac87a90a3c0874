//! # Store Implementations
//!
//! `fleet-core`'s store traits backed by SQLite.
//!
//! ## Write Transactions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.begin()  ──►  BEGIN                 (one pooled connection held)    │
//! │                                                                         │
//! │  insert_rental      INSERT INTO rentals ...                             │
//! │  transition_asset   UPDATE assets  SET status = 'RESERVED'              │
//! │                     WHERE id = ? AND status = 'AVAILABLE'               │
//! │                        │                                                │
//! │                        └─ 0 rows? another writer got there first        │
//! │                                                                         │
//! │  commit()   ──►  COMMIT      both rows visible together                 │
//! │  rollback() ──►  ROLLBACK    neither row visible                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The status updates are compare-and-set, so a second process writing to the
//! same file cannot slip a conflicting transition past the in-process locks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::rental::insert_with;
use fleet_core::store::{AssetStore, CustomerStore, RentalStore, TransactionalStore, WriteTransaction};
use fleet_core::{Asset, AssetStatus, Customer, Rental, RentalStatus, StoreError, StoreResult};

// =============================================================================
// Read Side
// =============================================================================

#[async_trait]
impl AssetStore for Database {
    async fn get_asset(&self, id: &str) -> StoreResult<Option<Asset>> {
        Ok(self.assets().get_by_id(id).await?)
    }

    async fn update_asset_status(&self, id: &str, status: AssetStatus) -> StoreResult<bool> {
        Ok(self.assets().update_status(id, status).await?)
    }
}

#[async_trait]
impl CustomerStore for Database {
    async fn get_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        Ok(self.customers().get_by_id(id).await?)
    }
}

#[async_trait]
impl RentalStore for Database {
    async fn insert_rental(&self, rental: &Rental) -> StoreResult<Rental> {
        Ok(self.rentals().insert(rental).await?)
    }

    async fn get_rental(&self, id: &str) -> StoreResult<Option<Rental>> {
        Ok(self.rentals().get_by_id(id).await?)
    }

    async fn update_rental_status(&self, id: &str, status: RentalStatus) -> StoreResult<bool> {
        Ok(self.rentals().update_status(id, status).await?)
    }
}

// =============================================================================
// Write Side
// =============================================================================

#[async_trait]
impl TransactionalStore for Database {
    async fn begin(&self) -> StoreResult<Box<dyn WriteTransaction>> {
        let tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| StoreError::from(DbError::from(e)))?;

        debug!("Write transaction started");
        Ok(Box::new(SqliteWriteTx { tx }))
    }
}

/// An open SQLite transaction. Dropping it without `commit` rolls back.
pub struct SqliteWriteTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl WriteTransaction for SqliteWriteTx {
    async fn insert_rental(&mut self, rental: &Rental) -> StoreResult<()> {
        insert_with(&mut *self.tx, rental).await?;
        Ok(())
    }

    async fn transition_rental(
        &mut self,
        id: &str,
        from: RentalStatus,
        to: RentalStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE rentals SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(at)
        .execute(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        let updated = result.rows_affected() == 1;
        if !updated {
            warn!(rental_id = %id, from = %from, to = %to, "Rental was not in the expected status");
        }
        Ok(updated)
    }

    async fn transition_asset(
        &mut self,
        id: &str,
        from: AssetStatus,
        to: AssetStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE assets SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .bind(at)
        .execute(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        let updated = result.rows_affected() == 1;
        if !updated {
            warn!(asset_id = %id, from = %from, to = %to, "Asset was not in the expected status");
        }
        Ok(updated)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| StoreError::from(DbError::TransactionFailed(e.to_string())))
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| StoreError::from(DbError::TransactionFailed(e.to_string())))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
