//! # Store Traits
//!
//! The narrow persistence interfaces the rental engine depends on.
//!
//! ## Read Side vs Write Side
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   AssetStore ─┐                                                         │
//! │   CustomerStore ├──► TransactionalStore ──begin()──► WriteTransaction   │
//! │   RentalStore ─┘            │                          │                │
//! │                             │                          ├ insert_rental  │
//! │    plain reads and          │                          ├ transition_*   │
//! │    single-row updates ◄─────┘                          ├ commit         │
//! │                                                        └ rollback       │
//! │                                                                         │
//! │   Writes made through a WriteTransaction become visible together on     │
//! │   commit, or not at all.                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Implementations live outside this crate: `fleet-db` backs them with SQLite,
//! `fleet-engine` ships an in-memory one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::types::{Asset, AssetStatus, Customer, Rental, RentalStatus};

#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn get_asset(&self, id: &str) -> StoreResult<Option<Asset>>;

    /// Unconditionally sets the status. Returns `false` if no such asset.
    async fn update_asset_status(&self, id: &str, status: AssetStatus) -> StoreResult<bool>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_customer(&self, id: &str) -> StoreResult<Option<Customer>>;
}

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn insert_rental(&self, rental: &Rental) -> StoreResult<Rental>;

    async fn get_rental(&self, id: &str) -> StoreResult<Option<Rental>>;

    /// Unconditionally sets the status. Returns `false` if no such rental.
    async fn update_rental_status(&self, id: &str, status: RentalStatus) -> StoreResult<bool>;
}

/// A unit of writes that commits or rolls back as one.
///
/// Dropping a transaction without calling `commit` discards its writes.
#[async_trait]
pub trait WriteTransaction: Send {
    async fn insert_rental(&mut self, rental: &Rental) -> StoreResult<()>;

    /// Moves a rental from `from` to `to` and stamps `updated_at = at`.
    ///
    /// Returns `false` when the rental is missing or no longer in `from`
    /// (compare-and-set).
    async fn transition_rental(
        &mut self,
        id: &str,
        from: RentalStatus,
        to: RentalStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Moves an asset from `from` to `to`, compare-and-set like
    /// [`WriteTransaction::transition_rental`].
    async fn transition_asset(
        &mut self,
        id: &str,
        from: AssetStatus,
        to: AssetStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;

    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// A store that can group writes into a [`WriteTransaction`].
#[async_trait]
pub trait TransactionalStore: AssetStore + CustomerStore + RentalStore {
    async fn begin(&self) -> StoreResult<Box<dyn WriteTransaction>>;
}
