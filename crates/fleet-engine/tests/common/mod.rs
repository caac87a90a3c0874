//! Shared fixtures for the engine integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use fleet_core::{
    Asset, AssetStatus, AssetStore, Customer, CustomerStore, NewAsset, NewCustomer, Rental,
    RentalStatus, RentalStore, StoreError, StoreResult, TransactionalStore, WriteTransaction,
};
use fleet_db::{Database, DbConfig};
use fleet_engine::{FixedClock, MemoryStore, RentalTransactionCoordinator};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// "Today" for every fixture.
pub fn today() -> NaiveDate {
    date(2024, 1, 1)
}

pub fn camry() -> NewAsset {
    NewAsset {
        make: "Toyota".to_string(),
        model: "Camry".to_string(),
        year: 2022,
        license_plate: "ABC123".to_string(),
        color: "White".to_string(),
        daily_rate_cents: 5000,
    }
}

pub fn focus() -> NewAsset {
    NewAsset {
        make: "Ford".to_string(),
        model: "Focus".to_string(),
        year: 2023,
        license_plate: "DEF456".to_string(),
        color: "Red".to_string(),
        daily_rate_cents: 4000,
    }
}

pub fn john() -> NewCustomer {
    NewCustomer {
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        phone: "123-456-7890".to_string(),
        address: "123 Main St, City".to_string(),
    }
}

pub fn jane() -> NewCustomer {
    NewCustomer {
        name: "Jane Smith".to_string(),
        email: "jane@example.com".to_string(),
        phone: "098-765-4321".to_string(),
        address: "456 Oak Ave, Town".to_string(),
    }
}

pub struct Fixture<S> {
    pub engine: RentalTransactionCoordinator<S>,
    pub camry: Asset,
    pub focus: Asset,
    pub john: Customer,
    pub jane: Customer,
}

/// Coordinator over a fresh in-memory SQLite database.
pub async fn sqlite_fixture() -> Fixture<Database> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let camry = db.assets().insert(&camry()).await.unwrap();
    let focus = db.assets().insert(&focus()).await.unwrap();
    let john = db.customers().insert(&john()).await.unwrap();
    let jane = db.customers().insert(&jane()).await.unwrap();

    Fixture {
        engine: RentalTransactionCoordinator::new(Arc::new(db))
            .with_clock(Arc::new(FixedClock::on(today()))),
        camry,
        focus,
        john,
        jane,
    }
}

/// Seeds `store` and returns the registered entities.
pub fn seed_memory(store: &MemoryStore) -> (Asset, Asset, Customer, Customer) {
    (
        store.register_asset(&camry()).unwrap(),
        store.register_asset(&focus()).unwrap(),
        store.register_customer(&john()).unwrap(),
        store.register_customer(&jane()).unwrap(),
    )
}

// =============================================================================
// Fault Injection
// =============================================================================

/// Wraps a store and makes chosen steps of its write transactions fail.
pub struct FaultyStore<S> {
    pub inner: S,
    fail_asset_write: AtomicBool,
    fail_rental_write: AtomicBool,
    fail_commit: AtomicBool,
    fail_rollback: AtomicBool,
}

impl<S> FaultyStore<S> {
    pub fn new(inner: S) -> Self {
        FaultyStore {
            inner,
            fail_asset_write: AtomicBool::new(false),
            fail_rental_write: AtomicBool::new(false),
            fail_commit: AtomicBool::new(false),
            fail_rollback: AtomicBool::new(false),
        }
    }

    pub fn fail_asset_write(&self, on: bool) {
        self.fail_asset_write.store(on, Ordering::SeqCst);
    }

    pub fn fail_rental_write(&self, on: bool) {
        self.fail_rental_write.store(on, Ordering::SeqCst);
    }

    pub fn fail_commit(&self, on: bool) {
        self.fail_commit.store(on, Ordering::SeqCst);
    }

    pub fn fail_rollback(&self, on: bool) {
        self.fail_rollback.store(on, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: AssetStore> AssetStore for FaultyStore<S> {
    async fn get_asset(&self, id: &str) -> StoreResult<Option<Asset>> {
        self.inner.get_asset(id).await
    }

    async fn update_asset_status(&self, id: &str, status: AssetStatus) -> StoreResult<bool> {
        self.inner.update_asset_status(id, status).await
    }
}

#[async_trait]
impl<S: CustomerStore> CustomerStore for FaultyStore<S> {
    async fn get_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        self.inner.get_customer(id).await
    }
}

#[async_trait]
impl<S: RentalStore> RentalStore for FaultyStore<S> {
    async fn insert_rental(&self, rental: &Rental) -> StoreResult<Rental> {
        self.inner.insert_rental(rental).await
    }

    async fn get_rental(&self, id: &str) -> StoreResult<Option<Rental>> {
        self.inner.get_rental(id).await
    }

    async fn update_rental_status(&self, id: &str, status: RentalStatus) -> StoreResult<bool> {
        self.inner.update_rental_status(id, status).await
    }
}

#[async_trait]
impl<S: TransactionalStore> TransactionalStore for FaultyStore<S> {
    async fn begin(&self) -> StoreResult<Box<dyn WriteTransaction>> {
        Ok(Box::new(FaultyTx {
            inner: self.inner.begin().await?,
            fail_asset_write: self.fail_asset_write.load(Ordering::SeqCst),
            fail_rental_write: self.fail_rental_write.load(Ordering::SeqCst),
            fail_commit: self.fail_commit.load(Ordering::SeqCst),
            fail_rollback: self.fail_rollback.load(Ordering::SeqCst),
        }))
    }
}

struct FaultyTx {
    inner: Box<dyn WriteTransaction>,
    fail_asset_write: bool,
    fail_rental_write: bool,
    fail_commit: bool,
    fail_rollback: bool,
}

#[async_trait]
impl WriteTransaction for FaultyTx {
    async fn insert_rental(&mut self, rental: &Rental) -> StoreResult<()> {
        self.inner.insert_rental(rental).await
    }

    async fn transition_rental(
        &mut self,
        id: &str,
        from: RentalStatus,
        to: RentalStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        if self.fail_rental_write {
            return Err(StoreError::Backend("injected rental write failure".to_string()));
        }
        self.inner.transition_rental(id, from, to, at).await
    }

    async fn transition_asset(
        &mut self,
        id: &str,
        from: AssetStatus,
        to: AssetStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        if self.fail_asset_write {
            return Err(StoreError::Backend("injected asset write failure".to_string()));
        }
        self.inner.transition_asset(id, from, to, at).await
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        // Dropping `inner` uncommitted discards its writes.
        if self.fail_commit {
            return Err(StoreError::Backend("injected commit failure".to_string()));
        }
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        // The inner writes are still discarded when `inner` is dropped.
        if self.fail_rollback {
            return Err(StoreError::Backend("injected rollback failure".to_string()));
        }
        self.inner.rollback().await
    }
}
