//! # In-Memory Store
//!
//! A [`TransactionalStore`] backed by hash maps, for tests and embedding.
//!
//! ## Transaction Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  begin()                                                                │
//! │    │                                                                    │
//! │    ▼                                                                    │
//! │  MemoryWriteTx ── staged: [InsertRental, AssetStatus{from,to}, ...]    │
//! │    │   each write is checked against committed + staged state          │
//! │    │   and nothing becomes visible yet                                 │
//! │    │                                                                    │
//! │    ├── commit()   ─► lock state, replay every write on a copy,         │
//! │    │                 swap the copy in (all or nothing)                 │
//! │    └── rollback() ─► drop the staged writes                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status writes are compare-and-set both when staged and when replayed, so a
//! plain `update_asset_status` that sneaks in between makes the commit fail
//! with `StoreError::Conflict` instead of overwriting it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use fleet_core::validation::{validate_new_asset, validate_new_customer};
use fleet_core::{
    new_id, Asset, AssetStatus, AssetStore, Customer, CustomerStore, EntityKind, NewAsset,
    NewCustomer, Rental, RentalStatus, RentalStore, StoreError, StoreResult, TransactionalStore,
    ValidationError, WriteTransaction,
};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    assets: HashMap<String, Asset>,
    customers: HashMap<String, Customer>,
    rentals: HashMap<String, Rental>,
}

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Registers a new AVAILABLE asset, applying the same field rules and
    /// plate uniqueness as the SQLite repository.
    pub fn register_asset(&self, input: &NewAsset) -> Result<Asset, ValidationError> {
        validate_new_asset(input)?;

        let plate = input.license_plate.trim().to_uppercase();
        let mut state = self.state();
        if state.assets.values().any(|a| a.license_plate == plate) {
            return Err(ValidationError::Duplicate {
                field: "license_plate".to_string(),
                value: plate,
            });
        }

        let now = Utc::now();
        let asset = Asset {
            id: new_id(),
            make: input.make.trim().to_string(),
            model: input.model.trim().to_string(),
            year: input.year,
            license_plate: plate,
            color: input.color.trim().to_string(),
            daily_rate_cents: input.daily_rate_cents,
            status: AssetStatus::Available,
            created_at: now,
            updated_at: now,
        };
        state.assets.insert(asset.id.clone(), asset.clone());
        Ok(asset)
    }

    pub fn register_customer(&self, input: &NewCustomer) -> Result<Customer, ValidationError> {
        validate_new_customer(input)?;

        let email = input.email.trim().to_lowercase();
        let mut state = self.state();
        if state.customers.values().any(|c| c.email == email) {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email,
            });
        }

        let customer = Customer {
            id: new_id(),
            name: input.name.trim().to_string(),
            email,
            phone: input.phone.trim().to_string(),
            address: input.address.trim().to_string(),
            created_at: Utc::now(),
        };
        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    /// Inserts or replaces an asset as-is, bypassing validation.
    pub fn put_asset(&self, asset: Asset) {
        self.state().assets.insert(asset.id.clone(), asset);
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn rentals_for_asset(&self, asset_id: &str) -> Vec<Rental> {
        let mut rentals: Vec<Rental> = self
            .state()
            .rentals
            .values()
            .filter(|r| r.asset_id == asset_id)
            .cloned()
            .collect();
        rentals.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        rentals
    }

    pub fn rental_count(&self) -> usize {
        self.state().rentals.len()
    }

    pub fn asset_count(&self) -> usize {
        self.state().assets.len()
    }
}

// =============================================================================
// Read-Side Traits
// =============================================================================

#[async_trait]
impl AssetStore for MemoryStore {
    async fn get_asset(&self, id: &str) -> StoreResult<Option<Asset>> {
        Ok(self.state().assets.get(id).cloned())
    }

    async fn update_asset_status(&self, id: &str, status: AssetStatus) -> StoreResult<bool> {
        let mut state = self.state();
        match state.assets.get_mut(id) {
            Some(asset) => {
                asset.status = status;
                asset.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn get_customer(&self, id: &str) -> StoreResult<Option<Customer>> {
        Ok(self.state().customers.get(id).cloned())
    }
}

#[async_trait]
impl RentalStore for MemoryStore {
    async fn insert_rental(&self, rental: &Rental) -> StoreResult<Rental> {
        let mut state = self.state();
        apply(&mut state, &StagedWrite::InsertRental(rental.clone()))?;
        Ok(rental.clone())
    }

    async fn get_rental(&self, id: &str) -> StoreResult<Option<Rental>> {
        Ok(self.state().rentals.get(id).cloned())
    }

    async fn update_rental_status(&self, id: &str, status: RentalStatus) -> StoreResult<bool> {
        let mut state = self.state();
        match state.rentals.get_mut(id) {
            Some(rental) => {
                rental.status = status;
                rental.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl TransactionalStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn WriteTransaction>> {
        Ok(Box::new(MemoryWriteTx {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
        }))
    }
}

// =============================================================================
// Write Transaction
// =============================================================================

#[derive(Debug, Clone)]
enum StagedWrite {
    InsertRental(Rental),
    RentalStatus {
        id: String,
        from: RentalStatus,
        to: RentalStatus,
        at: DateTime<Utc>,
    },
    AssetStatus {
        id: String,
        from: AssetStatus,
        to: AssetStatus,
        at: DateTime<Utc>,
    },
}

/// Applies one write. `Ok(false)` means a compare-and-set did not match.
fn apply(state: &mut MemoryState, write: &StagedWrite) -> StoreResult<bool> {
    match write {
        StagedWrite::InsertRental(rental) => {
            if state.rentals.contains_key(&rental.id) {
                return Err(StoreError::Constraint(format!(
                    "rental {} already exists",
                    rental.id
                )));
            }
            if !state.assets.contains_key(&rental.asset_id) {
                return Err(StoreError::Constraint(format!(
                    "rental references unknown asset {}",
                    rental.asset_id
                )));
            }
            if !state.customers.contains_key(&rental.customer_id) {
                return Err(StoreError::Constraint(format!(
                    "rental references unknown customer {}",
                    rental.customer_id
                )));
            }
            if rental.end_date < rental.start_date {
                return Err(StoreError::Constraint(
                    "rental end_date precedes start_date".to_string(),
                ));
            }
            state.rentals.insert(rental.id.clone(), rental.clone());
            Ok(true)
        }
        StagedWrite::RentalStatus { id, from, to, at } => match state.rentals.get_mut(id) {
            Some(rental) if rental.status == *from => {
                rental.status = *to;
                rental.updated_at = *at;
                Ok(true)
            }
            _ => Ok(false),
        },
        StagedWrite::AssetStatus { id, from, to, at } => match state.assets.get_mut(id) {
            Some(asset) if asset.status == *from => {
                asset.status = *to;
                asset.updated_at = *at;
                Ok(true)
            }
            _ => Ok(false),
        },
    }
}

fn conflict_for(write: &StagedWrite) -> StoreError {
    let (entity, id) = match write {
        StagedWrite::InsertRental(rental) => (EntityKind::Rental, rental.id.clone()),
        StagedWrite::RentalStatus { id, .. } => (EntityKind::Rental, id.clone()),
        StagedWrite::AssetStatus { id, .. } => (EntityKind::Asset, id.clone()),
    };
    StoreError::Conflict {
        entity,
        id,
        reason: "status changed before commit".to_string(),
    }
}

/// Staged writes against a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryWriteTx {
    state: Arc<Mutex<MemoryState>>,
    staged: Vec<StagedWrite>,
}

impl MemoryWriteTx {
    /// Checks `write` against committed state plus what is already staged,
    /// and stages it if it applies.
    fn stage(&mut self, write: StagedWrite) -> StoreResult<bool> {
        let mut view = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for earlier in &self.staged {
            apply(&mut view, earlier)?;
        }

        let applied = apply(&mut view, &write)?;
        if applied {
            self.staged.push(write);
        }
        Ok(applied)
    }
}

#[async_trait]
impl WriteTransaction for MemoryWriteTx {
    async fn insert_rental(&mut self, rental: &Rental) -> StoreResult<()> {
        self.stage(StagedWrite::InsertRental(rental.clone()))?;
        Ok(())
    }

    async fn transition_rental(
        &mut self,
        id: &str,
        from: RentalStatus,
        to: RentalStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.stage(StagedWrite::RentalStatus {
            id: id.to_string(),
            from,
            to,
            at,
        })
    }

    async fn transition_asset(
        &mut self,
        id: &str,
        from: AssetStatus,
        to: AssetStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.stage(StagedWrite::AssetStatus {
            id: id.to_string(),
            from,
            to,
            at,
        })
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = state.clone();
        for write in &self.staged {
            if !apply(&mut next, write)? {
                return Err(conflict_for(write));
            }
        }

        *state = next;
        debug!(writes = self.staged.len(), "In-memory transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        debug!(writes = self.staged.len(), "In-memory transaction discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn camry() -> NewAsset {
        NewAsset {
            make: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2022,
            license_plate: "abc123".to_string(),
            color: "White".to_string(),
            daily_rate_cents: 5000,
        }
    }

    fn john() -> NewCustomer {
        NewCustomer {
            name: "John Doe".to_string(),
            email: "John@Example.com".to_string(),
            phone: "123-456-7890".to_string(),
            address: "123 Main St, City".to_string(),
        }
    }

    fn rental_for(asset: &Asset, customer: &Customer) -> Rental {
        let now = Utc::now();
        Rental {
            id: new_id(),
            asset_id: asset.id.clone(),
            customer_id: customer.id.clone(),
            agent_id: "agent-1".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            total_cost_cents: 15000,
            status: RentalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_register_normalises_and_rejects_duplicates() {
        let store = MemoryStore::new();

        let asset = store.register_asset(&camry()).unwrap();
        assert_eq!(asset.license_plate, "ABC123");
        assert_eq!(asset.status, AssetStatus::Available);
        assert!(matches!(
            store.register_asset(&camry()),
            Err(ValidationError::Duplicate { .. })
        ));

        let customer = store.register_customer(&john()).unwrap();
        assert_eq!(customer.email, "john@example.com");
        assert!(store.register_customer(&john()).is_err());
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = MemoryStore::new();
        let asset = store.register_asset(&camry()).unwrap();
        let customer = store.register_customer(&john()).unwrap();
        let rental = rental_for(&asset, &customer);

        let mut tx = store.begin().await.unwrap();
        tx.insert_rental(&rental).await.unwrap();
        assert!(tx
            .transition_asset(&asset.id, AssetStatus::Available, AssetStatus::Reserved, Utc::now())
            .await
            .unwrap());

        assert!(store.get_rental(&rental.id).await.unwrap().is_none());
        assert_eq!(
            store.get_asset(&asset.id).await.unwrap().unwrap().status,
            AssetStatus::Available
        );

        tx.commit().await.unwrap();

        assert!(store.get_rental(&rental.id).await.unwrap().is_some());
        assert_eq!(
            store.get_asset(&asset.id).await.unwrap().unwrap().status,
            AssetStatus::Reserved
        );
    }

    #[tokio::test]
    async fn test_rollback_discards_everything() {
        let store = MemoryStore::new();
        let asset = store.register_asset(&camry()).unwrap();
        let customer = store.register_customer(&john()).unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.insert_rental(&rental_for(&asset, &customer)).await.unwrap();
        tx.rollback().await.unwrap();

        assert_eq!(store.rental_count(), 0);
        assert!(store.rentals_for_asset(&asset.id).is_empty());
    }

    #[tokio::test]
    async fn test_staged_state_feeds_later_checks() {
        let store = MemoryStore::new();
        let asset = store.register_asset(&camry()).unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx
            .transition_asset(&asset.id, AssetStatus::Available, AssetStatus::Reserved, Utc::now())
            .await
            .unwrap());
        // Second move from AVAILABLE no longer matches the staged state.
        assert!(!tx
            .transition_asset(&asset.id, AssetStatus::Available, AssetStatus::Maintenance, Utc::now())
            .await
            .unwrap());
        assert!(!tx
            .transition_asset("missing", AssetStatus::Available, AssetStatus::Reserved, Utc::now())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_commit_detects_interleaved_write() {
        let store = MemoryStore::new();
        let asset = store.register_asset(&camry()).unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx
            .transition_asset(&asset.id, AssetStatus::Available, AssetStatus::Reserved, Utc::now())
            .await
            .unwrap());

        store
            .update_asset_status(&asset.id, AssetStatus::Maintenance)
            .await
            .unwrap();

        let err = tx.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { entity: EntityKind::Asset, .. }));
        assert_eq!(
            store.get_asset(&asset.id).await.unwrap().unwrap().status,
            AssetStatus::Maintenance
        );
    }

    #[tokio::test]
    async fn test_insert_requires_known_references() {
        let store = MemoryStore::new();
        let asset = store.register_asset(&camry()).unwrap();
        let customer = store.register_customer(&john()).unwrap();

        let mut orphan = rental_for(&asset, &customer);
        orphan.customer_id = "nobody".to_string();

        let mut tx = store.begin().await.unwrap();
        let err = tx.insert_rental(&orphan).await.unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }
}
