//! # Rental Transaction Coordinator
//!
//! The only entry point that changes rental or asset status.
//!
//! ## Booking Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_rental(request)                                                 │
//! │                                                                         │
//! │  0. agent_id present?                      no ──► Validation(Required)  │
//! │  1. lock asset_id                          timeout ──► LockTimeout      │
//! │  2. validate (dates, asset, customer)      fail ──► Domain error        │
//! │  3. price = daily_rate × days                                           │
//! │  4. build ACTIVE rental                                                 │
//! │  5. ┌─ begin ────────────────────────────────────────────────────────┐  │
//! │     │  insert rental                                                 │  │
//! │     │  asset AVAILABLE ──► RESERVED   (compare-and-set)              │  │
//! │     └─ commit ──────────── any failure: rollback ──► TransactionFailed│  │
//! │  6. unlock, return rental                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Completion and cancellation mirror it: the lock is taken on the rental's
//! asset, the rental moves to its terminal state and the asset goes back to
//! AVAILABLE in one transaction.
//!
//! Validation runs after the lock is held, so two bookings racing for one
//! asset cannot both see it AVAILABLE. Nothing is written before validation
//! passes, and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use fleet_core::validation::validate_agent_id;
use fleet_core::{
    compute_cost, new_id, Asset, AssetLifecycle, AssetStatus, BookingRequest, CoreError,
    EntityKind, Money, Rental, RentalLifecycle, RentalStatus, StoreError, StoreResult,
    TransactionalStore, WriteTransaction,
};

use crate::clock::{Clock, SystemClock};
use crate::error::{EngineError, EngineResult};
use crate::lock::LockRegistry;
use crate::validator::BookingValidator;

pub struct RentalTransactionCoordinator<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    locks: LockRegistry,
    lock_timeout: Option<Duration>,
    validator: BookingValidator<S>,
}

impl<S> Clone for RentalTransactionCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            locks: self.locks.clone(),
            lock_timeout: self.lock_timeout,
            validator: self.validator.clone(),
        }
    }
}

impl<S: TransactionalStore> RentalTransactionCoordinator<S> {
    /// A coordinator on the system clock with unbounded lock waits.
    pub fn new(store: Arc<S>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            validator: BookingValidator::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            clock,
            locks: LockRegistry::new(),
            lock_timeout: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.validator = BookingValidator::new(Arc::clone(&self.store), Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Bounds how long an operation waits for another one on the same asset.
    pub fn with_lock_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn validator(&self) -> &BookingValidator<S> {
        &self.validator
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    // =========================================================================
    // Booking
    // =========================================================================

    /// Books an asset for a customer over an inclusive date range.
    ///
    /// ## Returns
    /// * `Ok(Rental)` - the ACTIVE rental; its asset is now RESERVED
    /// * `Err(Domain(..))` - a precondition failed, nothing was written
    /// * `Err(TransactionFailed { .. })` - the write phase failed and was rolled back
    pub async fn create_rental(&self, request: BookingRequest) -> EngineResult<Rental> {
        const OPERATION: &str = "create_rental";

        validate_agent_id(&request.agent_id)?;

        let _guard = self.locks.acquire(&request.asset_id, self.lock_timeout).await?;

        let booking = self
            .validator
            .validate_booking(
                &request.asset_id,
                &request.customer_id,
                request.start_date,
                request.end_date,
            )
            .await?;

        let total = compute_cost(
            booking.asset.daily_rate(),
            booking.start_date,
            booking.end_date,
        )?;

        let now = self.clock.now();
        AssetLifecycle::apply(&booking.asset, AssetStatus::Reserved, now)?;

        let rental = Rental {
            id: new_id(),
            asset_id: booking.asset.id.clone(),
            customer_id: booking.customer.id.clone(),
            agent_id: request.agent_id.trim().to_string(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            total_cost_cents: total.cents(),
            status: RentalStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|cause| EngineError::transaction_failed(OPERATION, cause))?;
        let outcome = book(tx.as_mut(), &rental).await;
        finish(OPERATION, tx, outcome).await?;

        info!(
            rental_id = %rental.id,
            asset_id = %rental.asset_id,
            customer_id = %rental.customer_id,
            agent_id = %rental.agent_id,
            days = rental.days(),
            total = %total,
            "Rental created"
        );

        Ok(rental)
    }

    // =========================================================================
    // Completion / Cancellation
    // =========================================================================

    /// Closes an ACTIVE rental as COMPLETED and frees its asset.
    pub async fn complete_rental(&self, rental_id: &str) -> EngineResult<Rental> {
        self.close_rental(rental_id, RentalStatus::Completed, "complete_rental")
            .await
    }

    /// Closes an ACTIVE rental as CANCELLED and frees its asset.
    pub async fn cancel_rental(&self, rental_id: &str) -> EngineResult<Rental> {
        self.close_rental(rental_id, RentalStatus::Cancelled, "cancel_rental")
            .await
    }

    async fn close_rental(
        &self,
        rental_id: &str,
        target: RentalStatus,
        operation: &'static str,
    ) -> EngineResult<Rental> {
        // The asset to lock is only known once the rental is loaded.
        let asset_id = self
            .validator
            .validate_termination(rental_id, target)
            .await?
            .rental
            .asset_id;

        let _guard = self.locks.acquire(&asset_id, self.lock_timeout).await?;

        let rental = self
            .validator
            .validate_termination(rental_id, target)
            .await?
            .rental;

        let asset = self
            .store
            .get_asset(&rental.asset_id)
            .await
            .map_err(EngineError::Storage)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Asset, rental.asset_id.as_str()))?;

        if asset.status != AssetStatus::Reserved {
            return Err(illegal_asset_move(&asset, AssetStatus::Available).into());
        }

        let now = self.clock.now();
        AssetLifecycle::apply(&asset, AssetStatus::Available, now)?;
        let closed = RentalLifecycle::apply(&rental, target, now)?;

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|cause| EngineError::transaction_failed(operation, cause))?;
        let outcome = release(tx.as_mut(), &closed).await;
        finish(operation, tx, outcome).await?;

        info!(
            rental_id = %closed.id,
            asset_id = %closed.asset_id,
            status = %closed.status,
            "Rental closed"
        );

        Ok(closed)
    }

    // =========================================================================
    // Maintenance
    // =========================================================================

    /// Moves an asset into MAINTENANCE (`true`) or back to AVAILABLE (`false`).
    ///
    /// Shares the per-asset lock with bookings, so a booking and a
    /// maintenance toggle on the same asset never interleave.
    pub async fn set_maintenance(&self, asset_id: &str, under_maintenance: bool) -> EngineResult<Asset> {
        const OPERATION: &str = "set_maintenance";

        let (from, to) = if under_maintenance {
            (AssetStatus::Available, AssetStatus::Maintenance)
        } else {
            (AssetStatus::Maintenance, AssetStatus::Available)
        };

        let _guard = self.locks.acquire(asset_id, self.lock_timeout).await?;

        let asset = self
            .store
            .get_asset(asset_id)
            .await
            .map_err(EngineError::Storage)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Asset, asset_id))?;

        // RESERVED -> AVAILABLE is legal but belongs to completion, not here.
        if asset.status != from {
            return Err(illegal_asset_move(&asset, to).into());
        }
        let updated = AssetLifecycle::apply(&asset, to, self.clock.now())?;

        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|cause| EngineError::transaction_failed(OPERATION, cause))?;
        let outcome = transition_asset(tx.as_mut(), asset_id, from, to, updated.updated_at).await;
        finish(OPERATION, tx, outcome).await?;

        info!(asset_id = %asset_id, from = %from, to = %to, "Asset maintenance toggled");
        Ok(updated)
    }

    // =========================================================================
    // Quotes
    // =========================================================================

    /// Prices a hypothetical booking without locking or writing anything.
    ///
    /// The asset's status is ignored and the rate may be stale by the time a
    /// booking is made.
    pub async fn compute_quote(
        &self,
        asset_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> EngineResult<Money> {
        let asset = self
            .store
            .get_asset(asset_id)
            .await
            .map_err(EngineError::Storage)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Asset, asset_id))?;

        let quote = compute_cost(asset.daily_rate(), start_date, end_date)?;
        debug!(asset_id = %asset_id, %start_date, %end_date, quote = %quote, "Quote computed");
        Ok(quote)
    }
}

// =============================================================================
// Write Phases
// =============================================================================

async fn book(tx: &mut dyn WriteTransaction, rental: &Rental) -> StoreResult<()> {
    tx.insert_rental(rental).await?;
    transition_asset(
        tx,
        &rental.asset_id,
        AssetStatus::Available,
        AssetStatus::Reserved,
        rental.created_at,
    )
    .await
}

async fn release(tx: &mut dyn WriteTransaction, closed: &Rental) -> StoreResult<()> {
    if !tx
        .transition_rental(&closed.id, RentalStatus::Active, closed.status, closed.updated_at)
        .await?
    {
        return Err(StoreError::Conflict {
            entity: EntityKind::Rental,
            id: closed.id.clone(),
            reason: format!("no longer {}", RentalStatus::Active),
        });
    }
    transition_asset(
        tx,
        &closed.asset_id,
        AssetStatus::Reserved,
        AssetStatus::Available,
        closed.updated_at,
    )
    .await
}

async fn transition_asset(
    tx: &mut dyn WriteTransaction,
    asset_id: &str,
    from: AssetStatus,
    to: AssetStatus,
    at: DateTime<Utc>,
) -> StoreResult<()> {
    if tx.transition_asset(asset_id, from, to, at).await? {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            entity: EntityKind::Asset,
            id: asset_id.to_string(),
            reason: format!("no longer {from}"),
        })
    }
}

/// Commits on success. On failure rolls back and reports the original cause,
/// or both causes if the rollback fails too.
async fn finish(
    operation: &'static str,
    tx: Box<dyn WriteTransaction>,
    outcome: StoreResult<()>,
) -> EngineResult<()> {
    match outcome {
        Ok(()) => tx
            .commit()
            .await
            .map_err(|cause| EngineError::transaction_failed(operation, cause)),
        Err(cause) => {
            warn!(operation, error = %cause, "Write phase failed, rolling back");
            match tx.rollback().await {
                Ok(()) => Err(EngineError::transaction_failed(operation, cause)),
                Err(rollback) => {
                    error!(operation, error = %rollback, "Rollback failed");
                    Err(EngineError::transaction_failed(
                        operation,
                        StoreError::RollbackFailed {
                            cause: Box::new(cause),
                            rollback: Box::new(rollback),
                        },
                    ))
                }
            }
        }
    }
}

fn illegal_asset_move(asset: &Asset, to: AssetStatus) -> CoreError {
    CoreError::IllegalTransition {
        entity: EntityKind::Asset,
        id: asset.id.clone(),
        from: asset.status.to_string(),
        to: to.to_string(),
    }
}
