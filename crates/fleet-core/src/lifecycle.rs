//! # Lifecycles
//!
//! Transition tables for asset availability and rental status.
//!
//! ## Asset Availability
//! ```text
//!                 booking accepted
//!   ┌───────────┐ ───────────────► ┌──────────┐
//!   │ AVAILABLE │                  │ RESERVED │
//!   └───────────┘ ◄─────────────── └──────────┘
//!     │     ▲     rental completed
//!     │     │     or cancelled
//!     ▼     │
//!   ┌─────────────┐
//!   │ MAINTENANCE │   (toggled by fleet staff, never by a rental)
//!   └─────────────┘
//! ```
//!
//! ## Rental
//! ```text
//!   ┌────────┐ ──► COMPLETED (terminal)
//!   │ ACTIVE │
//!   └────────┘ ──► CANCELLED (terminal)
//! ```
//!
//! Both machines are pure: `apply` returns an updated copy and never touches
//! storage. Persisting the result is the coordinator's job.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::types::{Asset, AssetStatus, Rental, RentalStatus};

/// Asset availability state machine.
pub struct AssetLifecycle;

impl AssetLifecycle {
    /// Whether `from → to` is a legal asset transition.
    pub const fn can_transition(from: AssetStatus, to: AssetStatus) -> bool {
        use AssetStatus::*;

        match (from, to) {
            (Available, Reserved) => true,
            (Reserved, Available) => true,
            (Available, Maintenance) => true,
            (Maintenance, Available) => true,
            (Available, Available)
            | (Reserved, Reserved)
            | (Reserved, Maintenance)
            | (Maintenance, Reserved)
            | (Maintenance, Maintenance) => false,
        }
    }

    /// Returns a copy of `asset` moved to `to`, or `IllegalTransition`.
    pub fn apply(asset: &Asset, to: AssetStatus, now: DateTime<Utc>) -> CoreResult<Asset> {
        if !Self::can_transition(asset.status, to) {
            return Err(CoreError::IllegalTransition {
                entity: EntityKind::Asset,
                id: asset.id.clone(),
                from: asset.status.to_string(),
                to: to.to_string(),
            });
        }

        let mut next = asset.clone();
        next.status = to;
        next.updated_at = now;
        Ok(next)
    }
}

/// Rental status state machine.
pub struct RentalLifecycle;

impl RentalLifecycle {
    /// Whether `from → to` is a legal rental transition.
    pub const fn can_transition(from: RentalStatus, to: RentalStatus) -> bool {
        use RentalStatus::*;

        match (from, to) {
            (Active, Completed) => true,
            (Active, Cancelled) => true,
            (Active, Active) => false,
            (Completed, _) | (Cancelled, _) => false,
        }
    }

    /// Returns a copy of `rental` moved to `to`, or `IllegalTransition`.
    pub fn apply(rental: &Rental, to: RentalStatus, now: DateTime<Utc>) -> CoreResult<Rental> {
        if !Self::can_transition(rental.status, to) {
            return Err(CoreError::IllegalTransition {
                entity: EntityKind::Rental,
                id: rental.id.clone(),
                from: rental.status.to_string(),
                to: to.to_string(),
            });
        }

        let mut next = rental.clone();
        next.status = to;
        next.updated_at = now;
        Ok(next)
    }
}
