//! # Booking Preconditions
//!
//! Pure checks that a booking or a completion is allowed, given entities the
//! caller has already loaded. `fleet-engine`'s validator wires these to a
//! store; keeping them here means every rule is testable without one.
//!
//! ## Booking Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. start & end present, start >= today ──► InvalidDate                 │
//! │  2. end >= start                        ──► InvalidDate                 │
//! │  3. asset exists                        ──► NotFound(Asset)             │
//! │  4. asset AVAILABLE                     ──► AssetUnavailable            │
//! │  5. customer exists                     ──► NotFound(Customer)          │
//! │                                                                         │
//! │  First failure wins. Nothing here writes.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, EntityKind};
use crate::types::{Asset, AssetStatus, Customer, Rental, RentalStatus};

// =============================================================================
// Requests
// =============================================================================

/// A request to book an asset.
///
/// `agent_id` is the staff member recording the booking; it is passed in
/// explicitly on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BookingRequest {
    pub asset_id: String,
    pub customer_id: String,
    pub agent_id: String,
    #[ts(as = "Option<String>")]
    pub start_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end_date: Option<NaiveDate>,
}

impl BookingRequest {
    pub fn new(
        asset_id: impl Into<String>,
        customer_id: impl Into<String>,
        agent_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        BookingRequest {
            asset_id: asset_id.into(),
            customer_id: customer_id.into(),
            agent_id: agent_id.into(),
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }
}

// =============================================================================
// Validated Results
// =============================================================================

/// Everything a booking needs once its preconditions hold.
#[derive(Debug, Clone)]
pub struct ValidatedBooking {
    pub asset: Asset,
    pub customer: Customer,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// An ACTIVE rental that may be completed or cancelled.
#[derive(Debug, Clone)]
pub struct ValidatedCompletion {
    pub rental: Rental,
}

// =============================================================================
// Checks
// =============================================================================

/// Steps 1 and 2: both dates present, start not in the past, end not before
/// start.
pub fn check_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> CoreResult<(NaiveDate, NaiveDate)> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        (None, _) => return Err(CoreError::invalid_date("start date is required")),
        (_, None) => return Err(CoreError::invalid_date("end date is required")),
    };

    if start < today {
        return Err(CoreError::invalid_date(format!(
            "start date {start} is before today ({today})"
        )));
    }

    if end < start {
        return Err(CoreError::invalid_date(format!(
            "end date {end} is before start date {start}"
        )));
    }

    Ok((start, end))
}

/// Steps 3 and 4: the asset exists and is AVAILABLE.
pub fn check_asset_bookable(asset_id: &str, asset: Option<Asset>) -> CoreResult<Asset> {
    let asset = asset.ok_or_else(|| CoreError::not_found(EntityKind::Asset, asset_id))?;

    if asset.status != AssetStatus::Available {
        return Err(CoreError::AssetUnavailable {
            asset_id: asset.id.clone(),
            status: asset.status.to_string(),
        });
    }

    Ok(asset)
}

/// Step 5: the customer exists.
pub fn check_customer_exists(customer_id: &str, customer: Option<Customer>) -> CoreResult<Customer> {
    customer.ok_or_else(|| CoreError::not_found(EntityKind::Customer, customer_id))
}

/// The rental exists and is ACTIVE.
///
/// `target` is the status the caller intends to move to and only shapes the
/// `IllegalTransition` error.
pub fn check_rental_active(
    rental_id: &str,
    rental: Option<Rental>,
    target: RentalStatus,
) -> CoreResult<Rental> {
    let rental = rental.ok_or_else(|| CoreError::not_found(EntityKind::Rental, rental_id))?;

    if rental.status != RentalStatus::Active {
        return Err(CoreError::IllegalTransition {
            entity: EntityKind::Rental,
            id: rental.id.clone(),
            from: rental.status.to_string(),
            to: target.to_string(),
        });
    }

    Ok(rental)
}
