//! Booking and completion preconditions checked against a live store.
//!
//! The rules themselves live in `fleet_core::booking`; this module loads the
//! entities they need, in the order the rules are evaluated, so a request that
//! fails early never costs a later read.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use fleet_core::booking::{
    check_asset_bookable, check_customer_exists, check_dates, check_rental_active,
};
use fleet_core::{
    AssetStore, CustomerStore, RentalStatus, RentalStore, ValidatedBooking, ValidatedCompletion,
};

use crate::clock::Clock;
use crate::error::{EngineError, EngineResult};

pub struct BookingValidator<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for BookingValidator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> BookingValidator<S>
where
    S: AssetStore + CustomerStore + RentalStore,
{
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Checks, in order: dates present and not in the past, end not before
    /// start, asset exists, asset AVAILABLE, customer exists.
    pub async fn validate_booking(
        &self,
        asset_id: &str,
        customer_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> EngineResult<ValidatedBooking> {
        let (start_date, end_date) = check_dates(start_date, end_date, self.clock.today())?;

        let asset = self
            .store
            .get_asset(asset_id)
            .await
            .map_err(EngineError::Storage)?;
        let asset = check_asset_bookable(asset_id, asset)?;

        let customer = self
            .store
            .get_customer(customer_id)
            .await
            .map_err(EngineError::Storage)?;
        let customer = check_customer_exists(customer_id, customer)?;

        debug!(asset_id = %asset_id, customer_id = %customer_id, "Booking preconditions hold");

        Ok(ValidatedBooking {
            asset,
            customer,
            start_date,
            end_date,
        })
    }

    /// The rental exists and is ACTIVE, so it may be completed.
    pub async fn validate_completion(&self, rental_id: &str) -> EngineResult<ValidatedCompletion> {
        self.validate_termination(rental_id, RentalStatus::Completed)
            .await
    }

    /// Like [`validate_completion`](Self::validate_completion) for any
    /// terminal `target`; the target only shapes the error.
    pub async fn validate_termination(
        &self,
        rental_id: &str,
        target: RentalStatus,
    ) -> EngineResult<ValidatedCompletion> {
        let rental = self
            .store
            .get_rental(rental_id)
            .await
            .map_err(EngineError::Storage)?;
        let rental = check_rental_active(rental_id, rental, target)?;

        Ok(ValidatedCompletion { rental })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::memory::MemoryStore;
    use fleet_core::{AssetStatus, CoreError, EntityKind, NewAsset, NewCustomer};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        validator: BookingValidator<MemoryStore>,
        asset_id: String,
        customer_id: String,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let asset = store
            .register_asset(&NewAsset {
                make: "Honda".to_string(),
                model: "Civic".to_string(),
                year: 2021,
                license_plate: "XYZ789".to_string(),
                color: "Blue".to_string(),
                daily_rate_cents: 4500,
            })
            .unwrap();
        let customer = store
            .register_customer(&NewCustomer {
                name: "Jane Smith".to_string(),
                email: "jane@example.com".to_string(),
                phone: "098-765-4321".to_string(),
                address: "456 Oak Ave, Town".to_string(),
            })
            .unwrap();

        let validator = BookingValidator::new(
            Arc::clone(&store),
            Arc::new(FixedClock::on(date(2024, 1, 1))),
        );

        Fixture {
            store,
            validator,
            asset_id: asset.id,
            customer_id: customer.id,
        }
    }

    #[tokio::test]
    async fn test_valid_booking_passes() {
        let f = fixture();
        let ok = f
            .validator
            .validate_booking(
                &f.asset_id,
                &f.customer_id,
                Some(date(2024, 1, 1)),
                Some(date(2024, 1, 3)),
            )
            .await
            .unwrap();

        assert_eq!(ok.asset.id, f.asset_id);
        assert_eq!(ok.customer.id, f.customer_id);
        assert_eq!(ok.end_date, date(2024, 1, 3));
    }

    #[tokio::test]
    async fn test_past_start_is_invalid_date() {
        let f = fixture();
        let err = f
            .validator
            .validate_booking(
                &f.asset_id,
                &f.customer_id,
                Some(date(2023, 12, 31)),
                Some(date(2024, 1, 2)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidDate { .. })));
    }

    #[tokio::test]
    async fn test_reversed_dates_checked_before_asset() {
        let f = fixture();
        // Unknown asset too, but the date rule fires first.
        let err = f
            .validator
            .validate_booking(
                "missing",
                &f.customer_id,
                Some(date(2024, 1, 5)),
                Some(date(2024, 1, 2)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err.as_domain(), Some(CoreError::InvalidDate { .. })));
    }

    #[tokio::test]
    async fn test_missing_entities() {
        let f = fixture();
        let start = Some(date(2024, 1, 2));

        let err = f
            .validator
            .validate_booking("missing", &f.customer_id, start, start)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::NotFound { entity: EntityKind::Asset, .. })
        ));

        let err = f
            .validator
            .validate_booking(&f.asset_id, "nobody", start, start)
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::NotFound { entity: EntityKind::Customer, .. })
        ));
    }

    #[tokio::test]
    async fn test_reserved_asset_is_unavailable() {
        let f = fixture();
        f.store
            .update_asset_status(&f.asset_id, AssetStatus::Reserved)
            .await
            .unwrap();

        let err = f
            .validator
            .validate_booking(
                &f.asset_id,
                &f.customer_id,
                Some(date(2024, 1, 2)),
                Some(date(2024, 1, 2)),
            )
            .await
            .unwrap_err();
        assert!(err.is_asset_unavailable());
    }

    #[tokio::test]
    async fn test_completion_of_unknown_rental() {
        let f = fixture();
        let err = f.validator.validate_completion("r-404").await.unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(CoreError::NotFound { entity: EntityKind::Rental, .. })
        ));
    }
}
