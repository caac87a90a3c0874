//! End-to-end rental flows against an in-memory SQLite database.

mod common;

use common::{date, sqlite_fixture};
use fleet_core::{AssetStatus, BookingRequest, CoreError, EntityKind, Money, RentalStatus};
use fleet_engine::EngineError;

#[tokio::test]
async fn test_booking_reserves_asset_and_prices_inclusively() {
    let f = sqlite_fixture().await;

    let rental = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-7",
            date(2024, 1, 1),
            date(2024, 1, 3),
        ))
        .await
        .unwrap();

    assert_eq!(rental.total_cost(), Money::from_cents(15000));
    assert_eq!(rental.status, RentalStatus::Active);
    assert_eq!(rental.agent_id, "agent-7");

    let db = f.engine.store();
    let asset = db.assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Reserved);
    assert_eq!(db.rentals().count_active_for_asset(&f.camry.id).await.unwrap(), 1);

    let stored = db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
    assert_eq!(stored, rental);
    assert_eq!(stored.total_cost_cents, 15000);
    assert_eq!(stored.start_date, date(2024, 1, 1));
    assert_eq!(stored.end_date, date(2024, 1, 3));
    assert_eq!(asset.updated_at, rental.created_at);
}

#[tokio::test]
async fn test_single_day_booking_costs_one_day() {
    let f = sqlite_fixture().await;

    let rental = f
        .engine
        .create_rental(BookingRequest::new(
            &f.focus.id,
            &f.jane.id,
            "agent-1",
            date(2024, 1, 1),
            date(2024, 1, 1),
        ))
        .await
        .unwrap();

    assert_eq!(rental.total_cost(), Money::from_cents(4000));
    let asset = f.engine.store().assets().get_by_id(&f.focus.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Reserved);
}

#[tokio::test]
async fn test_booking_reserved_asset_changes_nothing() {
    let f = sqlite_fixture().await;
    f.engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-1",
            date(2024, 1, 2),
            date(2024, 1, 5),
        ))
        .await
        .unwrap();

    let err = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.jane.id,
            "agent-2",
            date(2024, 1, 10),
            date(2024, 1, 12),
        ))
        .await
        .unwrap_err();

    assert!(err.is_asset_unavailable());
    let db = f.engine.store();
    assert_eq!(db.rentals().count().await.unwrap(), 1);
    assert_eq!(db.rentals().list_by_customer(&f.jane.id).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_invalid_requests_write_nothing() {
    let f = sqlite_fixture().await;

    // End before start.
    let err = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-1",
            date(2024, 1, 5),
            date(2024, 1, 3),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(CoreError::InvalidDate { .. })));

    // Start in the past.
    let err = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-1",
            date(2023, 12, 31),
            date(2024, 1, 3),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(CoreError::InvalidDate { .. })));

    // Missing end date.
    let mut request = BookingRequest::new(
        &f.camry.id,
        &f.john.id,
        "agent-1",
        date(2024, 1, 2),
        date(2024, 1, 3),
    );
    request.end_date = None;
    let err = f.engine.create_rental(request).await.unwrap_err();
    assert!(matches!(err.as_domain(), Some(CoreError::InvalidDate { .. })));

    // Unknown customer.
    let err = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            "no-such-customer",
            "agent-1",
            date(2024, 1, 2),
            date(2024, 1, 3),
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::NotFound { entity: EntityKind::Customer, .. })
    ));

    let db = f.engine.store();
    assert_eq!(db.rentals().count().await.unwrap(), 0);
    let asset = db.assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Available);
}

#[tokio::test]
async fn test_complete_frees_asset_once() {
    let f = sqlite_fixture().await;
    let rental = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-1",
            date(2024, 1, 1),
            date(2024, 1, 3),
        ))
        .await
        .unwrap();

    let completed = f.engine.complete_rental(&rental.id).await.unwrap();
    assert_eq!(completed.status, RentalStatus::Completed);
    assert_eq!(completed.total_cost_cents, rental.total_cost_cents);

    let db = f.engine.store();
    let stored = db.rentals().get_by_id(&rental.id).await.unwrap().unwrap();
    assert_eq!(stored, completed);
    let asset = db.assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Available);
    assert_eq!(asset.updated_at, completed.updated_at);

    let err = f.engine.complete_rental(&rental.id).await.unwrap_err();
    assert!(err.is_illegal_transition());

    // The freed asset can be booked again.
    f.engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.jane.id,
            "agent-2",
            date(2024, 1, 4),
            date(2024, 1, 4),
        ))
        .await
        .unwrap();
    assert_eq!(db.rentals().count_active_for_asset(&f.camry.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_complete_unknown_rental() {
    let f = sqlite_fixture().await;
    let err = f.engine.complete_rental("no-such-rental").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Domain(CoreError::NotFound { entity: EntityKind::Rental, .. })
    ));
}

#[tokio::test]
async fn test_cancel_releases_asset() {
    let f = sqlite_fixture().await;
    let rental = f
        .engine
        .create_rental(BookingRequest::new(
            &f.focus.id,
            &f.john.id,
            "agent-1",
            date(2024, 2, 1),
            date(2024, 2, 7),
        ))
        .await
        .unwrap();

    let cancelled = f.engine.cancel_rental(&rental.id).await.unwrap();
    assert_eq!(cancelled.status, RentalStatus::Cancelled);

    let db = f.engine.store();
    assert_eq!(db.rentals().get_by_id(&rental.id).await.unwrap().unwrap(), cancelled);
    assert_eq!(
        db.rentals().list_by_status(RentalStatus::Cancelled).await.unwrap().len(),
        1
    );
    let asset = db.assets().get_by_id(&f.focus.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Available);
}

#[tokio::test]
async fn test_quote_is_idempotent_and_read_only() {
    let f = sqlite_fixture().await;

    let first = f
        .engine
        .compute_quote(&f.camry.id, date(2024, 3, 1), date(2024, 3, 7))
        .await
        .unwrap();
    let second = f
        .engine
        .compute_quote(&f.camry.id, date(2024, 3, 1), date(2024, 3, 7))
        .await
        .unwrap();

    assert_eq!(first, Money::from_cents(35000));
    assert_eq!(first, second);

    let err = f
        .engine
        .compute_quote(&f.camry.id, date(2024, 3, 7), date(2024, 3, 1))
        .await
        .unwrap_err();
    assert!(matches!(err.as_domain(), Some(CoreError::InvalidRange { .. })));

    let db = f.engine.store();
    assert_eq!(db.rentals().count().await.unwrap(), 0);
    let asset = db.assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Available);
    assert_eq!(f.engine.locks().tracked(), 0);
}

#[tokio::test]
async fn test_maintenance_blocks_booking() {
    let f = sqlite_fixture().await;

    let asset = f.engine.set_maintenance(&f.camry.id, true).await.unwrap();
    assert_eq!(asset.status, AssetStatus::Maintenance);
    let stored = f.engine.store().assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(stored, asset);

    let err = f
        .engine
        .create_rental(BookingRequest::new(
            &f.camry.id,
            &f.john.id,
            "agent-1",
            date(2024, 1, 2),
            date(2024, 1, 2),
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_domain(),
        Some(CoreError::AssetUnavailable { status, .. }) if status == "MAINTENANCE"
    ));

    f.engine.set_maintenance(&f.camry.id, false).await.unwrap();
    let db = f.engine.store();
    let asset = db.assets().get_by_id(&f.camry.id).await.unwrap().unwrap();
    assert_eq!(asset.status, AssetStatus::Available);
}
