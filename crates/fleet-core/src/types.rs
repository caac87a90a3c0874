//! # Domain Types
//!
//! Core domain types used throughout the rental engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Asset       │   │     Rental      │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  asset_id       │   │  id (UUID)      │       │
//! │  │  license_plate  │   │  customer_id  ──┼──►│  email          │       │
//! │  │  daily_rate     │   │  agent_id       │   │  name           │       │
//! │  │  status         │   │  start..=end    │   └─────────────────┘       │
//! │  └─────────────────┘   │  total_cost     │                             │
//! │                        │  status         │                             │
//! │  ┌─────────────────┐   └─────────────────┘   ┌─────────────────┐       │
//! │  │  AssetStatus    │                         │  RentalStatus   │       │
//! │  │  AVAILABLE      │                         │  ACTIVE         │       │
//! │  │  RESERVED       │                         │  COMPLETED      │       │
//! │  │  MAINTENANCE    │                         │  CANCELLED      │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Foreign Keys Only
//! A `Rental` stores the ids of its asset, customer and agent. Any joined view
//! (car description next to customer name) is assembled by the reader on
//! demand and is never part of the rental's identity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Asset Status
// =============================================================================

/// Availability of an asset.
///
/// `RESERVED` means "out on an ACTIVE rental". `MAINTENANCE` is entered and
/// left by fleet staff, never by a rental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetStatus {
    #[default]
    Available,
    Reserved,
    Maintenance,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 3] = [
        AssetStatus::Available,
        AssetStatus::Reserved,
        AssetStatus::Maintenance,
    ];

    /// The persisted text form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "AVAILABLE",
            AssetStatus::Reserved => "RESERVED",
            AssetStatus::Maintenance => "MAINTENANCE",
        }
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the persisted names case-insensitively, plus the legacy `RENTED`.
impl FromStr for AssetStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE" => Ok(AssetStatus::Available),
            "RESERVED" | "RENTED" => Ok(AssetStatus::Reserved),
            "MAINTENANCE" => Ok(AssetStatus::Maintenance),
            _ => Err(ValidationError::InvalidFormat {
                field: "asset status".to_string(),
                reason: format!(
                    "'{}' is not one of AVAILABLE, RESERVED, MAINTENANCE",
                    s.trim()
                ),
            }),
        }
    }
}

// =============================================================================
// Rental Status
// =============================================================================

/// Lifecycle of a rental. COMPLETED and CANCELLED are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum RentalStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 3] = [
        RentalStatus::Active,
        RentalStatus::Completed,
        RentalStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Active => "ACTIVE",
            RentalStatus::Completed => "COMPLETED",
            RentalStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Ok(RentalStatus::Active),
            "COMPLETED" => Ok(RentalStatus::Completed),
            "CANCELLED" | "CANCELED" => Ok(RentalStatus::Cancelled),
            _ => Err(ValidationError::InvalidFormat {
                field: "rental status".to_string(),
                reason: format!(
                    "'{}' is not one of ACTIVE, COMPLETED, CANCELLED",
                    s.trim()
                ),
            }),
        }
    }
}

// =============================================================================
// Asset
// =============================================================================

/// A rentable car.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Asset {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub make: String,
    pub model: String,
    pub year: i32,

    /// Registration plate - business identifier, unique across the fleet.
    pub license_plate: String,

    pub color: String,

    /// Price per rental day in cents.
    pub daily_rate_cents: i64,

    /// Single source of truth for bookability.
    pub status: AssetStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    /// Returns the daily rate as Money.
    #[inline]
    pub fn daily_rate(&self) -> Money {
        Money::from_cents(self.daily_rate_cents)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == AssetStatus::Available
    }

    /// Short human label, e.g. "Toyota Camry 2022 (ABC123)".
    pub fn label(&self) -> String {
        format!(
            "{} {} {} ({})",
            self.make, self.model, self.year, self.license_plate
        )
    }
}

/// Input for registering a new asset.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAsset {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub license_plate: String,
    pub color: String,
    pub daily_rate_cents: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A person who rents assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

// =============================================================================
// Rental
// =============================================================================

/// A booking of one asset by one customer over an inclusive date range.
///
/// ## Invariants
/// - `start_date <= end_date`
/// - `total_cost_cents = daily_rate × ((end_date - start_date) + 1)`,
///   fixed at booking time and never recomputed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Rental {
    pub id: String,
    pub asset_id: String,
    pub customer_id: String,
    /// Staff member who recorded the booking.
    pub agent_id: String,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub total_cost_cents: i64,
    pub status: RentalStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    #[inline]
    pub fn total_cost(&self) -> Money {
        Money::from_cents(self.total_cost_cents)
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == RentalStatus::Active
    }

    /// Number of billed days (inclusive of both boundary days).
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rental() -> Rental {
        let now = Utc::now();
        Rental {
            id: "r-1".to_string(),
            asset_id: "a-1".to_string(),
            customer_id: "c-1".to_string(),
            agent_id: "agent-7".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            total_cost_cents: 15000,
            status: RentalStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_defaults() {
        assert_eq!(AssetStatus::default(), AssetStatus::Available);
        assert_eq!(RentalStatus::default(), RentalStatus::Active);
    }

    #[test]
    fn test_asset_status_parsing() {
        assert_eq!("available".parse::<AssetStatus>().unwrap(), AssetStatus::Available);
        assert_eq!("RENTED".parse::<AssetStatus>().unwrap(), AssetStatus::Reserved);
        assert_eq!(" Maintenance ".parse::<AssetStatus>().unwrap(), AssetStatus::Maintenance);
        assert!("broken".parse::<AssetStatus>().is_err());
    }

    #[test]
    fn test_rental_status_parsing() {
        assert_eq!("canceled".parse::<RentalStatus>().unwrap(), RentalStatus::Cancelled);
        assert!("pending".parse::<RentalStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&AssetStatus::Maintenance).unwrap();
        assert_eq!(json, "\"MAINTENANCE\"");
        let back: RentalStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(back, RentalStatus::Completed);
    }

    #[test]
    fn test_rental_days_and_cost() {
        let rental = sample_rental();
        assert_eq!(rental.days(), 3);
        assert_eq!(rental.total_cost(), Money::from_cents(15000));
        assert!(rental.is_active());
    }
}
