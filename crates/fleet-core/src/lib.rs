//! # fleet-core: Pure Business Logic for the Rental Engine
//!
//! Everything the rental engine decides without touching the outside world:
//! prices, status transitions, booking preconditions, field validation, and the
//! traits through which the engine reaches storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fleet Rental Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 fleet-engine (orchestration)                    │   │
//! │  │   RentalTransactionCoordinator ── BookingValidator ── locks     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ fleet-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌───────────┐ ┌─────────┐ ┌───────┐  │   │
//! │  │   │  types  │ │ pricing │ │ lifecycle │ │ booking │ │ store │  │   │
//! │  │   │  money  │ │         │ │           │ │         │ │traits │  │   │
//! │  │   └─────────┘ └─────────┘ └───────────┘ └─────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │ implemented by                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    fleet-db (SQLite)                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Asset, Customer, Rental and their status enums
//! - [`money`] - Integer-cent `Money`
//! - [`pricing`] - `compute_cost` over an inclusive date range
//! - [`lifecycle`] - Asset and rental state machines
//! - [`booking`] - Booking and completion preconditions
//! - [`validation`] - Registration field rules
//! - [`store`] - Persistence traits
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleet_core::{compute_cost, Money};
//!
//! let rate = Money::from_cents(4000); // $40.00 per day
//! let day = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//!
//! // A same-day return is billed as one day
//! assert_eq!(compute_cost(rate, day, day).unwrap(), rate);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use booking::{BookingRequest, ValidatedBooking, ValidatedCompletion};
pub use error::{CoreError, CoreResult, EntityKind, StoreError, StoreResult, ValidationError};
pub use lifecycle::{AssetLifecycle, RentalLifecycle};
pub use money::Money;
pub use pricing::{compute_cost, rental_days};
pub use store::{AssetStore, CustomerStore, RentalStore, TransactionalStore, WriteTransaction};
pub use types::*;

/// Generates a new entity identifier (UUID v4, hyphenated).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
