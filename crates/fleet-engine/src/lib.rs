//! # fleet-engine: Rental Transaction Engine
//!
//! Books, completes and cancels rentals so that an asset is RESERVED exactly
//! while it has an ACTIVE rental, even under concurrent requests.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           fleet-engine                                  │
//! │                                                                         │
//! │  caller (task A) ─┐                                                     │
//! │  caller (task B) ─┼──► RentalTransactionCoordinator                     │
//! │  caller (task C) ─┘          │                                          │
//! │                              ├── LockRegistry      one lock per asset   │
//! │                              ├── BookingValidator  reads, no writes     │
//! │                              ├── fleet_core        pricing, lifecycles  │
//! │                              └── TransactionalStore                     │
//! │                                     ├── fleet_db::Database (SQLite)    │
//! │                                     └── MemoryStore                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`coordinator`] - The operations callers use
//! - [`validator`] - Booking and completion preconditions
//! - [`lock`] - Per-asset exclusive access
//! - [`memory`] - In-memory store
//! - [`clock`] - Injectable time source
//! - [`config`] - TOML + environment configuration
//! - [`telemetry`] - tracing-subscriber setup
//! - [`error`] - Engine error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleet_engine::{connect, EngineConfig};
//! use fleet_core::BookingRequest;
//!
//! let engine = connect(&EngineConfig::load(None)?).await?;
//! let rental = engine
//!     .create_rental(BookingRequest::new(asset_id, customer_id, "agent-7", start, end))
//!     .await?;
//! engine.complete_rental(&rental.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod lock;
pub mod memory;
pub mod telemetry;
pub mod validator;

// =============================================================================
// Re-exports
// =============================================================================

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::EngineConfig;
pub use coordinator::RentalTransactionCoordinator;
pub use error::{EngineError, EngineResult};
pub use lock::{AssetGuard, LockRegistry};
pub use memory::{MemoryStore, MemoryWriteTx};
pub use validator::BookingValidator;

use std::sync::Arc;

use fleet_db::Database;
use tracing::info;

/// Opens the configured SQLite database (creating it and its directory if
/// needed) and returns a coordinator on the system clock.
pub async fn connect(config: &EngineConfig) -> EngineResult<RentalTransactionCoordinator<Database>> {
    let path = config.database_path();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    info!(path = %path.display(), lock_timeout = ?config.lock_timeout(), "Rental engine ready");

    Ok(RentalTransactionCoordinator::new(Arc::new(db)).with_lock_timeout(config.lock_timeout()))
}
