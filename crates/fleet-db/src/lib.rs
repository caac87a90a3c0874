//! # fleet-db: Database Layer for the Rental Engine
//!
//! SQLite persistence for assets, customers and rentals, plus the
//! implementation of `fleet-core`'s store traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Fleet Data Flow                                  │
//! │                                                                         │
//! │  RentalTransactionCoordinator (fleet-engine)                           │
//! │       │ TransactionalStore / WriteTransaction                           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     fleet-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  asset.rs     │    │  (embedded)  │  │   │
//! │  │   │               │◄───│  customer.rs  │    │ 001_initial  │  │   │
//! │  │   │  SqlitePool   │    │  rental.rs    │    │   _schema    │  │   │
//! │  │   └───────▲───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────┴───────┐                                             │   │
//! │  │   │   store.rs    │  store traits + SqliteWriteTx               │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//! - [`store`] - Store traits over SQLite transactions
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fleet_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./fleet.db")).await?;
//!
//! let camry = db.assets().insert(&new_asset).await?;
//! let active = db.rentals().count_active_for_asset(&camry.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use store::SqliteWriteTx;

pub use repository::asset::AssetRepository;
pub use repository::customer::CustomerRepository;
pub use repository::rental::RentalRepository;
