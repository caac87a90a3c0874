//! # Repository Module
//!
//! Database repository implementations for the fleet database.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  Seed binary / engine read side                                        │
//! │       │                                                                 │
//! │       │  db.assets().list_by_status(AssetStatus::Available)            │
//! │       ▼                                                                 │
//! │  AssetRepository                                                       │
//! │  ├── insert(&self, new_asset)                                          │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_status(&self, status)                                     │
//! │  ├── update(&self, id, changes) / delete(&self, id)                    │
//! │  └── update_status(&self, id, status)                                  │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  The coordinator never calls these directly: it goes through the store │
//! │  traits in `store.rs`, which reuse the same SQL.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`asset::AssetRepository`] - Asset registration, edits, lookups, status
//! - [`customer::CustomerRepository`] - Customer registration, edits, lookups
//! - [`rental::RentalRepository`] - Rental read side, date-range reports, status updates

pub mod asset;
pub mod customer;
pub mod rental;
