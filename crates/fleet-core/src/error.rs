//! # Error Types
//!
//! Domain-specific error types for fleet-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  fleet-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── StoreError       - What a store implementation reports            │
//! │                                                                         │
//! │  fleet-db errors (separate crate)                                      │
//! │  └── DbError          - sqlx failures, converted into StoreError       │
//! │                                                                         │
//! │  fleet-engine errors                                                   │
//! │  └── EngineError      - What callers of the coordinator see            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │        DbError → StoreError ────────┴──► EngineError → caller          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Asset,
    Customer,
    Rental,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Asset => write!(f, "Asset"),
            EntityKind::Customer => write!(f, "Customer"),
            EntityKind::Rental => write!(f, "Rental"),
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations.
///
/// Every variant is recoverable: the caller fixes its input (or waits for the
/// world to change) and resubmits.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The end of a date range lies before its start.
    ///
    /// Raised by the pricing calculator.
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A booking date is missing, in the past, or out of order.
    ///
    /// ## When This Occurs
    /// - Start or end date not supplied
    /// - Start date before today
    /// - End date before start date
    #[error("Invalid date: {reason}")]
    InvalidDate { reason: String },

    /// The referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// The asset exists but is not AVAILABLE.
    ///
    /// ## User Workflow
    /// ```text
    /// Staff A books car X ──► X is RESERVED
    /// Staff B books car X ──► AssetUnavailable { status: "RESERVED" }
    ///                         UI shows: "Car is not available for rental"
    /// ```
    #[error("Asset {asset_id} is not available (status: {status})")]
    AssetUnavailable { asset_id: String, status: String },

    /// A status change not allowed by the lifecycle tables.
    #[error("{entity} {id} cannot move from {from} to {to}")]
    IllegalTransition {
        entity: EntityKind,
        id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn invalid_date(reason: impl Into<String>) -> Self {
        CoreError::InvalidDate {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid email, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., license plate already registered).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures reported by store implementations.
///
/// Kept free of any database types so fleet-core stays I/O free; fleet-db
/// converts its `DbError` into this.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write targeted a row that is missing or no longer in the expected state.
    #[error("{entity} {id} was not updated: {reason}")]
    Conflict {
        entity: EntityKind,
        id: String,
        reason: String,
    },

    /// A constraint rejected the write.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Anything else the backend reports (I/O, connection, pool, ...).
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The write failed and undoing it failed too.
    #[error("{cause}; rollback also failed: {rollback}")]
    RollbackFailed {
        cause: Box<StoreError>,
        rollback: Box<StoreError>,
    },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::AssetUnavailable {
            asset_id: "car-1".to_string(),
            status: "RESERVED".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Asset car-1 is not available (status: RESERVED)"
        );

        let err = CoreError::not_found(EntityKind::Customer, "c-9");
        assert_eq!(err.to_string(), "Customer not found: c-9");
    }

    #[test]
    fn test_invalid_range_message() {
        let err = CoreError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: end 2024-01-01 is before start 2024-01-03"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "agent_id".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }

    #[test]
    fn test_rollback_failed_keeps_both_causes() {
        let err = StoreError::RollbackFailed {
            cause: Box::new(StoreError::Backend("disk full".to_string())),
            rollback: Box::new(StoreError::Backend("connection reset".to_string())),
        };
        let msg = err.to_string();
        assert!(msg.contains("disk full"));
        assert!(msg.contains("connection reset"));
    }
}
