//! # Engine Error Types
//!
//! What callers of the coordinator see.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Domain      │  │   Transaction   │  │      Environment        │ │
//! │  │  (CoreError)    │  │                 │  │                         │ │
//! │  │  InvalidDate    │  │  TransactionFa- │  │  Config                 │ │
//! │  │  NotFound       │  │  iled{cause}    │  │  Database (startup)     │ │
//! │  │  Unavailable    │  │  Storage (read) │  │                         │ │
//! │  │  IllegalTrans.  │  │  LockTimeout    │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Domain errors are raised before any write. Transaction errors are     │
//! │  raised after a rollback (or a failed one, see StoreError).            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use fleet_core::{CoreError, StoreError, ValidationError};
use fleet_db::DbError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Domain Errors
    // =========================================================================
    /// A business rule rejected the request. Nothing was written.
    #[error(transparent)]
    Domain(#[from] CoreError),

    // =========================================================================
    // Transaction Errors
    // =========================================================================
    /// The atomic write phase failed. Its writes were rolled back unless
    /// `cause` is `StoreError::RollbackFailed`.
    #[error("{operation} failed: {cause}")]
    TransactionFailed {
        operation: &'static str,
        cause: StoreError,
    },

    /// A read outside the write phase failed.
    #[error("Storage error: {0}")]
    Storage(StoreError),

    /// Another operation held the asset for longer than the configured wait.
    #[error("Timed out after {waited_ms} ms waiting for asset {asset_id}")]
    LockTimeout { asset_id: String, waited_ms: u64 },

    // =========================================================================
    // Environment Errors
    // =========================================================================
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl EngineError {
    pub fn transaction_failed(operation: &'static str, cause: StoreError) -> Self {
        EngineError::TransactionFailed { operation, cause }
    }

    /// The wrapped domain error, if any.
    pub fn as_domain(&self) -> Option<&CoreError> {
        match self {
            EngineError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// True for `AssetUnavailable`, the error a losing concurrent booking gets.
    pub fn is_asset_unavailable(&self) -> bool {
        matches!(self, EngineError::Domain(CoreError::AssetUnavailable { .. }))
    }

    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, EngineError::Domain(CoreError::IllegalTransition { .. }))
    }

    /// Returns true if resubmitting the same request may succeed.
    ///
    /// ## Retryable Errors
    /// - Lock waits that timed out
    /// - Write phases that lost a race or hit a transient backend failure
    ///
    /// Nothing is retried automatically; this only guides the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            EngineError::LockTimeout { .. } => true,
            EngineError::TransactionFailed { cause, .. } | EngineError::Storage(cause) => matches!(
                cause,
                StoreError::Conflict { .. } | StoreError::Backend(_)
            ),
            _ => false,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Domain(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_core::EntityKind;

    #[test]
    fn test_domain_errors_display_transparently() {
        let err: EngineError = CoreError::AssetUnavailable {
            asset_id: "car-1".into(),
            status: "RESERVED".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Asset car-1 is not available (status: RESERVED)");
        assert!(err.is_asset_unavailable());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_errors() {
        assert!(EngineError::LockTimeout {
            asset_id: "car-1".into(),
            waited_ms: 50
        }
        .is_retryable());

        let conflict = EngineError::transaction_failed(
            "create_rental",
            StoreError::Conflict {
                entity: EntityKind::Asset,
                id: "car-1".into(),
                reason: "status changed".into(),
            },
        );
        assert!(conflict.is_retryable());

        let constraint =
            EngineError::transaction_failed("create_rental", StoreError::Constraint("fk".into()));
        assert!(!constraint.is_retryable());
        assert!(!EngineError::Config("bad".into()).is_retryable());
    }

    #[test]
    fn test_transaction_failed_message_names_operation() {
        let err = EngineError::transaction_failed(
            "complete_rental",
            StoreError::Backend("disk I/O error".into()),
        );
        assert_eq!(
            err.to_string(),
            "complete_rental failed: Storage backend error: disk I/O error"
        );
    }
}
