//! # Validation Module
//!
//! Field validation for registering assets and customers.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure field rules)                               │
//! │  ├── Required / length checks                                          │
//! │  ├── Plate and email format                                            │
//! │  └── Year and daily rate ranges                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: fleet-db repositories                                        │
//! │  └── Duplicate plate / email lookups                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── CHECK constraints on status columns                               │
//! │  ├── UNIQUE(license_plate), UNIQUE(email)                              │
//! │  └── Foreign keys from rentals                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fleet_core::validation::{validate_license_plate, validate_year};
//!
//! validate_license_plate("ABC 123").unwrap();
//! validate_year(2022).unwrap();
//! assert!(validate_year(1850).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewAsset, NewCustomer};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted make, model or color.
pub const MAX_DESCRIPTOR_LEN: usize = 50;

/// Longest accepted license plate.
pub const MAX_PLATE_LEN: usize = 20;

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

// =============================================================================
// String Validators
// =============================================================================

fn require<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value)
}

/// Validates a descriptive asset attribute such as make, model or color.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
pub fn validate_descriptor(field: &str, value: &str) -> ValidationResult<()> {
    let value = require(field, value)?;

    if value.chars().count() > MAX_DESCRIPTOR_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_DESCRIPTOR_LEN,
        });
    }

    Ok(())
}

/// Validates a license plate.
///
/// ## Rules
/// - Must not be empty
/// - At most 20 characters
/// - Letters, digits, hyphens and spaces only
///
/// ## Example
/// ```rust
/// use fleet_core::validation::validate_license_plate;
///
/// assert!(validate_license_plate("XYZ-789").is_ok());
/// assert!(validate_license_plate("").is_err());
/// assert!(validate_license_plate("AB#12").is_err());
/// ```
pub fn validate_license_plate(plate: &str) -> ValidationResult<()> {
    let plate = require("license_plate", plate)?;

    if plate.chars().count() > MAX_PLATE_LEN {
        return Err(ValidationError::TooLong {
            field: "license_plate".to_string(),
            max: MAX_PLATE_LEN,
        });
    }

    if !plate
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == ' ')
    {
        return Err(ValidationError::InvalidFormat {
            field: "license_plate".to_string(),
            reason: "must contain only letters, numbers, hyphens, and spaces".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Deliberately loose: one `@`, a non-empty local part, and a domain with a
/// dot that neither starts nor ends the domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = require("email", email)?;

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a model year (1900..=2100).
pub fn validate_year(year: i32) -> ValidationResult<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: MIN_YEAR as i64,
            max: MAX_YEAR as i64,
        });
    }
    Ok(())
}

/// Validates a daily rate in cents. Registration requires a positive rate.
pub fn validate_daily_rate_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "daily_rate".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates the staff identifier attached to a booking.
pub fn validate_agent_id(agent_id: &str) -> ValidationResult<()> {
    require("agent_id", agent_id).map(|_| ())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of an asset registration, stopping at the first
/// failure in form order.
pub fn validate_new_asset(asset: &NewAsset) -> ValidationResult<()> {
    validate_descriptor("make", &asset.make)?;
    validate_descriptor("model", &asset.model)?;
    validate_year(asset.year)?;
    validate_license_plate(&asset.license_plate)?;
    validate_descriptor("color", &asset.color)?;
    validate_daily_rate_cents(asset.daily_rate_cents)?;
    Ok(())
}

/// Validates every field of a customer registration.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    require("name", &customer.name)?;
    validate_email(&customer.email)?;
    require("phone", &customer.phone)?;
    require("address", &customer.address)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
