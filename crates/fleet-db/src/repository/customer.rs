//! # Customer Repository
//!
//! Database operations for customers. Emails are stored lower-case and are
//! unique.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use fleet_core::validation::validate_new_customer;
use fleet_core::{Customer, NewCustomer, RentalStatus, ValidationError};

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, address, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Registers a new customer.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - Stored customer
    /// * `Err(DbError::Validation)` - Bad field, or email already registered
    pub async fn insert(&self, new: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(new)?;

        let email = new.email.trim().to_lowercase();
        if self.get_by_email(&email).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "email".to_string(),
                value: email,
            }
            .into());
        }

        let customer = Customer {
            id: fleet_core::new_id(),
            name: new.name.trim().to_string(),
            email,
            phone: new.phone.trim().to_string(),
            address: new.address.trim().to_string(),
            created_at: Utc::now(),
        };

        debug!(email = %customer.email, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.created_at)
        .execute(&self.pool)
        .await?;

        info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Looks a customer up by email, case-insensitively.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Lists every customer by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY name, email");
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Replaces a customer's contact details.
    ///
    /// ## Returns
    /// * `Ok(Customer)` - The customer as stored after the edit
    /// * `Err(DbError::NotFound)` - No customer with that id
    /// * `Err(DbError::Validation)` - Bad field, or the email belongs to
    ///   another customer
    pub async fn update(&self, id: &str, changes: &NewCustomer) -> DbResult<Customer> {
        validate_new_customer(changes)?;

        let email = changes.email.trim().to_lowercase();
        if let Some(other) = self.get_by_email(&email).await? {
            if other.id != id {
                return Err(ValidationError::Duplicate {
                    field: "email".to_string(),
                    value: email,
                }
                .into());
            }
        }

        let result = sqlx::query(
            "UPDATE customers SET name = ?2, email = ?3, phone = ?4, address = ?5 WHERE id = ?1",
        )
        .bind(id)
        .bind(changes.name.trim())
        .bind(&email)
        .bind(changes.phone.trim())
        .bind(changes.address.trim())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        info!(customer_id = %id, "Customer updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer with no rentals on record.
    ///
    /// ## Returns
    /// * `Ok(true)` - Deleted
    /// * `Ok(false)` - No customer with that id
    /// * `Err(DbError::InUse)` - The customer has an ACTIVE rental or history
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM customers
            WHERE id = ?1
              AND NOT EXISTS (SELECT 1 FROM rentals WHERE customer_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(customer_id = %id, "Customer deleted");
            return Ok(true);
        }

        if self.get_by_id(id).await?.is_none() {
            return Ok(false);
        }

        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rentals WHERE customer_id = ?1 AND status = ?2",
        )
        .bind(id)
        .bind(RentalStatus::Active)
        .fetch_one(&self.pool)
        .await?;

        let reason = if active > 0 {
            "has an active rental"
        } else {
            "has rental history"
        };
        Err(DbError::in_use("Customer", id, reason))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
