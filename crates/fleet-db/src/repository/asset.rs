//! # Asset Repository
//!
//! Database operations for assets (the rentable cars).
//!
//! ## Key Operations
//! - Registration with field validation and duplicate-plate detection
//! - Lookups by id, plate and status
//! - Detail and rate edits, and deletion of never-rented assets
//! - Unconditional status updates (the coordinator uses the
//!   compare-and-set writes in `store.rs` instead)

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use fleet_core::validation::validate_new_asset;
use fleet_core::{Asset, AssetStatus, NewAsset, ValidationError};

pub(crate) const ASSET_COLUMNS: &str = r#"
    id, make, model, year, license_plate, color,
    daily_rate_cents, status, created_at, updated_at
"#;

/// Repository for asset database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = AssetRepository::new(pool);
///
/// let camry = repo.insert(&new_asset).await?;
/// let available = repo.list_by_status(AssetStatus::Available).await?;
/// ```
#[derive(Debug, Clone)]
pub struct AssetRepository {
    pool: SqlitePool,
}

impl AssetRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AssetRepository { pool }
    }

    /// Registers a new asset as AVAILABLE.
    ///
    /// ## Returns
    /// * `Ok(Asset)` - The stored asset with generated id and timestamps
    /// * `Err(DbError::Validation)` - A field failed validation, or the plate
    ///   is already registered (`ValidationError::Duplicate`)
    pub async fn insert(&self, new: &NewAsset) -> DbResult<Asset> {
        validate_new_asset(new)?;

        let plate = new.license_plate.trim().to_uppercase();
        if self.get_by_plate(&plate).await?.is_some() {
            return Err(ValidationError::Duplicate {
                field: "license_plate".to_string(),
                value: plate,
            }
            .into());
        }

        let now = Utc::now();
        let asset = Asset {
            id: fleet_core::new_id(),
            make: new.make.trim().to_string(),
            model: new.model.trim().to_string(),
            year: new.year,
            license_plate: plate,
            color: new.color.trim().to_string(),
            daily_rate_cents: new.daily_rate_cents,
            status: AssetStatus::Available,
            created_at: now,
            updated_at: now,
        };

        debug!(plate = %asset.license_plate, "Inserting asset");

        sqlx::query(
            r#"
            INSERT INTO assets (
                id, make, model, year, license_plate, color,
                daily_rate_cents, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&asset.id)
        .bind(&asset.make)
        .bind(&asset.model)
        .bind(asset.year)
        .bind(&asset.license_plate)
        .bind(&asset.color)
        .bind(asset.daily_rate_cents)
        .bind(asset.status)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .execute(&self.pool)
        .await?;

        info!(asset_id = %asset.id, label = %asset.label(), "Asset registered");
        Ok(asset)
    }

    /// Gets an asset by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Asset))` - Asset found
    /// * `Ok(None)` - Asset not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Asset>> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    /// Gets an asset by license plate (stored upper-case).
    pub async fn get_by_plate(&self, plate: &str) -> DbResult<Option<Asset>> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets WHERE license_plate = ?1");
        let asset = sqlx::query_as::<_, Asset>(&sql)
            .bind(plate.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?;

        Ok(asset)
    }

    /// Lists every asset, ordered by make then model.
    pub async fn list(&self) -> DbResult<Vec<Asset>> {
        let sql = format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY make, model, license_plate");
        let assets = sqlx::query_as::<_, Asset>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(assets)
    }

    /// Lists assets in the given status.
    pub async fn list_by_status(&self, status: AssetStatus) -> DbResult<Vec<Asset>> {
        let sql = format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE status = ?1 ORDER BY make, model, license_plate"
        );
        let assets = sqlx::query_as::<_, Asset>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        debug!(status = %status, count = assets.len(), "Listed assets by status");
        Ok(assets)
    }

    /// Replaces an asset's details and daily rate.
    ///
    /// Status is untouched; it only moves through the coordinator. Rentals
    /// already booked keep the total they were priced at.
    ///
    /// ## Returns
    /// * `Ok(Asset)` - The asset as stored after the edit
    /// * `Err(DbError::NotFound)` - No asset with that id
    /// * `Err(DbError::Validation)` - Bad field, or the plate belongs to
    ///   another asset
    pub async fn update(&self, id: &str, changes: &NewAsset) -> DbResult<Asset> {
        validate_new_asset(changes)?;

        let plate = changes.license_plate.trim().to_uppercase();
        if let Some(other) = self.get_by_plate(&plate).await? {
            if other.id != id {
                return Err(ValidationError::Duplicate {
                    field: "license_plate".to_string(),
                    value: plate,
                }
                .into());
            }
        }

        let result = sqlx::query(
            r#"
            UPDATE assets
            SET make = ?2, model = ?3, year = ?4, license_plate = ?5,
                color = ?6, daily_rate_cents = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(changes.make.trim())
        .bind(changes.model.trim())
        .bind(changes.year)
        .bind(&plate)
        .bind(changes.color.trim())
        .bind(changes.daily_rate_cents)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Asset", id));
        }

        info!(asset_id = %id, daily_rate_cents = changes.daily_rate_cents, "Asset updated");
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Asset", id))
    }

    /// Deletes an asset that no rental references.
    ///
    /// ## Returns
    /// * `Ok(true)` - Deleted
    /// * `Ok(false)` - No asset with that id
    /// * `Err(DbError::InUse)` - The asset is RESERVED or has rental history
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        // Guard and delete in one statement, so a booking committing
        // concurrently is either seen by the guard or fails its foreign key.
        let result = sqlx::query(
            r#"
            DELETE FROM assets
            WHERE id = ?1
              AND status != ?2
              AND NOT EXISTS (SELECT 1 FROM rentals WHERE asset_id = ?1)
            "#,
        )
        .bind(id)
        .bind(AssetStatus::Reserved)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(asset_id = %id, "Asset deleted");
            return Ok(true);
        }

        match self.get_by_id(id).await? {
            None => Ok(false),
            Some(asset) if asset.status == AssetStatus::Reserved => {
                Err(DbError::in_use("Asset", id, "reserved by an active rental"))
            }
            Some(_) => Err(DbError::in_use("Asset", id, "has rental history")),
        }
    }

    /// Sets an asset's status without checking the previous one.
    ///
    /// ## Returns
    /// * `Ok(true)` - Row updated
    /// * `Ok(false)` - No asset with that id
    pub async fn update_status(&self, id: &str, status: AssetStatus) -> DbResult<bool> {
        debug!(asset_id = %id, status = %status, "Updating asset status");

        let result = sqlx::query("UPDATE assets SET status = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Like [`update_status`](Self::update_status) but a missing asset is an error.
    pub async fn require_update_status(&self, id: &str, status: AssetStatus) -> DbResult<()> {
        if !self.update_status(id, status).await? {
            return Err(DbError::not_found("Asset", id));
        }
        Ok(())
    }

    /// Counts all assets.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
