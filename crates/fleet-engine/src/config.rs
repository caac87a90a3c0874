//! # Engine Configuration
//!
//! Where the database lives and how long operations wait for each other.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FLEET_DB_PATH=/var/lib/fleet/fleet.db                              │
//! │     FLEET_DB_MAX_CONNECTIONS=8                                         │
//! │     FLEET_LOCK_TIMEOUT_MS=5000                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rental/engine.toml (Linux)                               │
//! │     ~/Library/Application Support/com.fleet.rental/engine.toml (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     database in the platform data dir, unbounded lock waits            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/fleet/fleet.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//! idle_timeout_secs = 600
//!
//! [locking]
//! wait_timeout_ms = 5000   # omit for unbounded waits
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use fleet_db::DbConfig;

use crate::error::{EngineError, EngineResult};

const CONFIG_FILE: &str = "engine.toml";
const DB_FILE: &str = "fleet.db";

// =============================================================================
// Database Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `fleet.db` in the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections kept open while idle.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle connections above `min_connections` close after this long.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

// =============================================================================
// Locking Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockingSettings {
    /// Longest wait for another operation on the same asset.
    /// `None` waits as long as it takes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timeout_ms: Option<u64>,
}

// =============================================================================
// Engine Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub locking: LockingSettings,
}

impl EngineConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, else the platform config dir)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> EngineResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> EngineResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| EngineError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.database.max_connections == 0 {
            return Err(EngineError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(EngineError::Config(
                "database.min_connections must not exceed database.max_connections".into(),
            ));
        }

        if self.database.connect_timeout_secs == 0 {
            return Err(EngineError::Config(
                "database.connect_timeout_secs must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(EngineError::Config("database.path must not be empty".into()));
            }
        }

        if self.locking.wait_timeout_ms == Some(0) {
            return Err(EngineError::Config(
                "locking.wait_timeout_ms must be greater than 0 (omit it to wait indefinitely)"
                    .into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies `FLEET_*` overrides read through `lookup`. Unparseable values
    /// are logged and ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("FLEET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("FLEET_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %max, "Ignoring invalid FLEET_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(timeout) = lookup("FLEET_LOCK_TIMEOUT_MS") {
            match timeout.parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding lock wait timeout from environment");
                    self.locking.wait_timeout_ms = Some(ms);
                }
                Err(_) => warn!(value = %timeout, "Ignoring invalid FLEET_LOCK_TIMEOUT_MS"),
            }
        }
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fleet", "rental")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The configured database file, else `fleet.db` in the platform data
    /// directory, else `./fleet.db`.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }

        directories::ProjectDirs::from("com", "fleet", "rental")
            .map(|dirs| dirs.data_dir().join(DB_FILE))
            .unwrap_or_else(|| Path::new(".").join(DB_FILE))
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path())
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.database.idle_timeout_secs))
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.locking.wait_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.connect_timeout_secs, 30);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.idle_timeout_secs, 600);
        assert_eq!(config.lock_timeout(), None);
        assert!(config.validate().is_ok());
        assert!(config.database_path().ends_with(DB_FILE));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            [locking]
            wait_timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.lock_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.path, None);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("FLEET_DB_PATH", "/tmp/other.db"),
            ("FLEET_DB_MAX_CONNECTIONS", "not-a-number"),
            ("FLEET_LOCK_TIMEOUT_MS", "1500"),
        ]
        .into_iter()
        .collect();

        let mut config = EngineConfig::default();
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/tmp/other.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.lock_timeout(), Some(Duration::from_millis(1500)));

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(db.max_connections, 5);
    }

    #[test]
    fn test_pool_settings_reach_db_config() {
        let config: EngineConfig = toml::from_str(
            r#"
            [database]
            path = "/srv/fleet.db"
            max_connections = 8
            min_connections = 2
            idle_timeout_secs = 120
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.min_connections, 2);
        assert_eq!(db.connect_timeout, Duration::from_secs(30));
        assert_eq!(db.idle_timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_validation() {
        let mut config = EngineConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));

        let mut config = EngineConfig::default();
        config.database.path = Some(PathBuf::new());
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.database.min_connections = 6;
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));

        let mut config = EngineConfig::default();
        config.locking.wait_timeout_ms = Some(0);
        assert!(matches!(config.validate(), Err(EngineError::Config(_))));
        config.locking.wait_timeout_ms = Some(1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_lock_timeout_from_environment_is_rejected() {
        let mut config = EngineConfig::default();
        config.apply_overrides_from(|key| (key == "FLEET_LOCK_TIMEOUT_MS").then(|| "0".to_string()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("fleet-config-{}", fleet_core::new_id()))
            .join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.database.path = Some(PathBuf::from("/srv/fleet.db"));
        config.locking.wait_timeout_ms = Some(5000);
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[database]"));
        assert!(contents.contains("[locking]"));

        let loaded: EngineConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_bad_file_is_config_error() {
        let dir = std::env::temp_dir().join(format!("fleet-config-{}", fleet_core::new_id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "[database]\nmax_connections = \"many\"\n").unwrap();

        let err = EngineConfig::load(Some(path)).unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
