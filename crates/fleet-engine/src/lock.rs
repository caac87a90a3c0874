//! # Per-Asset Locks
//!
//! Serialises every mutating operation on one asset while letting operations
//! on different assets run in parallel.
//!
//! ## Registry Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LockRegistry                                                           │
//! │  std::sync::Mutex<HashMap<asset_id, Arc<tokio::sync::Mutex<()>>>>      │
//! │                                                                         │
//! │   "car-1" ──► Arc<Mutex>  ◄── held by booking A                        │
//! │                           ◄── awaited by booking B   (suspends B only) │
//! │   "car-2" ──► Arc<Mutex>  ◄── held by completion C   (runs alongside A)│
//! │                                                                         │
//! │  Entries are created on first use and removed when the last holder     │
//! │  releases with nobody else waiting.                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The outer `std` mutex only guards the map and is never held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// Lazily-populated map of asset id to exclusive lock.
#[derive(Debug, Clone, Default)]
pub struct LockRegistry {
    locks: Arc<Mutex<LockMap>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `asset_id`.
    ///
    /// With `timeout = None` this waits indefinitely. On timeout the caller
    /// holds nothing and gets `LockTimeout`.
    pub async fn acquire(&self, asset_id: &str, timeout: Option<Duration>) -> EngineResult<AssetGuard> {
        let lock = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(asset_id.to_string()).or_default())
        };

        // Prunes on every exit that does not produce a guard, including the
        // caller dropping this future mid-wait.
        let mut pending = PendingWait {
            registry: self,
            asset_id,
            armed: true,
        };

        let started = Instant::now();
        let guard = match timeout {
            None => lock.lock_owned().await,
            Some(limit) => match tokio::time::timeout(limit, lock.lock_owned()).await {
                Ok(guard) => guard,
                Err(_) => {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    warn!(asset_id = %asset_id, waited_ms, "Gave up waiting for asset lock");
                    return Err(EngineError::LockTimeout {
                        asset_id: asset_id.to_string(),
                        waited_ms,
                    });
                }
            },
        };
        pending.armed = false;

        debug!(
            asset_id = %asset_id,
            waited_us = started.elapsed().as_micros() as u64,
            "Asset lock acquired"
        );

        Ok(AssetGuard {
            asset_id: asset_id.to_string(),
            guard: Some(guard),
            registry: self.clone(),
        })
    }

    /// Number of assets that currently have a lock entry.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drops the entry for `asset_id` if the map holds the only reference.
    fn prune(&self, asset_id: &str) {
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(lock) = map.get(asset_id) {
            if Arc::strong_count(lock) == 1 {
                map.remove(asset_id);
            }
        }
    }
}

/// Live while `acquire` waits. The in-flight `lock_owned` future is a
/// temporary of the inner scope and is dropped before this, so `prune` sees
/// the waiter's reference gone.
struct PendingWait<'a> {
    registry: &'a LockRegistry,
    asset_id: &'a str,
    armed: bool,
}

impl Drop for PendingWait<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.registry.prune(self.asset_id);
        }
    }
}

/// Exclusive access to one asset. Released on drop.
#[derive(Debug)]
pub struct AssetGuard {
    asset_id: String,
    guard: Option<OwnedMutexGuard<()>>,
    registry: LockRegistry,
}

impl AssetGuard {
    pub fn asset_id(&self) -> &str {
        &self.asset_id
    }
}

impl Drop for AssetGuard {
    fn drop(&mut self) {
        // Release first so the strong count reflects only other holders/waiters.
        drop(self.guard.take());
        self.registry.prune(&self.asset_id);
        debug!(asset_id = %self.asset_id, "Asset lock released");
    }
}
