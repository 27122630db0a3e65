//! Serialization of requests that touch the same record.
//!
//! The core does no locking of its own: every load, gateway call, and save
//! for one project must run under that project's lock. Project creation
//! runs under the owner's lock so the plan's project cap holds.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sitegen_core::types::DbId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of one async mutex per id.
#[derive(Debug, Default)]
pub struct IdLocks {
    locks: Mutex<HashMap<DbId, Arc<AsyncMutex<()>>>>,
}

impl IdLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `id`. Held until the guard drops.
    pub async fn acquire(&self, id: DbId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries nobody holds or waits on.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }

    /// Ids with a live lock. Exposed for tests.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
