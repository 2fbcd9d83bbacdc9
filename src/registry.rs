// src/registry.rs

use crate::index::DeviceIndex;
use once_cell::sync::Lazy;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Shared holder for the current `DeviceIndex`.
///
/// Readers take an `Arc` snapshot and keep using it for as long as they like;
/// `replace` swaps in a freshly built index wholesale, so a lookup never sees
/// a half-built one.
pub struct DeviceRegistry {
    current: RwLock<Arc<DeviceIndex>>,
}

impl DeviceRegistry {
    pub fn new(index: DeviceIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn snapshot(&self) -> Arc<DeviceIndex> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `index` and return the one it replaced.
    pub fn replace(&self, index: DeviceIndex) -> Arc<DeviceIndex> {
        let next = Arc::new(index);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, next);
        info!(
            devices = guard.len(),
            brands = guard.brands().len(),
            previous_devices = previous.len(),
            "device index replaced"
        );
        previous
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new(DeviceIndex::default())
    }
}

/// Process-wide state, initialized once on first load, replaced wholesale on
/// refresh, never mutated in place. Starts out empty.
static GLOBAL: Lazy<DeviceRegistry> = Lazy::new(DeviceRegistry::default);

pub fn global() -> &'static DeviceRegistry {
    &GLOBAL
}
