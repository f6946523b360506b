//! Permission status resolution
//!
//! `check` is a pure query: no dialog, no error. Whatever the bridge does,
//! the caller gets back a concrete canonical status; native failures are
//! logged and resolved to `Unavailable`.

use crate::bridge::{map_native_status, PermissionBridge};
use otpkit_core::{Capability, PermissionState, PermissionStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves raw bridge statuses into canonical permission states
///
/// Keeps the latest state per capability; every check or request overwrites
/// the previous entry.
pub struct StatusResolver {
    bridge: Arc<dyn PermissionBridge>,
    cache: Mutex<HashMap<Capability, PermissionState>>,
}

impl StatusResolver {
    /// Create a resolver over a bridge
    pub fn new(bridge: Arc<dyn PermissionBridge>) -> Self {
        Self {
            bridge,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Query current status for a capability
    ///
    /// Never fails: a bridge error resolves to `Unavailable` with a warning
    /// logged as a side effect.
    pub async fn check(&self, capability: Capability) -> PermissionState {
        let status = match self.bridge.query(capability).await {
            Ok(native) => map_native_status(self.bridge.platform(), native),
            Err(e) => {
                warn!(
                    "Native permission query failed for {}: {}, resolving to unavailable",
                    capability.label(),
                    e
                );
                PermissionStatus::Unavailable
            }
        };

        debug!("Permission check: {} -> {:?}", capability.label(), status);
        self.record(capability, status)
    }

    /// Record a freshly resolved status, overwriting the previous state
    pub(crate) fn record(
        &self,
        capability: Capability,
        status: PermissionStatus,
    ) -> PermissionState {
        let state = PermissionState::now(capability, status);
        self.cache.lock().insert(capability, state.clone());
        state
    }

    /// Last resolved state for a capability, if any check has run
    pub fn last_known(&self, capability: Capability) -> Option<PermissionState> {
        self.cache.lock().get(&capability).cloned()
    }
}
