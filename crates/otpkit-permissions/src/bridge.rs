//! Native permission bridge
//!
//! Platform permission APIs report divergent status enumerations; the
//! mapping tables here fold them into the canonical set so nothing above
//! this module ever branches on platform.

use async_trait::async_trait;
use otpkit_core::{Capability, PermissionStatus, Result, SigningInfo};
use serde::{Deserialize, Serialize};

/// Target platform for status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Android-family platform
    Android,
    /// iOS-family platform
    Ios,
}

/// Raw status as reported by a native permission API
///
/// This is the union of both platforms' enumerations; a given platform
/// only ever produces a subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NativeStatus {
    /// The user has never been asked
    NotDetermined,
    /// Authorized for full use
    Authorized,
    /// Authorized for partial use (e.g. selected photos)
    AuthorizedLimited,
    /// Denied, re-promptable
    Denied,
    /// Denied with "don't ask again" / parental restriction semantics
    DeniedForever,
    /// Restricted by device policy
    Restricted,
    /// The capability does not exist on this device
    Unavailable,
}

/// Fold a raw native status into the canonical model
///
/// The only platform divergence is how a hard denial is spelled: Android
/// reports `DeniedForever` after "don't ask again", iOS reports
/// `Restricted`/`Denied` where a denial is always permanent until the user
/// visits settings.
pub fn map_native_status(platform: Platform, native: NativeStatus) -> PermissionStatus {
    match (platform, native) {
        (_, NativeStatus::Authorized) => PermissionStatus::Granted,
        (_, NativeStatus::AuthorizedLimited) => PermissionStatus::Limited,
        (_, NativeStatus::NotDetermined) => PermissionStatus::Denied,
        (_, NativeStatus::Unavailable) => PermissionStatus::Unavailable,
        (_, NativeStatus::DeniedForever) => PermissionStatus::Blocked,
        (Platform::Android, NativeStatus::Denied) => PermissionStatus::Denied,
        (Platform::Android, NativeStatus::Restricted) => PermissionStatus::Blocked,
        // On iOS a past denial never re-prompts; treat it as blocked so the
        // orchestrator goes straight to the settings redirect.
        (Platform::Ios, NativeStatus::Denied) => PermissionStatus::Blocked,
        (Platform::Ios, NativeStatus::Restricted) => PermissionStatus::Blocked,
    }
}

/// Access to the native permission and settings APIs
///
/// `query` must not show a dialog; `request` may show the one-time OS
/// dialog and resolves when it is dismissed. Implementations report
/// failures as `Error::NativeApiFailure`; the resolver downgrades those,
/// they never reach business logic.
#[async_trait]
pub trait PermissionBridge: Send + Sync {
    /// Platform this bridge talks to
    fn platform(&self) -> Platform;

    /// Query current status without prompting
    async fn query(&self, capability: Capability) -> Result<NativeStatus>;

    /// Trigger the native one-time permission dialog
    async fn request(&self, capability: Capability) -> Result<NativeStatus>;

    /// Whether this platform can deliver inbound messages to a listener
    fn supports_message_listening(&self) -> bool {
        self.platform() == Platform::Android
    }

    /// Deep link into the OS settings page for this app
    async fn open_app_settings(&self) -> bool;

    /// Open a generic URL (settings fallback)
    async fn open_url(&self, url: &str) -> bool;

    /// App signing identity, if available on this build
    fn signing_info(&self) -> Option<SigningInfo> {
        None
    }
}

/// Scriptable bridge for tests
///
/// Query/request responses are scripted per capability; every native call
/// is counted so tests can assert on prompt suppression.
#[cfg(any(test, feature = "test-helpers"))]
pub struct MockBridge {
    platform: Platform,
    statuses: parking_lot::Mutex<std::collections::HashMap<Capability, NativeStatus>>,
    /// Status a capability moves to after `request` (simulated user choice)
    granted_on_request: parking_lot::Mutex<std::collections::HashSet<Capability>>,
    fail_query: parking_lot::Mutex<std::collections::HashSet<Capability>>,
    /// Number of `request` calls issued, per capability
    pub request_calls: parking_lot::Mutex<std::collections::HashMap<Capability, u32>>,
    /// Number of settings deep links issued
    pub settings_calls: std::sync::atomic::AtomicU32,
    settings_supported: bool,
    /// URLs opened through the generic fallback
    pub opened_urls: parking_lot::Mutex<Vec<String>>,
    signing: Option<SigningInfo>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MockBridge {
    /// New bridge with every capability `NotDetermined`
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            statuses: parking_lot::Mutex::new(std::collections::HashMap::new()),
            granted_on_request: parking_lot::Mutex::new(std::collections::HashSet::new()),
            fail_query: parking_lot::Mutex::new(std::collections::HashSet::new()),
            request_calls: parking_lot::Mutex::new(std::collections::HashMap::new()),
            settings_calls: std::sync::atomic::AtomicU32::new(0),
            settings_supported: true,
            opened_urls: parking_lot::Mutex::new(Vec::new()),
            signing: None,
        }
    }

    /// Script the current status of a capability
    pub fn set_status(&self, capability: Capability, status: NativeStatus) {
        self.statuses.lock().insert(capability, status);
    }

    /// Script the user granting the capability when the dialog shows
    pub fn grant_on_request(&self, capability: Capability) {
        self.granted_on_request.lock().insert(capability);
    }

    /// Script a native failure for queries of a capability
    pub fn fail_query_for(&self, capability: Capability) {
        self.fail_query.lock().insert(capability);
    }

    /// Disable the settings deep link (forces the URL fallback)
    pub fn without_settings_support(mut self) -> Self {
        self.settings_supported = false;
        self
    }

    /// Attach signing info
    pub fn with_signing(mut self, signing: SigningInfo) -> Self {
        self.signing = Some(signing);
        self
    }

    /// Total `request` calls for a capability
    pub fn request_count(&self, capability: Capability) -> u32 {
        self.request_calls.lock().get(&capability).copied().unwrap_or(0)
    }

    fn current(&self, capability: Capability) -> NativeStatus {
        self.statuses
            .lock()
            .get(&capability)
            .copied()
            .unwrap_or(NativeStatus::NotDetermined)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
#[async_trait]
impl PermissionBridge for MockBridge {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn query(&self, capability: Capability) -> Result<NativeStatus> {
        if self.fail_query.lock().contains(&capability) {
            return Err(otpkit_core::Error::NativeApiFailure(
                "query failed".to_string(),
            ));
        }
        Ok(self.current(capability))
    }

    async fn request(&self, capability: Capability) -> Result<NativeStatus> {
        *self.request_calls.lock().entry(capability).or_insert(0) += 1;
        if self.granted_on_request.lock().contains(&capability) {
            self.statuses.lock().insert(capability, NativeStatus::Authorized);
        } else if self.current(capability) == NativeStatus::NotDetermined {
            self.statuses.lock().insert(capability, NativeStatus::Denied);
        }
        Ok(self.current(capability))
    }

    async fn open_app_settings(&self) -> bool {
        self.settings_calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.settings_supported
    }

    async fn open_url(&self, url: &str) -> bool {
        self.opened_urls.lock().push(url.to_string());
        true
    }

    fn signing_info(&self) -> Option<SigningInfo> {
        self.signing.clone()
    }
}
