//! Permission request orchestration
//!
//! Sequences check, native request, rationale, and settings redirect.
//! Retries are bounded to explicit user action; the orchestrator never
//! loops on its own, so a denial can never become a re-prompt cycle.

use crate::bridge::{map_native_status, PermissionBridge};
use crate::resolver::StatusResolver;
use async_trait::async_trait;
use futures::future::join_all;
use otpkit_core::{Capability, PermissionRequestOutcome, PermissionStatus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fallback URL when the settings deep link is unsupported
pub const SETTINGS_FALLBACK_URL: &str = "app-settings:";

/// User choice on a rationale dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RationaleChoice {
    /// User asked to be prompted again
    Retry,
    /// User declined
    Cancel,
}

/// User choice on a settings-redirect dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsChoice {
    /// User asked to open OS settings
    OpenSettings,
    /// User declined
    Cancel,
}

/// Host-provided dialogs
///
/// The orchestrator only sequences; the host renders the actual UI and
/// reports the user's choice.
#[async_trait]
pub trait PromptUi: Send + Sync {
    /// Explain why the capability is needed; resolves with the user's choice
    async fn show_rationale(&self, text: &str) -> RationaleChoice;

    /// Offer a jump to OS settings for a blocked capability
    async fn show_settings_redirect(&self, text: &str) -> SettingsChoice;
}

/// Sequences permission checks, requests, and remediation
pub struct PermissionOrchestrator {
    bridge: Arc<dyn PermissionBridge>,
    resolver: StatusResolver,
    prompt: Arc<dyn PromptUi>,
}

impl PermissionOrchestrator {
    /// Create an orchestrator over a bridge and host dialogs
    pub fn new(bridge: Arc<dyn PermissionBridge>, prompt: Arc<dyn PromptUi>) -> Self {
        Self {
            resolver: StatusResolver::new(bridge.clone()),
            bridge,
            prompt,
        }
    }

    /// The resolver backing this orchestrator
    pub fn resolver(&self) -> &StatusResolver {
        &self.resolver
    }

    /// Request a capability, explaining and remediating as needed
    ///
    /// Returns `true` once the capability is usable. Shows no native prompt
    /// when the status is already usable, and none at all when it is
    /// blocked (the OS would silently swallow the dialog); a blocked
    /// capability gets the settings redirect instead. After a plain
    /// denial the rationale is shown once, and one more native request is
    /// issued only if the user explicitly asks to retry.
    pub async fn request_with_rationale(
        &self,
        capability: Capability,
        rationale_text: &str,
        settings_text: &str,
    ) -> bool {
        let state = self.resolver.check(capability).await;
        match state.status {
            s if s.is_usable() => return true,
            PermissionStatus::Unavailable => {
                debug!("{} unavailable, skipping request", capability.label());
                return false;
            }
            PermissionStatus::Blocked => {
                // Re-invoking the native request here would be a silent
                // no-op; offer the settings path instead.
                info!("{} is blocked, offering settings redirect", capability.label());
                if self.prompt.show_settings_redirect(settings_text).await
                    == SettingsChoice::OpenSettings
                {
                    self.open_settings().await;
                }
                return false;
            }
            _ => {}
        }

        let outcome = self.request(capability).await;
        if outcome.granted {
            return true;
        }
        if outcome.blocked {
            info!("{} became blocked after request", capability.label());
            if self.prompt.show_settings_redirect(settings_text).await
                == SettingsChoice::OpenSettings
            {
                self.open_settings().await;
            }
            return false;
        }

        // Denied but still promptable. One retry, gated on the user
        // explicitly asking for it.
        if self.prompt.show_rationale(rationale_text).await == RationaleChoice::Retry {
            return self.request(capability).await.granted;
        }
        false
    }

    /// Issue at most one native request for a capability
    ///
    /// A blocked capability resolves as `blocked=true` immediately with
    /// zero native prompt calls: the OS suppresses the dialog after a
    /// permanent denial, and issuing the call anyway would mislead the
    /// caller into thinking a prompt occurred. Failures degrade to an
    /// unavailable outcome; callers branch on the outcome record, never on
    /// an error.
    pub async fn request(&self, capability: Capability) -> PermissionRequestOutcome {
        let state = self.resolver.check(capability).await;
        if state.status == PermissionStatus::Blocked {
            debug!("{} is blocked, skipping native request", capability.label());
            return PermissionRequestOutcome::from_status(capability, PermissionStatus::Blocked);
        }

        let status = match self.bridge.request(capability).await {
            Ok(native) => map_native_status(self.bridge.platform(), native),
            Err(e) => {
                warn!("Native request failed for {}: {}", capability.label(), e);
                PermissionStatus::Unavailable
            }
        };
        self.resolver.record(capability, status);
        debug!("Permission request: {} -> {:?}", capability.label(), status);
        PermissionRequestOutcome::from_status(capability, status)
    }

    /// Request several capabilities, aggregating per-capability outcomes
    ///
    /// Fails soft: a denied or blocked subset produces outcomes for the
    /// caller to branch on, never an error. Capabilities target independent
    /// OS state, so the requests run concurrently. Already-usable and
    /// blocked capabilities produce their outcome without a native prompt.
    pub async fn request_batch(
        &self,
        capabilities: &[Capability],
    ) -> HashMap<Capability, PermissionRequestOutcome> {
        let outcomes = join_all(capabilities.iter().map(|&capability| async move {
            let state = self.resolver.check(capability).await;
            let outcome = match state.status {
                s if s.is_usable() => PermissionRequestOutcome::from_status(capability, s),
                PermissionStatus::Blocked | PermissionStatus::Unavailable => {
                    PermissionRequestOutcome::from_status(capability, state.status)
                }
                _ => self.request(capability).await,
            };
            (capability, outcome)
        }))
        .await;

        let map: HashMap<_, _> = outcomes.into_iter().collect();
        let granted = map.values().filter(|o| o.granted).count();
        info!(
            "Batch permission request: {}/{} granted",
            granted,
            map.len()
        );
        map
    }

    /// Open OS settings for manual permission remediation
    ///
    /// Falls back to a generic settings URL when the deep link is not
    /// supported on this device.
    pub async fn open_settings(&self) -> bool {
        if self.bridge.open_app_settings().await {
            return true;
        }
        warn!("Settings deep link unsupported, falling back to generic URL");
        self.bridge.open_url(SETTINGS_FALLBACK_URL).await
    }
}

/// Scripted prompt for tests; records every dialog shown
#[cfg(any(test, feature = "test-helpers"))]
pub struct MockPrompt {
    rationale_choice: RationaleChoice,
    settings_choice: SettingsChoice,
    /// Rationale texts shown, in order
    pub rationales_shown: parking_lot::Mutex<Vec<String>>,
    /// Settings-redirect texts shown, in order
    pub settings_shown: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl MockPrompt {
    /// Prompt that always answers with the given choices
    pub fn answering(rationale: RationaleChoice, settings: SettingsChoice) -> Arc<Self> {
        Arc::new(Self {
            rationale_choice: rationale,
            settings_choice: settings,
            rationales_shown: parking_lot::Mutex::new(Vec::new()),
            settings_shown: parking_lot::Mutex::new(Vec::new()),
        })
    }

    /// Prompt that cancels everything
    pub fn declining() -> Arc<Self> {
        Self::answering(RationaleChoice::Cancel, SettingsChoice::Cancel)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
#[async_trait]
impl PromptUi for MockPrompt {
    async fn show_rationale(&self, text: &str) -> RationaleChoice {
        self.rationales_shown.lock().push(text.to_string());
        self.rationale_choice
    }

    async fn show_settings_redirect(&self, text: &str) -> SettingsChoice {
        self.settings_shown.lock().push(text.to_string());
        self.settings_choice
    }
}
