//! Permission gate for session start
//!
//! The session machine only needs a yes/no/why answer for the
//! message-receive capability; dialogs and retries stay with the
//! orchestrator and the host surface.

use async_trait::async_trait;
use otpkit_core::{Capability, PermissionStatus};
use otpkit_permissions::PermissionOrchestrator;
use std::sync::Arc;

/// Outcome of the capability check at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Capability is usable, the session may listen
    Granted,
    /// Denied; the caller may re-request and start again
    Denied,
    /// Permanently denied; only a settings change can fix it
    Blocked,
    /// The capability cannot be resolved on this device
    Unavailable,
}

/// Decides whether a session may acquire the message listener
#[async_trait]
pub trait PermissionGate: Send + Sync {
    /// Check (and if sensible, request) message-receive access
    async fn ensure_message_access(&self) -> GateDecision;
}

/// Gate backed by the permission orchestrator
///
/// Checks current status first; a plain denial gets exactly one native
/// request. Blocked never prompts — the surface owns the settings
/// redirect, the session just reports the reason.
pub struct OrchestratorGate {
    orchestrator: Arc<PermissionOrchestrator>,
}

impl OrchestratorGate {
    /// Wrap an orchestrator
    pub fn new(orchestrator: Arc<PermissionOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl PermissionGate for OrchestratorGate {
    async fn ensure_message_access(&self) -> GateDecision {
        let state = self
            .orchestrator
            .resolver()
            .check(Capability::MessageReceive)
            .await;
        match state.status {
            s if s.is_usable() => return GateDecision::Granted,
            PermissionStatus::Blocked => return GateDecision::Blocked,
            PermissionStatus::Unavailable => return GateDecision::Unavailable,
            _ => {}
        }

        let outcome = self.orchestrator.request(Capability::MessageReceive).await;
        if outcome.granted {
            GateDecision::Granted
        } else if outcome.blocked {
            GateDecision::Blocked
        } else {
            GateDecision::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otpkit_permissions::{MockBridge, MockPrompt, NativeStatus, Platform};

    fn gate(bridge: Arc<MockBridge>) -> OrchestratorGate {
        OrchestratorGate::new(Arc::new(PermissionOrchestrator::new(
            bridge,
            MockPrompt::declining(),
        )))
    }

    #[tokio::test]
    async fn granted_without_prompt_when_already_usable() {
        let bridge = Arc::new(MockBridge::new(Platform::Android));
        bridge.set_status(Capability::MessageReceive, NativeStatus::Authorized);
        let gate = gate(bridge.clone());

        assert_eq!(gate.ensure_message_access().await, GateDecision::Granted);
        assert_eq!(bridge.request_count(Capability::MessageReceive), 0);
    }

    #[tokio::test]
    async fn blocked_reports_without_prompt() {
        let bridge = Arc::new(MockBridge::new(Platform::Android));
        bridge.set_status(Capability::MessageReceive, NativeStatus::DeniedForever);
        let gate = gate(bridge.clone());

        assert_eq!(gate.ensure_message_access().await, GateDecision::Blocked);
        assert_eq!(bridge.request_count(Capability::MessageReceive), 0);
    }

    #[tokio::test]
    async fn denied_issues_one_request() {
        let bridge = Arc::new(MockBridge::new(Platform::Android));
        let gate = gate(bridge.clone());

        assert_eq!(gate.ensure_message_access().await, GateDecision::Denied);
        assert_eq!(bridge.request_count(Capability::MessageReceive), 1);
    }

    #[tokio::test]
    async fn denied_then_granted_when_user_accepts_prompt() {
        let bridge = Arc::new(MockBridge::new(Platform::Android));
        bridge.grant_on_request(Capability::MessageReceive);
        let gate = gate(bridge.clone());

        assert_eq!(gate.ensure_message_access().await, GateDecision::Granted);
        assert_eq!(bridge.request_count(Capability::MessageReceive), 1);
    }
}
