//! Device capabilities and canonical permission statuses
//!
//! Raw OS permission enumerations diverge per platform; everything above
//! the bridge layer speaks only the canonical model defined here.

use serde::{Deserialize, Serialize};

/// A device feature gated by OS-level user consent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Camera access
    Camera,
    /// Photo library / gallery access
    PhotoLibrary,
    /// External storage access
    Storage,
    /// Device location
    Location,
    /// Microphone access
    Microphone,
    /// Push/local notifications
    Notifications,
    /// Inbound-message access (OTP capture)
    MessageReceive,
}

impl Capability {
    /// All known capabilities
    pub const ALL: [Capability; 7] = [
        Capability::Camera,
        Capability::PhotoLibrary,
        Capability::Storage,
        Capability::Location,
        Capability::Microphone,
        Capability::Notifications,
        Capability::MessageReceive,
    ];

    /// Human-readable capability name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::PhotoLibrary => "photo library",
            Self::Storage => "storage",
            Self::Location => "location",
            Self::Microphone => "microphone",
            Self::Notifications => "notifications",
            Self::MessageReceive => "message receive",
        }
    }
}

/// Canonical permission status
///
/// `Limited` is the partial-grant some platforms report for media access;
/// it is usable and treated like `Granted` everywhere above the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Fully granted
    Granted,
    /// Partially granted, usable
    Limited,
    /// Denied, but the OS will still show a prompt on request
    Denied,
    /// Permanently denied; the OS suppresses further prompts
    Blocked,
    /// The capability cannot be resolved on this device
    Unavailable,
}

impl PermissionStatus {
    /// Whether the capability can be used right now
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Granted | Self::Limited)
    }
}

/// Latest resolved permission state for one capability
///
/// One per capability per process; overwritten, never appended, on every
/// check or request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionState {
    /// The capability this state describes
    pub capability: Capability,
    /// Canonical status at `checked_at`
    pub status: PermissionStatus,
    /// When the status was resolved (unix millis, UTC)
    pub checked_at: i64,
}

impl PermissionState {
    /// Build a state stamped with the current time
    pub fn now(capability: Capability, status: PermissionStatus) -> Self {
        Self {
            capability,
            status,
            checked_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Result of exactly one request() call for one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequestOutcome {
    /// The capability that was requested
    pub capability: Capability,
    /// Whether the capability is usable after the request
    pub granted: bool,
    /// Whether the OS has permanently suppressed the prompt
    pub blocked: bool,
}

impl PermissionRequestOutcome {
    /// Derive an outcome from a canonical status
    pub fn from_status(capability: Capability, status: PermissionStatus) -> Self {
        Self {
            capability,
            granted: status.is_usable(),
            blocked: status == PermissionStatus::Blocked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_is_usable() {
        assert!(PermissionStatus::Granted.is_usable());
        assert!(PermissionStatus::Limited.is_usable());
        assert!(!PermissionStatus::Denied.is_usable());
        assert!(!PermissionStatus::Blocked.is_usable());
        assert!(!PermissionStatus::Unavailable.is_usable());
    }

    #[test]
    fn outcome_from_status() {
        let o = PermissionRequestOutcome::from_status(
            Capability::Camera,
            PermissionStatus::Blocked,
        );
        assert!(!o.granted);
        assert!(o.blocked);

        let o = PermissionRequestOutcome::from_status(
            Capability::Microphone,
            PermissionStatus::Limited,
        );
        assert!(o.granted);
        assert!(!o.blocked);
    }

    #[test]
    fn state_overwrite_is_by_value() {
        let a = PermissionState::now(Capability::Storage, PermissionStatus::Denied);
        let b = PermissionState::now(Capability::Storage, PermissionStatus::Granted);
        assert_eq!(a.capability, b.capability);
        assert_ne!(a.status, b.status);
    }
}
