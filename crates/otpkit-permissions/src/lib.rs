//! Native permission bridge, status resolution, and request orchestration
//!
//! The bridge layer talks to platform permission APIs and reports raw,
//! platform-specific statuses. The resolver folds those into the canonical
//! status model and never fails. The orchestrator sequences check, request,
//! rationale, and settings redirect without ever auto-retrying.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
pub mod orchestrator;
pub mod resolver;

pub use bridge::{map_native_status, NativeStatus, PermissionBridge, Platform};
pub use orchestrator::{
    PermissionOrchestrator, PromptUi, RationaleChoice, SettingsChoice,
};
pub use resolver::StatusResolver;

#[cfg(any(test, feature = "test-helpers"))]
pub use bridge::MockBridge;
#[cfg(any(test, feature = "test-helpers"))]
pub use orchestrator::MockPrompt;
