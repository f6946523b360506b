//! View models for the entry surface
//!
//! Pure derivations of session snapshots; no business logic lives here.

use otpkit_session::{ErrorReason, SessionSnapshot, SessionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the masked numeric entry surface renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpFieldView {
    /// Session this view was derived from
    pub session_id: Uuid,
    /// Session status driving the rendering
    pub status: SessionStatus,
    /// Instruction line shown above the field
    pub instructions_text: String,
    /// Captured code, present exactly when the session matched
    pub extracted_value: Option<String>,
    /// Whether a countdown should be visible
    ///
    /// Only `Listening` shows a timer; timeout and error outcomes revert
    /// to manual entry with no timer and no alarming dialog.
    pub show_timer: bool,
}

impl From<&SessionSnapshot> for OtpFieldView {
    fn from(snapshot: &SessionSnapshot) -> Self {
        Self {
            session_id: snapshot.id,
            status: snapshot.status,
            instructions_text: instructions_for(snapshot).to_string(),
            extracted_value: snapshot.extracted_value.clone(),
            show_timer: snapshot.status == SessionStatus::Listening,
        }
    }
}

fn instructions_for(snapshot: &SessionSnapshot) -> &'static str {
    match snapshot.status {
        SessionStatus::Idle => "Enter the verification code we sent you.",
        SessionStatus::CheckingPermission => "Getting ready to detect your code…",
        SessionStatus::Listening => {
            "Waiting for your verification code. You can also type it in."
        }
        SessionStatus::Matched => "Code detected.",
        SessionStatus::TimedOut | SessionStatus::Stopped => {
            "Enter the verification code we sent you."
        }
        SessionStatus::Error => match snapshot.error_reason {
            Some(ErrorReason::PermissionBlocked) => {
                "Automatic detection is turned off. Allow message access in Settings, or enter the code manually."
            }
            _ => "Enter the verification code we sent you.",
        },
    }
}
