//! OTP listening sessions
//!
//! A session is a bounded, single-use listening window: it checks the
//! message-receive capability, registers the one native message listener
//! the process may hold, and waits for a matching message or a timeout.
//! The state machine is the sole owner of the listener and the timer, and
//! the sole arbiter of whether a late native event is honored.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gate;
pub mod listener;
pub mod session;

pub use gate::{GateDecision, OrchestratorGate, PermissionGate};
pub use listener::{InboundMessage, ListenerRegistration, MessageListener, MessageSink};
pub use session::{
    ErrorReason, OtpSessionConfig, OtpSessionMachine, SessionSnapshot, SessionStatus,
    DEFAULT_TIMEOUT,
};
