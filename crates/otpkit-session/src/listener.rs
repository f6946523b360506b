//! Native inbound-message listener abstraction
//!
//! The platform delivers message bodies to at most one registered
//! listener. Registrations carry ids so the session machine can pair every
//! acquire with exactly one release.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// An inbound message as delivered by the platform
///
/// Ephemeral: consumed by the extractor once and discarded regardless of
/// match outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw message body
    pub body: String,
    /// Delivery timestamp (unix millis, UTC)
    pub received_at: i64,
}

impl InboundMessage {
    /// Build a message stamped with the current time
    pub fn now(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            received_at: Utc::now().timestamp_millis(),
        }
    }
}

/// Callback receiving delivered messages
pub type MessageSink = Box<dyn Fn(InboundMessage) + Send + Sync>;

/// Handle for one live native registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerRegistration {
    /// Registration id assigned by the listener implementation
    pub id: u64,
}

/// The native message-listening resource
///
/// Implementations wrap the platform API. `register` installs the sink and
/// starts delivery; `unregister` stops it. The session machine guarantees
/// it never holds more than one registration at a time; implementations do
/// not need their own single-slot enforcement.
pub trait MessageListener: Send + Sync {
    /// Whether this platform can deliver inbound messages at all
    fn is_supported(&self) -> bool;

    /// Install a sink and begin delivery
    fn register(&self, sink: MessageSink) -> otpkit_core::Result<ListenerRegistration>;

    /// Stop delivery for a registration
    fn unregister(&self, registration: ListenerRegistration);
}
