//! OTP session state machine
//!
//! Owns the single native listening registration and the timeout timer.
//! Every transition happens under one lock, and the timer and registration
//! are always released together in the same critical section, so a timer
//! can never outlive a match and a listener can never outlive its session.
//!
//! Native delivery and the timer are both asynchronous; each carries the
//! generation of the session that armed it, and an event whose generation
//! no longer matches the live state is discarded without side effect.

use crate::gate::{GateDecision, PermissionGate};
use crate::listener::{InboundMessage, ListenerRegistration, MessageListener, MessageSink};
use chrono::Utc;
use otpkit_core::OtpPattern;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default listening window
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// No session activity yet
    Idle,
    /// Resolving the message-receive capability
    CheckingPermission,
    /// Listener registered, waiting for a match or the timeout
    Listening,
    /// A message matched; the value has been captured
    Matched,
    /// The window elapsed without a match
    TimedOut,
    /// The session could not reach listening
    Error,
    /// Explicitly stopped
    Stopped,
}

impl SessionStatus {
    /// Whether this status ends the session
    ///
    /// Terminal statuses only ever move to `Stopped`, never back to
    /// `Listening`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Matched | Self::TimedOut | Self::Error | Self::Stopped
        )
    }
}

/// Why a session ended in `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorReason {
    /// This platform has no inbound-message listening
    Unsupported,
    /// Message-receive was denied (re-requestable)
    PermissionDenied,
    /// Message-receive is permanently denied
    PermissionBlocked,
    /// The native bridge failed during acquisition
    NativeFailure,
}

impl ErrorReason {
    /// Stable string form for hosts that key on the reason
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::PermissionDenied => "permission_denied",
            Self::PermissionBlocked => "permission_blocked",
            Self::NativeFailure => "native_failure",
        }
    }
}

/// Configuration for one listening session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSessionConfig {
    /// Listening window before the session times out
    pub timeout: Duration,
    /// Pattern a message body must satisfy
    pub pattern: OtpPattern,
    /// Whether automatic capture is enabled at all
    pub enabled: bool,
}

impl Default for OtpSessionConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            pattern: OtpPattern::default(),
            enabled: true,
        }
    }
}

/// Point-in-time view of a session, published on every transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session id
    pub id: Uuid,
    /// Current status
    pub status: SessionStatus,
    /// Captured code, present only from `Matched` on
    pub extracted_value: Option<String>,
    /// Reason when status is `Error`
    pub error_reason: Option<ErrorReason>,
    /// When the session started (unix millis, UTC)
    pub started_at: i64,
}

impl SessionSnapshot {
    fn idle() -> Self {
        Self {
            id: Uuid::nil(),
            status: SessionStatus::Idle,
            extracted_value: None,
            error_reason: None,
            started_at: 0,
        }
    }
}

struct MachineState {
    id: Uuid,
    /// Bumped on every start; events from older generations are stale
    generation: u64,
    status: SessionStatus,
    pattern: OtpPattern,
    extracted_value: Option<String>,
    error_reason: Option<ErrorReason>,
    started_at: i64,
    /// The single live native registration, if listening
    registration: Option<ListenerRegistration>,
    timer: Option<JoinHandle<()>>,
}

impl MachineState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            status: self.status,
            extracted_value: self.extracted_value.clone(),
            error_reason: self.error_reason,
            started_at: self.started_at,
        }
    }
}

struct Inner {
    gate: Arc<dyn PermissionGate>,
    listener: Arc<dyn MessageListener>,
    state: Mutex<MachineState>,
    watch_tx: watch::Sender<SessionSnapshot>,
}

/// The OTP session state machine
///
/// Exactly one session may be live per machine; starting a new one
/// implicitly stops and releases the previous one (last-start-wins).
/// Cloneable; clones share the same single-slot state.
///
/// Hosts call `stop()` on their own teardown path: an orphaned native
/// registration keeps delivering callbacks into a machine whose owner is
/// gone. Dropping the last clone releases whatever is still held.
#[derive(Clone)]
pub struct OtpSessionMachine {
    inner: Arc<Inner>,
}

impl OtpSessionMachine {
    /// Create a machine over a permission gate and the native listener
    pub fn new(gate: Arc<dyn PermissionGate>, listener: Arc<dyn MessageListener>) -> Self {
        let (watch_tx, _) = watch::channel(SessionSnapshot::idle());
        Self {
            inner: Arc::new(Inner {
                gate,
                listener,
                state: Mutex::new(MachineState {
                    id: Uuid::nil(),
                    generation: 0,
                    status: SessionStatus::Idle,
                    pattern: OtpPattern::default(),
                    extracted_value: None,
                    error_reason: None,
                    started_at: 0,
                    registration: None,
                    timer: None,
                }),
                watch_tx,
            }),
        }
    }

    /// Start a listening session
    ///
    /// Releases any still-active prior session first, then walks
    /// `CheckingPermission` into `Listening`, or into `Error` when the
    /// platform or the capability refuses. The returned snapshot is the
    /// session's state at the end of the start attempt.
    pub async fn start(&self, config: OtpSessionConfig) -> SessionSnapshot {
        let (id, generation, started_at) = {
            let mut st = self.inner.state.lock();
            Inner::teardown_locked(&self.inner.listener, &mut st);

            st.generation += 1;
            st.id = Uuid::new_v4();
            st.started_at = Utc::now().timestamp_millis();
            st.pattern = config.pattern.clone();
            st.extracted_value = None;
            st.error_reason = None;

            if !config.enabled {
                debug!(session = %st.id, "Capture disabled, session stopped immediately");
                st.status = SessionStatus::Stopped;
                let snapshot = st.snapshot();
                self.inner.publish(snapshot.clone());
                return snapshot;
            }

            st.status = SessionStatus::CheckingPermission;
            let snapshot = st.snapshot();
            self.inner.publish(snapshot);
            (st.id, st.generation, st.started_at)
        };

        info!(session = %id, "Starting OTP session");

        if !self.inner.listener.is_supported() {
            info!(session = %id, "Message listening unsupported on this platform");
            return self
                .inner
                .fail(id, generation, started_at, ErrorReason::Unsupported);
        }

        match self.inner.gate.ensure_message_access().await {
            GateDecision::Granted => {}
            GateDecision::Denied => {
                return self
                    .inner
                    .fail(id, generation, started_at, ErrorReason::PermissionDenied)
            }
            GateDecision::Blocked => {
                return self
                    .inner
                    .fail(id, generation, started_at, ErrorReason::PermissionBlocked)
            }
            GateDecision::Unavailable => {
                return self
                    .inner
                    .fail(id, generation, started_at, ErrorReason::Unsupported)
            }
        }

        let mut st = self.inner.state.lock();
        if st.generation != generation || st.status != SessionStatus::CheckingPermission {
            // A newer start superseded this one while the permission
            // dialog was open; it owns the listener now.
            debug!(session = %id, "Start superseded before listening");
            return SessionSnapshot {
                id,
                status: SessionStatus::Stopped,
                extracted_value: None,
                error_reason: None,
                started_at,
            };
        }

        let weak = Arc::downgrade(&self.inner);
        let sink: MessageSink = Box::new(move |message| {
            if let Some(inner) = weak.upgrade() {
                inner.on_message(generation, message);
            }
        });

        match self.inner.listener.register(sink) {
            Ok(registration) => {
                st.registration = Some(registration);
                st.timer = Some(self.spawn_timer(generation, config.timeout));
                st.status = SessionStatus::Listening;
                info!(session = %id, timeout_ms = config.timeout.as_millis() as u64, "Listening for verification code");
                let snapshot = st.snapshot();
                self.inner.publish(snapshot.clone());
                snapshot
            }
            Err(e) => {
                warn!(session = %id, "Listener registration failed: {}", e);
                st.status = SessionStatus::Error;
                st.error_reason = Some(ErrorReason::NativeFailure);
                let snapshot = st.snapshot();
                self.inner.publish(snapshot.clone());
                snapshot
            }
        }
    }

    /// Stop the session
    ///
    /// Callable from any state and any number of times; when nothing is
    /// held, no native call is made.
    pub fn stop(&self) -> SessionSnapshot {
        let mut st = self.inner.state.lock();
        if st.status == SessionStatus::Stopped {
            return st.snapshot();
        }

        Inner::teardown_locked(&self.inner.listener, &mut st);
        st.status = SessionStatus::Stopped;
        debug!(session = %st.id, "Session stopped");
        let snapshot = st.snapshot();
        self.inner.publish(snapshot.clone());
        snapshot
    }

    /// Current session state
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().snapshot()
    }

    /// Subscribe to session transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.watch_tx.subscribe()
    }

    fn spawn_timer(&self, generation: u64, timeout: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(inner) = weak.upgrade() {
                inner.on_timeout(generation);
            }
        })
    }
}

impl Inner {
    /// Release the registration and the timer together
    ///
    /// The two are never released independently: this is the only place
    /// either leaves the state, and it runs with the state lock held.
    fn teardown_locked(listener: &Arc<dyn MessageListener>, st: &mut MachineState) {
        if let Some(registration) = st.registration.take() {
            listener.unregister(registration);
        }
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }
    }

    fn fail(
        &self,
        id: Uuid,
        generation: u64,
        started_at: i64,
        reason: ErrorReason,
    ) -> SessionSnapshot {
        let mut st = self.state.lock();
        if st.generation != generation || st.status != SessionStatus::CheckingPermission {
            debug!(session = %id, "Failure outcome for superseded start discarded");
            return SessionSnapshot {
                id,
                status: SessionStatus::Stopped,
                extracted_value: None,
                error_reason: None,
                started_at,
            };
        }

        st.status = SessionStatus::Error;
        st.error_reason = Some(reason);
        info!(session = %id, reason = reason.as_str(), "Session failed to reach listening");
        let snapshot = st.snapshot();
        self.publish(snapshot.clone());
        snapshot
    }

    /// Native delivery callback; the state machine decides whether the
    /// event is honored
    fn on_message(&self, generation: u64, message: InboundMessage) {
        let mut st = self.state.lock();
        if st.generation != generation || st.status != SessionStatus::Listening {
            debug!("Discarding stale inbound message event");
            return;
        }

        let Some(value) = st.pattern.extract(&message.body) else {
            // Not an error; keep listening until a match or the timeout.
            debug!(session = %st.id, "Inbound message did not match, still listening");
            return;
        };

        Self::teardown_locked(&self.listener, &mut st);
        st.status = SessionStatus::Matched;
        st.extracted_value = Some(value);
        info!(session = %st.id, "Verification code captured");
        let snapshot = st.snapshot();
        self.publish(snapshot);
    }

    fn on_timeout(&self, generation: u64) {
        let mut st = self.state.lock();
        if st.generation != generation || st.status != SessionStatus::Listening {
            debug!("Discarding stale timeout event");
            return;
        }

        Self::teardown_locked(&self.listener, &mut st);
        st.status = SessionStatus::TimedOut;
        info!(session = %st.id, "Listening window elapsed without a match");
        let snapshot = st.snapshot();
        self.publish(snapshot);
    }

    fn publish(&self, snapshot: SessionSnapshot) {
        self.watch_tx.send_replace(snapshot);
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let st = self.state.get_mut();
        let registration = st.registration.take();
        let timer = st.timer.take();
        if let Some(registration) = registration {
            self.listener.unregister(registration);
        }
        if let Some(timer) = timer {
            timer.abort();
        }
    }
}
