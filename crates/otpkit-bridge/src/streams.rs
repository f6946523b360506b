//! View streams for the entry surface
//!
//! Forwards session transitions as view updates; the stream ends when the
//! surface drops its receiver or the session machine goes away.

use crate::models::OtpFieldView;
use otpkit_session::{OtpSessionMachine, SessionSnapshot};
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Current view derived from the machine's live state
pub fn current_view(machine: &OtpSessionMachine) -> OtpFieldView {
    OtpFieldView::from(&machine.snapshot())
}

/// Stream of view updates, one per session transition
///
/// The first item is the current state; every subsequent item is emitted
/// on change. Dropping the receiver tears the forwarding task down.
pub fn view_stream(machine: &OtpSessionMachine) -> mpsc::Receiver<OtpFieldView> {
    forward(machine.subscribe())
}

fn forward(mut rx: watch::Receiver<SessionSnapshot>) -> mpsc::Receiver<OtpFieldView> {
    let (tx, out) = mpsc::channel(16);

    tokio::spawn(async move {
        let initial = OtpFieldView::from(&rx.borrow_and_update().clone());
        if tx.send(initial).await.is_err() {
            return;
        }

        while rx.changed().await.is_ok() {
            let view = OtpFieldView::from(&rx.borrow_and_update().clone());
            if tx.send(view).await.is_err() {
                break;
            }
        }

        debug!("OTP view stream ended");
    });

    out
}
