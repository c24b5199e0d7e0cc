//! Events delivered to the session controller

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;

use vigil_core::ActivityKind;

/// Everything that can move the session state machine
///
/// Timer events carry the arm generation they were scheduled under; the
/// controller drops any whose generation has been superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Qualifying user interaction
    Activity { kind: ActivityKind, at: Instant },
    /// Idle time reached the warning deadline
    WarningDue { generation: u64 },
    /// Idle time reached the logout deadline
    LogoutDue { generation: u64 },
    /// Countdown refresh while the warning is shown
    Tick { generation: u64 },
    /// User asked to stay logged in
    ContinueSession,
    /// User asked to log out immediately
    LogoutNow,
}

/// Handle a presenter uses to relay user intents to the controller
#[derive(Debug, Clone)]
pub struct SessionIntents {
    sender: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionIntents {
    pub(crate) fn new(sender: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { sender }
    }

    /// "Continue session" was chosen
    pub fn continue_session(&self) {
        self.send(SessionEvent::ContinueSession);
    }

    /// "Logout now" was chosen
    pub fn logout_now(&self) {
        self.send(SessionEvent::LogoutNow);
    }

    fn send(&self, event: SessionEvent) {
        if self.sender.send(event).is_err() {
            debug!("Session controller gone, dropping {:?}", event);
        }
    }
}
