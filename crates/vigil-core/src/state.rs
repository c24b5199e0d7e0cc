//! Session state model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an authenticated session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// User is considered present; idle timers are armed
    Active,
    /// Countdown to forced logout is visible
    Warning,
    /// Session has ended; terminal
    Terminated,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`
    ///
    /// The only permitted regression is `Warning -> Active`.
    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Active, Active)
                | (Active, Warning)
                | (Active, Terminated)
                | (Warning, Warning)
                | (Warning, Active)
                | (Warning, Terminated)
        )
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Active => "active",
            SessionState::Warning => "warning",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Why a session was terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Idle countdown ran out
    IdleTimeout,
    /// Bearer token expired or could not be decoded
    TokenExpired,
    /// User chose to log out
    UserLogout,
    /// Owning component was torn down
    Teardown,
}

impl TerminationReason {
    /// User-facing notice shown after termination
    pub fn notice(&self) -> &'static str {
        match self {
            TerminationReason::IdleTimeout => "You have been logged out due to inactivity",
            TerminationReason::TokenExpired => "Your session has expired, please log in again",
            TerminationReason::UserLogout => "You have been logged out",
            TerminationReason::Teardown => "Session closed",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::IdleTimeout => "idle timeout",
            TerminationReason::TokenExpired => "token expired",
            TerminationReason::UserLogout => "user logout",
            TerminationReason::Teardown => "teardown",
        };
        f.write_str(name)
    }
}

/// Everything a presenter needs to draw the warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WarningView {
    pub visible: bool,
    pub seconds_remaining: u64,
}

impl WarningView {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn countdown(seconds_remaining: u64) -> Self {
        Self {
            visible: true,
            seconds_remaining,
        }
    }
}
