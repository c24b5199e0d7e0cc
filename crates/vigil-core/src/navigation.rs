//! Navigation away from the authenticated area

use crate::state::TerminationReason;

/// Receives the signal to leave the authenticated part of the application
pub trait Navigator: Send + Sync {
    /// Go to the unauthenticated entry point
    fn leave_session(&self, reason: TerminationReason);
}
