//! Passive view contract for the session warning

use crate::state::WarningView;

/// Renders the warning countdown
///
/// A presenter holds no timers and no state beyond the last view it was
/// given. User intents travel back to the controller through the session's
/// intent handle, not through this trait.
pub trait SessionPresenter: Send {
    /// Draw (or hide) the warning
    fn render(&mut self, view: WarningView);

    /// Show a short one-line notice such as "Session extended"
    fn notice(&mut self, _message: &str) {}
}
