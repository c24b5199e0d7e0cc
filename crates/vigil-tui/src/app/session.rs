//! Glue between the terminal and the session controller

use std::sync::Arc;

use crossterm::event::{Event, KeyEventKind, MouseEventKind};
use parking_lot::Mutex;

use vigil_core::{ActivityKind, Navigator, SessionPresenter, TerminationReason, WarningView};

/// What the session layer wants on screen, shared with the app
#[derive(Debug, Default)]
pub struct SessionView {
    /// Current warning dialog state
    pub warning: WarningView,
    /// Notices not yet shown
    pub notices: Vec<String>,
    /// Set once navigation away from the session was requested
    pub signed_out: Option<TerminationReason>,
}

pub type SharedSessionView = Arc<Mutex<SessionView>>;

/// Presenter that writes into the shared view for the next frame
pub struct TuiPresenter {
    view: SharedSessionView,
}

impl TuiPresenter {
    pub fn new(view: SharedSessionView) -> Self {
        Self { view }
    }
}

impl SessionPresenter for TuiPresenter {
    fn render(&mut self, view: WarningView) {
        self.view.lock().warning = view;
    }

    fn notice(&mut self, message: &str) {
        self.view.lock().notices.push(message.to_string());
    }
}

/// Navigator that switches the app to the signed-out screen
pub struct TuiNavigator {
    view: SharedSessionView,
}

impl TuiNavigator {
    pub fn new(view: SharedSessionView) -> Self {
        Self { view }
    }
}

impl Navigator for TuiNavigator {
    fn leave_session(&self, reason: TerminationReason) {
        self.view.lock().signed_out = Some(reason);
    }
}

/// Which activity kind a terminal event counts as, if any
pub fn activity_for(event: &Event) -> Option<ActivityKind> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(ActivityKind::KeyDown),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::Down(_) => Some(ActivityKind::PointerDown),
            MouseEventKind::Up(_) => Some(ActivityKind::Click),
            MouseEventKind::ScrollUp
            | MouseEventKind::ScrollDown
            | MouseEventKind::ScrollLeft
            | MouseEventKind::ScrollRight => Some(ActivityKind::Scroll),
            _ => None,
        },
        _ => None,
    }
}
