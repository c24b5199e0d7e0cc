//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{AppState, Screen};
use components::warning::SessionWarningDialog;

/// Main render function: the current screen, then overlays
pub fn render(frame: &mut Frame, state: &AppState) {
    match state.current_screen {
        Screen::Dashboard => screens::dashboard::render(frame, state),
        Screen::SignedOut => screens::signed_out::render(frame, state),
    }

    let theme = Theme::default();
    if let Some(dialog) = SessionWarningDialog::from_view(state.warning) {
        dialog.render(frame, frame.area(), &theme);
    }
    state.notifications.render(frame, frame.area(), &theme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Identity, SessionStatus};
    use ratatui::backend::TestBackend;
    use vigil_core::{SessionState, TerminationReason, WarningView};

    fn draw(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn dashboard() -> AppState {
        AppState::new(Some(Identity {
            username: "alice".to_string(),
            user_id: "42".to_string(),
            roles: vec!["ROLE_CUSTOMER".to_string()],
            ..Identity::default()
        }))
    }

    #[test]
    fn test_dashboard_shows_account_and_status() {
        let mut state = dashboard();
        state.session = SessionStatus {
            state: Some(SessionState::Active),
            warning_in: Some(270),
            seconds_remaining: None,
        };
        let screen = draw(&state);
        assert!(screen.contains("alice"));
        assert!(screen.contains("Customer"));
        assert!(screen.contains("idle warning in 4:30"));
        assert!(!screen.contains("Session Expiring Soon"));
    }

    #[test]
    fn test_warning_dialog_overlays_dashboard() {
        let mut state = dashboard();
        state.warning = WarningView::countdown(15);
        let screen = draw(&state);
        assert!(screen.contains("Session Expiring Soon"));
        assert!(screen.contains("0:15"));
        assert!(screen.contains("Continue Session"));
        assert!(screen.contains("Logout Now"));
    }

    #[test]
    fn test_signed_out_shows_reason() {
        let mut state = dashboard();
        state.sign_out(Some(TerminationReason::IdleTimeout));
        let screen = draw(&state);
        assert!(screen.contains("logged out due to inactivity"));
    }
}
