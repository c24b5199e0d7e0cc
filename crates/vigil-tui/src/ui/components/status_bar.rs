//! Session status bar

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use vigil_core::SessionState;

use crate::app::SessionStatus;
use crate::ui::Theme;
use crate::utils::format_clock;

/// Indicator and text for the current session
pub fn status_line(status: &SessionStatus) -> (&'static str, String) {
    match status.state {
        Some(SessionState::Active) => {
            let text = match status.warning_in {
                Some(secs) => format!("Session active, idle warning in {}", format_clock(secs)),
                None => "Session active".to_string(),
            };
            ("●", text)
        }
        Some(SessionState::Warning) => {
            let secs = status.seconds_remaining.unwrap_or(0);
            ("▲", format!("Logging out in {}", format_clock(secs)))
        }
        Some(SessionState::Terminated) => ("○", "Signed out".to_string()),
        None => ("○", "No session".to_string()),
    }
}

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, status: &SessionStatus, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.border());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let style = match status.state {
        Some(SessionState::Active) => theme.success(),
        Some(SessionState::Warning) => theme.warning_strong(),
        _ => theme.text_muted(),
    };

    let (indicator, text) = status_line(status);
    let line = Line::from(vec![
        Span::styled(format!(" {} ", indicator), style),
        Span::styled(text, theme.text_secondary()),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}
