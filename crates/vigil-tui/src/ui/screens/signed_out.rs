//! Shown once the session has ended

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use vigil_core::TerminationReason;

use crate::app::AppState;
use crate::ui::layout::{centered, render_footer, render_header, ScreenLayout};
use crate::ui::Theme;

/// Text explaining why there is no session
pub fn message(reason: Option<TerminationReason>) -> String {
    match reason {
        Some(reason) => reason.notice().to_string(),
        None => "No active session.\n\nLog in with `vigil-tui login --token <TOKEN>`.".to_string(),
    }
}

/// Render the signed-out screen
pub fn render(frame: &mut Frame, state: &AppState) {
    let theme = Theme::default();
    let layout = ScreenLayout::new(frame.area());

    render_header(frame, layout.header, "Signed out", &theme);

    let area = centered(
        layout.content,
        Constraint::Percentage(60),
        Constraint::Percentage(50),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border());
    let text = Paragraph::new(message(state.signed_out))
        .style(theme.text())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(text, area);

    render_footer(frame, layout.footer, &[("Q", "Quit")], &theme);
}
