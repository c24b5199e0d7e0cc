//! Session-expiry warning dialog

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use vigil_core::WarningView;

use crate::ui::{layout::centered, Theme};
use crate::utils::format_clock;

pub const TITLE: &str = "Session Expiring Soon";

/// Countdown shown before an idle logout
pub struct SessionWarningDialog {
    pub seconds_remaining: u64,
}

impl SessionWarningDialog {
    /// Dialog for `view`, or `None` when hidden
    pub fn from_view(view: WarningView) -> Option<Self> {
        view.visible.then_some(Self {
            seconds_remaining: view.seconds_remaining,
        })
    }

    fn message(&self) -> String {
        format!(
            "Your session will expire in {} due to inactivity.\n\n\
             Would you like to continue your session?",
            self.plural_seconds()
        )
    }

    fn plural_seconds(&self) -> String {
        if self.seconds_remaining == 1 {
            "1 second".to_string()
        } else {
            format!("{} seconds", self.seconds_remaining)
        }
    }

    /// Render the dialog
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let dialog_area = centered(area, Constraint::Length(56), Constraint::Length(11));

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(format!(" {} ", TITLE))
            .title_style(theme.warning_strong())
            .borders(Borders::ALL)
            .border_style(theme.warning());

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Countdown
                Constraint::Min(3),    // Message
                Constraint::Length(1), // Buttons
            ])
            .split(inner);

        let countdown = Paragraph::new(format_clock(self.seconds_remaining))
            .style(theme.countdown(self.seconds_remaining))
            .alignment(Alignment::Center);
        frame.render_widget(countdown, chunks[0]);

        let message = Paragraph::new(self.message())
            .style(theme.text())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(message, chunks[1]);

        let buttons = Line::from(vec![
            Span::styled("[L]", theme.danger()),
            Span::styled(" Logout Now    ", theme.text_muted()),
            Span::styled("[C]", theme.text_highlight()),
            Span::styled(" Continue Session", theme.text()),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[2],
        );
    }
}
