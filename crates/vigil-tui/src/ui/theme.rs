//! Colours and text styles

use ratatui::style::{Color, Modifier, Style};

/// Countdown values at or below this are drawn as urgent
const URGENT_SECS: u64 = 10;

/// Palette shared by every screen
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub surface: Color,
    pub ok: Color,
    pub caution: Color,
    pub alert: Color,
    pub rule: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub fg_faint: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0, 150, 136),
            surface: Color::Rgb(33, 33, 33),
            ok: Color::Rgb(76, 175, 80),
            caution: Color::Rgb(255, 152, 0),
            alert: Color::Rgb(244, 67, 54),
            rule: Color::Rgb(66, 66, 66),
            fg: Color::Rgb(250, 250, 250),
            fg_dim: Color::Rgb(189, 189, 189),
            fg_faint: Color::Rgb(117, 117, 117),
        }
    }
}

impl Theme {
    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.fg_faint)
    }

    /// Key hints and section titles
    pub fn text_highlight(&self) -> Style {
        self.title()
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::default().bg(self.surface)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.rule)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.ok)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.caution)
    }

    pub fn warning_strong(&self) -> Style {
        self.warning().add_modifier(Modifier::BOLD)
    }

    pub fn danger(&self) -> Style {
        Style::default()
            .fg(self.alert)
            .add_modifier(Modifier::BOLD)
    }

    /// Countdown digits; turn red for the last few seconds
    pub fn countdown(&self, seconds_remaining: u64) -> Style {
        if seconds_remaining <= URGENT_SECS {
            self.danger().add_modifier(Modifier::SLOW_BLINK)
        } else {
            self.warning_strong()
        }
    }
}
