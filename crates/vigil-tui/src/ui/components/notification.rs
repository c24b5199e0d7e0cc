//! Short-lived notices in the top-right corner

use std::collections::VecDeque;

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ui::Theme;

/// How many toasts are shown at once
const MAX_VISIBLE: usize = 3;

/// Redraw ticks a toast stays up (the app redraws every 250ms)
const SHORT_TTL: u64 = 12;
const LONG_TTL: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
}

#[derive(Debug)]
pub struct Notification {
    pub message: String,
    pub tone: Tone,
    ttl: u64,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: Tone::Success,
            ttl: SHORT_TTL,
        }
    }

    /// Stays up longer than a success
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tone: Tone::Warning,
            ttl: LONG_TTL,
        }
    }

    fn style(&self, theme: &Theme) -> Style {
        match self.tone {
            Tone::Success => theme.success(),
            Tone::Warning => theme.warning(),
        }
    }

    fn text(&self) -> String {
        let icon = match self.tone {
            Tone::Success => '✓',
            Tone::Warning => '⚠',
        };
        format!("{} {}", icon, self.message)
    }
}

/// Queue of visible toasts, oldest first
#[derive(Debug, Default)]
pub struct NotificationManager {
    queue: VecDeque<Notification>,
}

impl NotificationManager {
    pub fn push(&mut self, notification: Notification) {
        if self.queue.len() == MAX_VISIBLE {
            self.queue.pop_front();
        }
        self.queue.push_back(notification);
    }

    /// Count every toast down by one redraw and drop the finished ones
    pub fn tick(&mut self) {
        self.queue.retain_mut(|n| {
            n.ttl = n.ttl.saturating_sub(1);
            n.ttl > 0
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Stack toasts down the right edge of `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut y = area.y + 1;
        for notification in &self.queue {
            if y + 3 > area.bottom() {
                break;
            }
            let text = notification.text();
            let width = (text.chars().count() as u16 + 4).min(60).min(area.width);
            let x = area.right().saturating_sub(width + 2).max(area.x);
            let toast = Rect::new(x, y, width, 3);

            let style = notification.style(theme);
            frame.render_widget(Clear, toast);
            frame.render_widget(
                Paragraph::new(text)
                    .style(style)
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).border_style(style)),
                toast,
            );
            y += 3;
        }
    }
}
