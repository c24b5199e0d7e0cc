//! Screen regions and shared chrome

use ratatui::layout::Flex;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::Theme;

/// Header, body, status bar and key hints, top to bottom
pub struct ScreenLayout {
    pub header: Rect,
    pub content: Rect,
    pub status: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let [header, content, status, footer] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);

        Self {
            header,
            content,
            status,
            footer,
        }
    }
}

/// A `width` by `height` box in the middle of `area`
pub fn centered(area: Rect, width: Constraint, height: Constraint) -> Rect {
    let [column] = Layout::horizontal([width]).flex(Flex::Center).areas(area);
    let [cell] = Layout::vertical([height]).flex(Flex::Center).areas(column);
    cell
}

/// App name and screen title on the left, local time on the right
pub fn render_header(frame: &mut Frame, area: Rect, screen: &str, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.border())
        .style(theme.header());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(7)]).areas(inner);

    let title = Line::from(vec![
        Span::styled(" \u{25C6} VIGIL", theme.title()),
        Span::styled(format!("  {}", screen), theme.text_secondary()),
    ]);
    frame.render_widget(Paragraph::new(title), left);

    let clock = chrono::Local::now().format("%H:%M ").to_string();
    frame.render_widget(
        Paragraph::new(clock)
            .style(theme.text_muted())
            .alignment(Alignment::Right),
        right,
    );
}

/// Key hints as `[K] action` pairs
pub fn render_footer(frame: &mut Frame, area: Rect, hints: &[(&str, &str)], theme: &Theme) {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, action) in hints {
        spans.push(Span::styled(format!("[{}]", key), theme.text_highlight()));
        spans.push(Span::styled(format!(" {}  ", action), theme.text_muted()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Bordered block titled `title`
pub fn section_block<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border())
        .title(Span::styled(format!(" {} ", title), theme.text_highlight()))
}
