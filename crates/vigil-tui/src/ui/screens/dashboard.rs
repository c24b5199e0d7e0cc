//! Logged-in dashboard

use chrono::Utc;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use vigil_core::token::roles;

use crate::app::{AppState, Identity};
use crate::ui::components::status_bar::render_status_bar;
use crate::ui::layout::{render_footer, render_header, section_block, ScreenLayout};
use crate::ui::Theme;
use crate::utils::{format_until, truncate};

/// Render the dashboard
pub fn render(frame: &mut Frame, state: &AppState) {
    let theme = Theme::default();
    let layout = ScreenLayout::new(frame.area());

    render_header(frame, layout.header, "Dashboard", &theme);

    let block = section_block("Account", &theme);
    let inner = block.inner(layout.content);
    frame.render_widget(block, layout.content);

    if let Some(identity) = &state.identity {
        let lines = account_lines(identity, &theme);
        frame.render_widget(Paragraph::new(lines), inner);
    }

    render_status_bar(frame, layout.status, &state.session, &theme);
    render_footer(frame, layout.footer, &[("L", "Logout"), ("Q", "Quit")], &theme);
}

/// Label for the most privileged role held
pub fn role_label(roles_held: &[String]) -> &'static str {
    let has = |role: &str| roles_held.iter().any(|r| r == role);
    if has(roles::ADMIN) {
        "Administrator"
    } else if has(roles::MANAGER) || has(roles::CUSTOMER_MANAGER) {
        "Manager"
    } else if has(roles::CUSTOMER) || has(roles::USER) {
        "Customer"
    } else {
        "Unknown"
    }
}

fn account_lines<'a>(identity: &'a Identity, theme: &Theme) -> Vec<Line<'a>> {
    let field = |label: &'a str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {:<14}", label), theme.text_muted()),
            Span::styled(value, theme.text()),
        ])
    };

    let mut lines = vec![
        field("User", truncate(&identity.username, 40)),
        field("User ID", identity.user_id.clone()),
        field("Role", role_label(&identity.roles).to_string()),
    ];
    if let Some(customer_id) = &identity.customer_id {
        lines.push(field("Customer ID", customer_id.clone()));
    }
    if let Some(email) = &identity.email {
        lines.push(field("Email", truncate(email, 40)));
    }
    if let Some(expires_at) = identity.token_expires_at {
        lines.push(field("Token expires", format_until(expires_at, Utc::now())));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["ROLE_ADMIN", "ROLE_USER"], "Administrator")]
    #[case(&["ROLE_CUSTOMER_MANAGER"], "Manager")]
    #[case(&["ROLE_USER"], "Customer")]
    #[case(&[], "Unknown")]
    fn test_role_label(#[case] held: &[&str], #[case] expected: &str) {
        let held: Vec<String> = held.iter().map(|r| r.to_string()).collect();
        assert_eq!(role_label(&held), expected);
    }
}
