//! Profile tab: account details for the signed-in analyst.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_optional, format_phone};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_account(frame, app, chunks[0]);
    render_about(frame, app, chunks[1]);
}

fn render_account(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match app.store.user() {
        Some(user) => {
            lines.push(Line::from(vec![
                Span::styled("Name:    ", styles::muted_style()),
                Span::styled(user.display_name().to_string(), styles::highlight_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Email:   ", styles::muted_style()),
                Span::raw(user.email.clone()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Role:    ", styles::muted_style()),
                Span::raw(user.role_label()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Status:  ", styles::muted_style()),
                if user.is_active {
                    Span::styled("Active", styles::success_style())
                } else {
                    Span::styled("Inactive", styles::error_style())
                },
            ]));
            let phone = user
                .phone_number
                .as_deref()
                .map(format_phone)
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::styled("Phone:   ", styles::muted_style()),
                Span::raw(phone),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("[e]", styles::help_key_style()),
                Span::styled(" edit display name", styles::help_desc_style()),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No profile loaded - press r to refresh",
                styles::muted_style(),
            )));
        }
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
            .title(" Account "),
    );
    frame.render_widget(panel, area);
}

fn render_about(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(user) = app.store.user() {
        lines.push(Line::from(vec![
            Span::styled("Profession: ", styles::muted_style()),
            Span::raw(format_optional(&user.profession, "-")),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Avatar:     ", styles::muted_style()),
            Span::raw(format_optional(&user.image_url, "-")),
        ]));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Bio", styles::muted_style())));
        match user.bio.as_deref() {
            Some(bio) if !bio.is_empty() => {
                lines.push(Line::from(Span::raw(bio.to_string())));
            }
            _ => {
                lines.push(Line::from(Span::styled("(none)", styles::muted_style())));
            }
        }
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
            .title(" About "),
    );
    frame.render_widget(panel, area);
}
