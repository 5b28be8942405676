use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::models::Severity;
use crate::ui::styles;
use crate::utils::{format_datetime, truncate_string};

/// Render the Overview tab - dashboard summary cards plus the live feed
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Status / threat summary row
            Constraint::Min(8),    // Recent findings feed
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[0]);

    render_system_status(frame, app, top_chunks[0]);
    render_threat_summary(frame, app, top_chunks[1]);
    render_recent_findings(frame, app, main_chunks[1]);
}

fn render_system_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    match app.dashboard {
        Some(ref data) => {
            if let Some(ref status) = data.system_status {
                let state = status.status.as_deref().unwrap_or("unknown");
                let state_style = if state.eq_ignore_ascii_case("operational") {
                    styles::success_style()
                } else {
                    styles::error_style()
                };
                lines.push(Line::from(vec![
                    Span::styled("Status:     ", styles::muted_style()),
                    Span::styled(state.to_string(), state_style),
                ]));

                if let Some(ref last_scan) = status.last_scan {
                    lines.push(Line::from(vec![
                        Span::styled("Last scan:  ", styles::muted_style()),
                        Span::raw(format_datetime(last_scan)),
                    ]));
                }
            }

            lines.push(Line::from(vec![
                Span::styled("Identities: ", styles::muted_style()),
                Span::styled(
                    format!("{} monitored", data.monitored_identities),
                    styles::list_item_style(),
                ),
            ]));
        }
        None => {
            lines.push(Line::from(Span::styled(
                "No data yet - press r to refresh",
                styles::muted_style(),
            )));
        }
    }

    let block = Block::default()
        .title(" System Status ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_threat_summary(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    if let Some(ref data) = app.dashboard {
        let counts = [
            (Severity::Critical, "Critical", data.threats.critical),
            (Severity::High, "High", data.threats.high),
            (Severity::Medium, "Medium", data.threats.medium),
            (Severity::Low, "Low", data.threats.low),
        ];
        for (severity, label, count) in counts {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", label), styles::muted_style()),
                Span::styled(format!("{:>4}", count), styles::severity_style(severity)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Total     ", styles::muted_style()),
            Span::styled(
                format!("{:>4}", data.threats.total()),
                styles::highlight_style(),
            ),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "No threat counts yet",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .title(" Threats ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent_findings(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    let findings = app
        .dashboard
        .as_ref()
        .map(|d| d.recent_security_findings.as_slice())
        .unwrap_or(&[]);

    if findings.is_empty() {
        lines.push(Line::from(Span::styled(
            "No recent findings",
            styles::muted_style(),
        )));
    } else {
        for threat in findings {
            let date = threat
                .created_at
                .as_deref()
                .map(format_datetime)
                .unwrap_or_else(|| "-".to_string());
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:<9}", threat.severity.to_string()),
                    styles::severity_style(threat.severity),
                ),
                Span::styled(format!("{:<22}", threat.display_type()), styles::list_item_style()),
                Span::styled(
                    format!(
                        "{:<40}",
                        truncate_string(threat.url.as_deref().unwrap_or("-"), 38)
                    ),
                    styles::muted_style(),
                ),
                Span::styled(date, styles::muted_style()),
            ]));
        }
    }

    let block = Block::default()
        .title(" Recent Findings ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
