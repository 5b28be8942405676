use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::models::Severity;
use crate::ui::styles;
use crate::utils::{format_datetime, truncate_string};

/// Render the Threats tab - aggregate report on top, recent findings below
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Severity / type breakdown row
            Constraint::Min(8),    // Findings table
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[0]);

    render_by_severity(frame, app, top_chunks[0]);
    render_by_type(frame, app, top_chunks[1]);
    render_findings_table(frame, app, main_chunks[1]);
}

fn render_by_severity(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];
    let report = &app.threat_report;

    // Report keys are plain strings; show the known severities in order,
    // then anything else the server sent.
    let known = [
        ("critical", Severity::Critical),
        ("high", Severity::High),
        ("medium", Severity::Medium),
        ("low", Severity::Low),
    ];
    for (key, severity) in known {
        if let Some(count) = report.by_severity.get(key) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", key), styles::muted_style()),
                Span::styled(format!("{:>5}", count), styles::severity_style(severity)),
            ]));
        }
    }
    for (key, count) in &report.by_severity {
        if !known.iter().any(|(k, _)| k == key) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<10}", key), styles::muted_style()),
                Span::styled(format!("{:>5}", count), styles::list_item_style()),
            ]));
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No data", styles::muted_style())));
    } else {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Total     ", styles::muted_style()),
            Span::styled(
                format!("{:>5}", report.total_threats),
                styles::highlight_style(),
            ),
        ]));
    }

    let block = Block::default()
        .title(" By Severity ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_by_type(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];

    // Highest counts first
    let mut by_type: Vec<(&String, &i64)> = app.threat_report.by_type.iter().collect();
    by_type.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (finding_type, count) in by_type {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<24}", truncate_string(&finding_type.replace('_', " "), 22)),
                styles::list_item_style(),
            ),
            Span::styled(format!("{:>5}", count), styles::highlight_style()),
        ]));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No data", styles::muted_style())));
    }

    let block = Block::default()
        .title(" By Type ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_findings_table(frame: &mut Frame, app: &App, area: Rect) {
    let findings = &app.threat_report.recent_findings;

    let header = Row::new([
        Cell::from("Severity"),
        Cell::from("Type"),
        Cell::from("URL"),
        Cell::from("Verified"),
        Cell::from("Found"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = findings
        .iter()
        .enumerate()
        .map(|(i, threat)| {
            let style = if i == app.threat_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let verified = if threat.false_positive {
                "false pos"
            } else if threat.verified {
                "yes"
            } else {
                "no"
            };
            let found = threat
                .created_at
                .as_deref()
                .map(format_datetime)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(Span::styled(
                    threat.severity.to_string(),
                    styles::severity_style(threat.severity),
                )),
                Cell::from(threat.display_type()),
                Cell::from(truncate_string(threat.url.as_deref().unwrap_or("-"), 48)),
                Cell::from(verified),
                Cell::from(found),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(9),  // Severity
        Constraint::Fill(2),    // Type
        Constraint::Fill(3),    // URL
        Constraint::Length(10), // Verified
        Constraint::Length(13), // Found
    ];

    let title = format!(" Recent Findings ({}) ", findings.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.threat_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
