use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, Focus};
use crate::ui::styles;
use crate::utils::{format_datetime, truncate_string};

/// Render the Scans tab - scan history on the left, live detail on the right
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_scan_table(frame, app, chunks[0]);
    render_scan_detail(frame, app, chunks[1]);
}

fn render_scan_table(frame: &mut Frame, app: &App, area: Rect) {
    let scans = app.visible_scans();
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Scan"),
        Cell::from("Type"),
        Cell::from("Status"),
        Cell::from("URLs"),
        Cell::from("Started"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = scans
        .iter()
        .enumerate()
        .map(|(i, scan)| {
            let style = if i == app.scan_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let state = scan.status;
            let urls = scan
                .total_urls
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            let started = scan
                .created_at
                .as_deref()
                .map(format_datetime)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(short_uuid(&scan.scan_uuid)),
                Cell::from(scan.scan_type.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(Span::styled(state.to_string(), styles::scan_state_style(state))),
                Cell::from(format!("{:>5}", urls)),
                Cell::from(started),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(10), // Scan (short uuid)
        Constraint::Fill(2),    // Type
        Constraint::Length(10), // Status
        Constraint::Length(6),  // URLs
        Constraint::Length(13), // Started
    ];

    let title = format!(" Scans ({}) - [enter] watch ", app.scans.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.scan_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_scan_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let Some(ref poller) = app.scan_poller else {
        let block = Block::default()
            .title(" Detail ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));
        let hint = Paragraph::new(Line::from(Span::styled(
            "Select a scan and press Enter to watch it",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let mut lines = vec![];

    // Live status, refreshed every poll tick
    match poller.status() {
        Some(status) => {
            let state = status.status;
            lines.push(Line::from(vec![
                Span::styled("Status:   ", styles::muted_style()),
                Span::styled(state.to_string(), styles::scan_state_style(state)),
            ]));
            if let Some(ref scan_type) = status.scan_type {
                lines.push(Line::from(vec![
                    Span::styled("Type:     ", styles::muted_style()),
                    Span::raw(scan_type.clone()),
                ]));
            }
            if let Some(total_urls) = status.total_urls {
                lines.push(Line::from(vec![
                    Span::styled("URLs:     ", styles::muted_style()),
                    Span::raw(total_urls.to_string()),
                ]));
            }
            if let Some(ref created_at) = status.created_at {
                lines.push(Line::from(vec![
                    Span::styled("Started:  ", styles::muted_style()),
                    Span::raw(format_datetime(created_at)),
                ]));
            }
            if !state.is_terminal() {
                lines.push(Line::from(Span::styled(
                    "Updating every 5s...",
                    styles::muted_style(),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Fetching status...",
                styles::muted_style(),
            )));
        }
    }

    lines.push(Line::from(""));

    // Findings for this scan
    match app.scan_threats {
        Some(ref page) => {
            lines.push(Line::from(vec![
                Span::styled("Findings: ", styles::muted_style()),
                Span::styled(page.total.to_string(), styles::highlight_style()),
            ]));
            for threat in &page.threats {
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("{:<9}", threat.severity.to_string()),
                        styles::severity_style(threat.severity),
                    ),
                    Span::styled(format!("{:<20}", threat.display_type()), styles::list_item_style()),
                    Span::styled(
                        truncate_string(threat.url.as_deref().unwrap_or("-"), 30),
                        styles::muted_style(),
                    ),
                ]));
            }
            if (page.threats.len() as i64) < page.total {
                lines.push(Line::from(Span::styled(
                    format!("...and {} more", page.total - page.threats.len() as i64),
                    styles::muted_style(),
                )));
            }
        }
        None => {
            lines.push(Line::from(Span::styled(
                "Loading findings...",
                styles::muted_style(),
            )));
        }
    }

    let title = format!(" Scan {} ", short_uuid(poller.scan_uuid()));
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// First 8 chars of the scan UUID, enough to tell scans apart
fn short_uuid(uuid: &str) -> String {
    uuid.chars().take(8).collect()
}
