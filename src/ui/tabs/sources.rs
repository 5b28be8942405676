use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::format_optional;

/// Render the Sources tab - monitored sites with aggregate stats
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_source_table(frame, app, chunks[0]);
    render_source_stats(frame, app, chunks[1]);
}

fn render_source_table(frame: &mut Frame, app: &App, area: Rect) {
    let sources = app.visible_sources();

    let header = Row::new([
        Cell::from("Domain"),
        Cell::from("Category"),
        Cell::from("Risk"),
        Cell::from("Priority"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let style = if i == app.source_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let risk = source.risk_level.as_deref().unwrap_or("-");
            let risk_style = match risk {
                "critical" | "high" => styles::error_style(),
                "medium" => styles::highlight_style(),
                "low" => styles::success_style(),
                _ => styles::muted_style(),
            };
            let priority = source
                .monitoring_priority
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(source.display_domain().to_string()),
                Cell::from(format_optional(&source.category, "-")),
                Cell::from(Span::styled(risk.to_string(), risk_style)),
                Cell::from(format!("{:>4}", priority)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(45), // Domain
        Constraint::Fill(2),        // Category
        Constraint::Length(9),      // Risk
        Constraint::Length(9),      // Priority
    ];

    let title = format!(" Sources ({}) ", app.sources.len());

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
    state.select(Some(app.source_selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_source_stats(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![];
    let stats = &app.source_stats;

    lines.push(Line::from(vec![
        Span::styled("Total sources: ", styles::muted_style()),
        Span::styled(stats.total_sources.to_string(), styles::highlight_style()),
    ]));

    if !stats.by_category.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "By category",
            styles::highlight_style(),
        )));
        for (category, count) in &stats.by_category {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{:<18}", category), styles::list_item_style()),
                Span::styled(format!("{:>4}", count), styles::muted_style()),
            ]));
        }
    }

    if !stats.by_risk.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("By risk", styles::highlight_style())));
        for (risk, count) in &stats.by_risk {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(format!("{:<18}", risk), styles::list_item_style()),
                Span::styled(format!("{:>4}", count), styles::muted_style()),
            ]));
        }
    }

    let block = Block::default()
        .title(" Coverage ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
