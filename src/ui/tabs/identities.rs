use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_date, format_optional, format_phone};

/// Render the Identities tab - the monitored identity roster
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let identities = app.visible_identities();

    let header = Row::new([
        Cell::from("Email"),
        Cell::from("Name"),
        Cell::from("Username"),
        Cell::from("Phone"),
        Cell::from("Active"),
        Cell::from("Added"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = identities
        .iter()
        .enumerate()
        .map(|(i, identity)| {
            let style = if i == app.identity_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let phone = identity
                .phone
                .as_deref()
                .map(format_phone)
                .unwrap_or_else(|| "-".to_string());
            let active = if identity.is_active { "yes" } else { "no" };
            let added = identity
                .created_at
                .as_deref()
                .map(format_date)
                .unwrap_or_else(|| "-".to_string());

            Row::new(vec![
                Cell::from(identity.email.clone()),
                Cell::from(format_optional(&identity.name, "-")),
                Cell::from(format_optional(&identity.username, "-")),
                Cell::from(phone),
                Cell::from(active),
                Cell::from(added),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(30), // Email
        Constraint::Fill(2),        // Name
        Constraint::Fill(2),        // Username
        Constraint::Length(14),     // Phone
        Constraint::Length(6),      // Active
        Constraint::Length(12),     // Added
    ];

    let title = format!(
        " Identities ({}) - [a]dd [d]elete [s]can ",
        app.identities.len()
    );

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
    state.select(Some(app.identity_selection));

    frame.render_stateful_widget(table, area, &mut state);
}
