// Allow dead code: Style functions defined for consistent UI
#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

use crate::models::{ScanState, Severity};

// Color palette
pub const PRIMARY: Color = Color::Rgb(64, 128, 192);
pub const SECONDARY: Color = Color::Rgb(96, 160, 96);
pub const ACCENT: Color = Color::Rgb(192, 160, 64);
pub const ERROR: Color = Color::Rgb(192, 64, 64);
pub const MUTED: Color = Color::Rgb(128, 128, 128);
pub const HIGHLIGHT: Color = Color::Rgb(48, 48, 64);

// Severity colors
pub const CRITICAL: Color = Color::Rgb(220, 60, 60);
pub const HIGH: Color = Color::Rgb(220, 140, 60);
pub const MEDIUM: Color = Color::Rgb(200, 180, 60);
pub const LOW: Color = Color::Rgb(96, 160, 96);

// Styles
pub fn title_style() -> Style {
    Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default()
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(MUTED)
}

pub fn highlight_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn success_style() -> Style {
    Style::default().fg(SECONDARY)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn tab_style(selected: bool) -> Style {
    if selected {
        Style::default()
            .fg(PRIMARY)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(PRIMARY)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn search_style() -> Style {
    Style::default().fg(ACCENT)
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(32, 32, 40)).fg(Color::White)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    Style::default().fg(Color::White)
}

/// Severity-coded style for finding rows and counters
pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::default().fg(CRITICAL).add_modifier(Modifier::BOLD),
        Severity::High => Style::default().fg(HIGH),
        Severity::Medium => Style::default().fg(MEDIUM),
        Severity::Low => Style::default().fg(LOW),
        Severity::Unknown => Style::default().fg(MUTED),
    }
}

/// Style for a scan lifecycle state
pub fn scan_state_style(state: ScanState) -> Style {
    match state {
        ScanState::Queued => Style::default().fg(MUTED),
        ScanState::Running => Style::default().fg(ACCENT),
        ScanState::Completed => Style::default().fg(SECONDARY),
        ScanState::Failed => Style::default().fg(ERROR),
        ScanState::Unknown => Style::default().fg(MUTED),
    }
}
