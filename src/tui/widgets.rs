// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Accent color for a theme name; unknown names get the default red.
pub fn theme_color(theme: &str) -> Color {
    match theme {
        "blue" => Color::Blue,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "orange" => Color::LightRed,
        _ => Color::Red,
    }
}

fn section(title: &'static str, accent: Color) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    )])
}

pub fn help_lines(accent: Color) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        section("strix - Help", accent),
        Line::from(""),
        section("Navigation:", Color::Yellow),
        Line::from("  ↑/k ↓/j   - Move selection"),
        Line::from("  PgUp/PgDn - Move by 10"),
        Line::from("  Tab       - Next panel"),
        Line::from("  Enter     - Open title / play episode or file"),
        Line::from("  h/Esc     - Home"),
        Line::from("  q         - Quit"),
        Line::from(""),
        section("Search:", Color::Yellow),
        Line::from("  /         - Focus search (results appear as you type)"),
        Line::from("  Enter     - Search now / open highlighted result"),
        Line::from("  Esc       - Clear search"),
        Line::from(""),
        section("Title Page:", Color::Yellow),
        Line::from("  p         - Play"),
        Line::from("  [ / ]     - Previous / next season"),
        Line::from(""),
        section("Other:", Color::Yellow),
        Line::from("  f         - Available files (f again cycles quality filter)"),
        Line::from("  t         - Cycle theme"),
        Line::from("  s         - Stop playback"),
        Line::from("  ?/F1      - Toggle this help"),
        Line::from(""),
        Line::from("Press Esc, ? or F1 to close this help"),
    ]
}

pub fn create_help_widget(accent: Color) -> Paragraph<'static> {
    Paragraph::new(help_lines(accent))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(" Help "),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false })
}

/// Start of the window that keeps `selected` on screen.
pub fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    selected.saturating_sub(visible - 1)
}
