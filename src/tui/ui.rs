// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Focus, Screen};
use super::widgets::{centered_rect, create_help_widget, scroll_offset, theme_color};
use crate::view::{FilesState, GridKind, GridState, PlayControl, SearchState};

pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();
    let accent = theme_color(&app.view.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(size);

    draw_search_box(frame, app, chunks[0], accent);

    match app.view.screen {
        Screen::Home => draw_home(frame, app, chunks[1], accent),
        Screen::Detail => draw_detail(frame, app, chunks[1], accent),
        Screen::Files => draw_files(frame, app, chunks[1], accent),
    }

    draw_footer(frame, app, chunks[2], accent);

    if app.focus == Focus::Search && app.view.search_visible {
        draw_search_dropdown(frame, app, chunks[0], chunks[1], accent);
    }

    if app.show_help {
        let area = centered_rect(70, 80, size);
        frame.render_widget(Clear, area);
        frame.render_widget(create_help_widget(accent), area);
    }
}

fn panel(title: String, focused: bool, accent: Color) -> Block<'static> {
    let border = if focused { accent } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn highlight(accent: Color) -> Style {
    Style::default()
        .bg(accent)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn draw_search_box(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let focused = app.focus == Focus::Search;
    let text = if app.search_input.is_empty() && !focused {
        Line::from(Span::styled(
            "Press / to search movies and TV shows",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let cursor = if focused { "▏" } else { "" };
        Line::from(format!("{}{}", app.search_input, cursor))
    };

    let search = Paragraph::new(text).block(panel(" strix ".to_string(), focused, accent));
    frame.render_widget(search, area);
}

fn draw_search_dropdown(frame: &mut Frame, app: &App, anchor: Rect, content: Rect, accent: Color) {
    let items: Vec<ListItem> = match &app.view.search_state {
        SearchState::Loading => vec![ListItem::new(SearchState::LOADING_TEXT)],
        SearchState::NoResults => vec![ListItem::new(SearchState::NO_RESULTS_TEXT)],
        SearchState::Error => vec![ListItem::new(Span::styled(
            SearchState::ERROR_TEXT,
            Style::default().fg(Color::Red),
        ))],
        SearchState::Results(rows) => rows
            .iter()
            .map(|row| {
                ListItem::new(Line::from(vec![
                    Span::styled(row.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(format!("  {} · {}", row.year, row.type_label)),
                    Span::styled(format!("  ★ {}", row.rating), Style::default().fg(Color::Yellow)),
                ]))
            })
            .collect(),
        SearchState::Hidden => return,
    };

    let height = (items.len() as u16 + 2).min(content.height);
    let area = Rect {
        x: anchor.x + 2,
        y: content.y,
        width: anchor.width.saturating_sub(4).min(80),
        height,
    };

    let mut state = ListState::default();
    if matches!(app.view.search_state, SearchState::Results(_)) {
        state.select(Some(app.selected));
    }

    let list = List::new(items)
        .block(panel(" Results ".to_string(), true, accent))
        .highlight_style(highlight(accent));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_grid(frame: &mut Frame, app: &App, kind: GridKind, area: Rect, accent: Color) {
    let focused = app.focus == Focus::Grid(kind);
    let block = panel(format!(" {} ", kind.title()), focused, accent);

    match app.view.grid(kind) {
        GridState::Empty(message) => {
            let empty = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
        }
        GridState::Cards(cards) => {
            let items: Vec<ListItem> = cards
                .iter()
                .map(|card| {
                    ListItem::new(Line::from(vec![
                        Span::raw(card.title.clone()),
                        Span::styled(
                            format!(" ({})", card.year),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            format!("  ★ {}", card.rating),
                            Style::default().fg(Color::Yellow),
                        ),
                    ]))
                })
                .collect();
            let mut state = ListState::default();
            if focused {
                state.select(Some(app.selected));
            }
            let list = List::new(items)
                .block(block)
                .highlight_style(highlight(accent));
            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    draw_grid(frame, app, GridKind::RecentlyAdded, columns[0], accent);
    draw_grid(frame, app, GridKind::Trending, columns[1], accent);
}

fn draw_hero(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let hero = &app.view.hero;
    let mut lines = vec![Line::from(Span::styled(
        hero.title.clone().unwrap_or_else(|| "Loading...".to_string()),
        Style::default().fg(accent).add_modifier(Modifier::BOLD),
    ))];

    let meta: Vec<&str> = [&hero.year, &hero.seasons, &hero.runtime, &hero.countries]
        .into_iter()
        .filter_map(|m| m.as_deref())
        .collect();
    if !meta.is_empty() {
        lines.push(Line::from(meta.join(" · ")));
    }

    let rating = match (&app.view.rating, &hero.rating) {
        (Some(imdb), _) => Some(match &imdb.votes {
            Some(votes) => format!("★ {} {} ({})", imdb.value, imdb.source, votes),
            None => format!("★ {} {}", imdb.value, imdb.source),
        }),
        (None, Some(rating)) => Some(format!("★ {}", rating)),
        (None, None) => None,
    };
    if let Some(rating) = rating {
        lines.push(Line::from(Span::styled(rating, Style::default().fg(Color::Yellow))));
    }
    if !hero.genres.is_empty() {
        lines.push(Line::from(Span::styled(
            hero.genres.join(" | "),
            Style::default().fg(Color::Cyan),
        )));
    }

    let control = &app.view.play_control;
    let control_style = match control {
        PlayControl::Loading => Style::default().fg(Color::DarkGray),
        _ => highlight(accent),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" ▶ {} (p) ", control.label()),
        control_style,
    )));

    if let Some(synopsis) = &hero.synopsis {
        lines.push(Line::from(""));
        lines.push(Line::from(synopsis.clone()));
    }

    let paragraph = Paragraph::new(lines)
        .block(panel(" Details ".to_string(), false, accent))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_episodes(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let focused = app.focus == Focus::Episodes;
    let title = format!(" Season {}  [ / ] ", app.view.season);
    let block = panel(title, focused, accent);

    if app.view.episodes.is_empty() {
        // Movies have no seasons line in the hero.
        let message = if app.view.hero.seasons.is_some() {
            "No episodes"
        } else {
            ""
        };
        frame.render_widget(
            Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .view
        .episodes
        .iter()
        .map(|row| {
            let (marker, style) = if row.available {
                ("▶", Style::default())
            } else {
                ("🔒", Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} {:>2}. ", marker, row.number), style),
                Span::styled(row.title.clone(), style),
                Span::styled(format!("  {}", row.runtime), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.selected));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight(accent));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_detail(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);
    draw_hero(frame, app, columns[0], accent);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);
    draw_episodes(frame, app, right[0], accent);
    draw_grid(frame, app, GridKind::Recommendations, right[1], accent);
}

fn draw_files(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let block = panel(" Available Files  (f: filter) ".to_string(), true, accent);

    if let FilesState::Empty(message) = &app.view.files {
        frame.render_widget(
            Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let cards = app.view.file_cards();
    let visible = area.height.saturating_sub(2) as usize;
    let offset = scroll_offset(app.selected, visible);
    let items: Vec<ListItem> = cards
        .iter()
        .skip(offset)
        .take(visible)
        .map(|(_, card)| {
            let playable = if card.stream_token.is_some() { "▶" } else { " " };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", playable)),
                Span::styled(
                    format!("[{}] ", card.badge),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::raw(card.name.clone()),
                Span::styled(
                    format!("  {} · {}", card.size, card.format),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.selected - offset.min(app.selected)));
    let list = List::new(items)
        .block(block)
        .highlight_style(highlight(accent));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect, accent: Color) {
    let line = match &app.view.notice {
        Some((text, _)) => Line::from(Span::styled(
            text.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None => {
            let hints = match (app.focus, app.view.screen) {
                (Focus::Search, _) => "Enter: search/open  ↑↓: select  Esc: clear  Tab: leave",
                (_, Screen::Detail) => {
                    "p: play  [ ]: season  Enter: open  Tab: panel  h: home  ?: help  q: quit"
                }
                (_, Screen::Files) => "Enter: play  f: filter  h: home  ?: help  q: quit",
                (_, Screen::Home) => "/: search  Enter: open  Tab: panel  f: files  t: theme  ?: help  q: quit",
            };
            Line::from(Span::styled(hints, Style::default().fg(Color::DarkGray)))
        }
    };

    let footer = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(panel(format!(" theme: {} ", app.view.theme), false, accent));
    frame.render_widget(footer, area);
}
