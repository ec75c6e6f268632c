// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use strix::api::StrixApi;
use strix::config::Config;
use strix::page::Page;
use strix::prefs::ThemeStore;
use strix::view::{
    EpisodeRow, FileCard, FilesState, GridState, HeroView, Paint, PlayControl, SearchState,
    Surface,
};

pub mod files;
pub mod page;
pub mod play;
pub mod search;

pub use files::FilesCommand;
pub use page::PageCommand;
pub use play::PlayCommand;
pub use search::SearchCommand;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid format: {}. Use 'text' or 'json'", s),
        }
    }
}

/// Prints paints as lines on stdout, or one JSON object per paint.
pub struct TextSurface {
    format: OutputFormat,
    spinner: Mutex<Option<ProgressBar>>,
    files: Mutex<Vec<FileCard>>,
}

impl TextSurface {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            spinner: Mutex::new(None),
            files: Mutex::new(Vec::new()),
        }
    }

    fn start_spinner(&self, message: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(message.to_string());
        if let Some(old) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(pb)
        {
            old.finish_and_clear();
        }
    }

    fn stop_spinner(&self) {
        if let Some(pb) = self
            .spinner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            pb.finish_and_clear();
        }
    }

    fn print_hero(hero: &HeroView) {
        if let Some(title) = &hero.title {
            println!("{}", title);
        }
        let meta: Vec<&str> = [&hero.year, &hero.seasons, &hero.runtime, &hero.countries]
            .into_iter()
            .filter_map(|m| m.as_deref())
            .collect();
        if !meta.is_empty() {
            println!("{}", meta.join(" · "));
        }
        if let Some(rating) = &hero.rating {
            println!("Rating: {}", rating);
        }
        if !hero.genres.is_empty() {
            println!("Genres: {}", hero.genres.join(", "));
        }
        if let Some(synopsis) = &hero.synopsis {
            println!("\n{}", synopsis);
        }
        if let Some(poster) = &hero.poster_url {
            println!("Poster: {}", poster);
        }
        println!();
    }

    fn print_episode(row: &EpisodeRow) {
        let marker = if row.available { "▶" } else { "🔒" };
        println!(
            "  {} E{:02} {} ({})",
            marker, row.number, row.title, row.runtime
        );
    }

    fn print_file(index: usize, card: &FileCard) {
        println!(
            "  {:>3}. [{}] {} {} {}",
            index + 1,
            card.badge,
            card.name,
            card.size,
            card.format
        );
    }

    fn print_text(&self, paint: &Paint) {
        match paint {
            Paint::Search { state, .. } => match state {
                SearchState::Loading => self.start_spinner(SearchState::LOADING_TEXT),
                SearchState::Hidden => self.stop_spinner(),
                SearchState::Results(rows) => {
                    self.stop_spinner();
                    for (i, row) in rows.iter().enumerate() {
                        let route = row.route.as_ref().map(|r| r.to_string()).unwrap_or_default();
                        println!(
                            "{:>2}. {} ({}) [{}] ★ {}  {}",
                            i + 1,
                            row.title,
                            row.year,
                            row.type_label,
                            row.rating,
                            route
                        );
                    }
                }
                SearchState::NoResults => {
                    self.stop_spinner();
                    println!("{}", SearchState::NO_RESULTS_TEXT);
                }
                SearchState::Error => {
                    self.stop_spinner();
                    eprintln!("{}", SearchState::ERROR_TEXT);
                }
            },
            Paint::Hero(hero) => Self::print_hero(hero),
            Paint::Rating(rating) => match &rating.votes {
                Some(votes) => println!("{} rating: {} ({})", rating.source, rating.value, votes),
                None => println!("{} rating: {}", rating.source, rating.value),
            },
            Paint::Episodes { season, rows } => {
                println!("Season {}", season);
                if rows.is_empty() {
                    println!("  No episodes");
                }
                for row in rows {
                    Self::print_episode(row);
                }
                println!();
            }
            Paint::Grid { grid, state } => {
                println!("{}", grid.title());
                match state {
                    GridState::Cards(cards) => {
                        for card in cards {
                            println!(
                                "  {} ({}) ★ {}  {}",
                                card.title, card.year, card.rating, card.route
                            );
                        }
                    }
                    GridState::Empty(message) => println!("  {}", message),
                }
                println!();
            }
            Paint::Files(state) => match state {
                FilesState::Cards(cards) => {
                    for (i, card) in cards.iter().enumerate() {
                        Self::print_file(i, card);
                    }
                    *self.files.lock().unwrap_or_else(PoisonError::into_inner) = cards.clone();
                }
                FilesState::Empty(message) => {
                    self.files
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clear();
                    println!("{}", message);
                }
            },
            Paint::FileFilter { visible, .. } => {
                let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
                for &i in visible {
                    if let Some(card) = files.get(i) {
                        Self::print_file(i, card);
                    }
                }
            }
            Paint::PlayControl(control) => match control {
                PlayControl::Loading => self.start_spinner(control.label()),
                PlayControl::Idle => self.stop_spinner(),
                PlayControl::Ready { .. } => {
                    self.stop_spinner();
                    println!("[{}]", control.label());
                }
            },
            Paint::Notice(text) => {
                self.stop_spinner();
                eprintln!("{}", text);
            }
            Paint::Navigate(route) => println!("→ {}", route),
            Paint::Theme(theme) => tracing::debug!("Theme: {}", theme),
        }
    }
}

impl Surface for TextSurface {
    fn paint(&self, paint: Paint) {
        match self.format {
            OutputFormat::Text => self.print_text(&paint),
            OutputFormat::Json => match serde_json::to_string(&paint) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::error!("Failed to serialize paint: {}", e),
            },
        }
    }
}

/// What every command needs: configuration, the API and an output surface.
pub struct CommandContext {
    pub config: Config,
    pub api: Arc<StrixApi>,
    pub surface: Arc<TextSurface>,
}

impl CommandContext {
    pub fn new(config: Config, format: OutputFormat) -> Result<Self> {
        let mut api = StrixApi::new(&config.api)?;
        if format == OutputFormat::Text {
            api.enable_progress();
        }
        Ok(Self {
            config,
            api: Arc::new(api),
            surface: Arc::new(TextSurface::new(format)),
        })
    }

    pub fn page(&self) -> Page {
        Page::new(
            self.api.clone(),
            self.surface.clone(),
            &self.config,
            ThemeStore::new(ThemeStore::default_path(), &self.config.ui.default_theme),
        )
    }
}
