// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use crate::api::StrixApi;
use crate::config::Config;
use crate::context::{PageSource, Route};
use crate::format::ImageBase;
use crate::page::Page;
use crate::player::{Player, stream_url};
use crate::prefs::next_theme;
use crate::search::SearchClient;
use crate::view::{
    EpisodeRow, FileCard, FilesState, GridKind, GridState, HeroView, MediaCard, Paint,
    PlayControl, RatingView, SearchState, Surface,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Detail,
    Files,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Grid(GridKind),
    Episodes,
    Files,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
}

/// Everything the screen shows, built only from paints.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub screen: Screen,
    pub search_state: SearchState,
    pub search_visible: bool,
    pub hero: HeroView,
    pub rating: Option<RatingView>,
    pub season: u32,
    pub episodes: Vec<EpisodeRow>,
    pub recommendations: GridState,
    pub trending: GridState,
    pub recent: GridState,
    pub files: FilesState,
    pub visible_files: Option<Vec<usize>>,
    pub play_control: PlayControl,
    pub notice: Option<(String, Instant)>,
    pub theme: String,
    /// Navigation requested by the last paint, taken by the app.
    pub pending_route: Option<Route>,
}

impl ViewState {
    pub fn new(theme: &str) -> Self {
        let loading = || GridState::Empty("Loading...".to_string());
        Self {
            screen: Screen::Home,
            search_state: SearchState::Hidden,
            search_visible: false,
            hero: HeroView::default(),
            rating: None,
            season: 1,
            episodes: Vec::new(),
            recommendations: loading(),
            trending: loading(),
            recent: loading(),
            files: FilesState::Empty("Loading...".to_string()),
            visible_files: None,
            play_control: PlayControl::Idle,
            notice: None,
            theme: theme.to_string(),
            pending_route: None,
        }
    }

    /// Clears title content before another page loads into it.
    pub fn reset_page(&mut self, screen: Screen) {
        let theme = std::mem::take(&mut self.theme);
        let notice = self.notice.take();
        *self = Self::new(&theme);
        self.screen = screen;
        self.notice = notice;
    }

    pub fn apply(&mut self, paint: Paint) {
        match paint {
            Paint::Search { state, .. } => {
                self.search_visible = !matches!(state, SearchState::Hidden);
                if self.search_visible {
                    self.search_state = state;
                }
            }
            Paint::Hero(hero) => self.merge_hero(hero),
            Paint::Rating(rating) => self.rating = Some(rating),
            Paint::Episodes { season, rows } => {
                self.season = season;
                self.episodes = rows;
            }
            Paint::Grid { grid, state } => match grid {
                GridKind::Recommendations => self.recommendations = state,
                GridKind::Trending => self.trending = state,
                GridKind::RecentlyAdded => self.recent = state,
            },
            Paint::Files(state) => {
                self.files = state;
                self.visible_files = None;
            }
            Paint::FileFilter { visible, .. } => self.visible_files = Some(visible),
            Paint::PlayControl(control) => self.play_control = control,
            Paint::Notice(text) => self.notice = Some((text, Instant::now())),
            Paint::Navigate(route) => self.pending_route = Some(route),
            Paint::Theme(theme) => self.theme = theme,
        }
    }

    // Absent hero fields keep what is already shown.
    fn merge_hero(&mut self, hero: HeroView) {
        let current = &mut self.hero;
        macro_rules! keep {
            ($($field:ident),*) => {
                $(if hero.$field.is_some() { current.$field = hero.$field; })*
            };
        }
        keep!(title, synopsis, rating, backdrop_url, poster_url, year, seasons, runtime, countries);
        if !hero.genres.is_empty() {
            current.genres = hero.genres;
        }
    }

    pub fn expire_notice(&mut self, ttl: Duration) -> bool {
        match &self.notice {
            Some((_, shown)) if shown.elapsed() >= ttl => {
                self.notice = None;
                true
            }
            _ => false,
        }
    }

    pub fn grid(&self, kind: GridKind) -> &GridState {
        match kind {
            GridKind::Recommendations => &self.recommendations,
            GridKind::Trending => &self.trending,
            GridKind::RecentlyAdded => &self.recent,
        }
    }

    pub fn cards(&self, kind: GridKind) -> &[MediaCard] {
        match self.grid(kind) {
            GridState::Cards(cards) => cards,
            GridState::Empty(_) => &[],
        }
    }

    pub fn file_cards(&self) -> Vec<(usize, &FileCard)> {
        let FilesState::Cards(cards) = &self.files else {
            return Vec::new();
        };
        match &self.visible_files {
            Some(visible) => visible
                .iter()
                .filter_map(|&i| cards.get(i).map(|c| (i, c)))
                .collect(),
            None => cards.iter().enumerate().collect(),
        }
    }

    pub fn search_rows(&self) -> usize {
        match &self.search_state {
            SearchState::Results(rows) => rows.len(),
            _ => 0,
        }
    }
}

pub struct App {
    pub view: ViewState,
    pub focus: Focus,
    pub search_input: String,
    pub selected: usize,
    pub show_help: bool,
    page: Arc<Page>,
    search: SearchClient,
    api: Arc<StrixApi>,
    player: Player,
    notice_ttl: Duration,
    file_qualities: Vec<String>,
    quality_filter: usize,
}

impl App {
    pub fn new(
        config: &Config,
        api: Arc<StrixApi>,
        surface: Arc<dyn Surface>,
        page: Arc<Page>,
        player: Player,
    ) -> Self {
        let search = SearchClient::new(
            api.clone(),
            surface,
            config.search.desktop.clone(),
            ImageBase::new(&config.api.image_base_url),
        );
        Self {
            view: ViewState::new(&page.theme()),
            focus: Focus::Grid(GridKind::RecentlyAdded),
            search_input: String::new(),
            selected: 0,
            show_help: false,
            page,
            search,
            api,
            player,
            notice_ttl: config.notice_duration(),
            file_qualities: Vec::new(),
            quality_filter: 0,
        }
    }

    pub fn open(&mut self, route: Route) {
        match &route {
            Route::Play { .. } => {
                self.start_player(&route);
                return;
            }
            Route::Home => {
                self.view.reset_page(Screen::Home);
                self.focus = Focus::Grid(GridKind::RecentlyAdded);
            }
            Route::Media(_) => {
                self.view.reset_page(Screen::Detail);
                self.focus = Focus::Episodes;
            }
        }
        self.selected = 0;
        info!("Opening {}", route);

        let page = self.page.clone();
        tokio::spawn(async move { page.initialize(PageSource::Route(route)).await });
    }

    pub fn open_files(&mut self) {
        self.view.reset_page(Screen::Files);
        self.focus = Focus::Files;
        self.selected = 0;
        self.quality_filter = 0;
        let page = self.page.clone();
        tokio::spawn(async move {
            page.load_files().await;
        });
    }

    fn start_player(&mut self, route: &Route) {
        let Some(url) = stream_url(&self.api, route) else {
            return;
        };
        let player = self.player.clone();
        tokio::spawn(async move {
            if let Err(e) = player.play_background(&url).await {
                error!("Failed to start player: {:#}", e);
            }
        });
        self.view.apply(Paint::Notice("Starting player...".to_string()));
    }

    pub fn apply(&mut self, paint: Paint) {
        if let Paint::Files(FilesState::Cards(cards)) = &paint {
            self.file_qualities = crate::files::qualities(cards);
        }
        self.view.apply(paint);
        if let Some(route) = self.view.pending_route.take() {
            self.open(route);
        }
    }

    pub fn tick(&mut self) -> bool {
        self.view.expire_notice(self.notice_ttl)
    }

    fn list_len(&self) -> usize {
        match self.focus {
            Focus::Search => self.view.search_rows(),
            Focus::Grid(kind) => self.view.cards(kind).len(),
            Focus::Episodes => self.view.episodes.len(),
            Focus::Files => self.view.file_cards().len(),
        }
    }

    fn focus_order(&self) -> Vec<Focus> {
        match self.view.screen {
            Screen::Home => vec![
                Focus::Grid(GridKind::RecentlyAdded),
                Focus::Grid(GridKind::Trending),
            ],
            Screen::Detail => vec![Focus::Episodes, Focus::Grid(GridKind::Recommendations)],
            Screen::Files => vec![Focus::Files],
        }
    }

    fn cycle_focus(&mut self) {
        let order = self.focus_order();
        let next = order
            .iter()
            .position(|f| *f == self.focus)
            .map_or(0, |i| (i + 1) % order.len());
        self.focus = order[next];
        self.selected = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.list_len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Search => {
                if self.view.search_visible && self.view.search_rows() > 0 {
                    // select() paints the navigation; it arrives as an event.
                    self.search.select(self.selected);
                    self.leave_search();
                } else {
                    self.search.on_submit(&self.search_input);
                }
            }
            Focus::Grid(kind) => {
                if let Some(card) = self.view.cards(kind).get(self.selected) {
                    let route = card.route.clone();
                    self.open(route);
                }
            }
            Focus::Episodes => {
                if let Some(paint) = self
                    .view
                    .episodes
                    .get(self.selected)
                    .and_then(EpisodeRow::activate)
                {
                    self.apply(paint);
                }
            }
            Focus::Files => {
                if let Some((index, _)) = self.view.file_cards().get(self.selected).copied() {
                    self.page.click_file(index);
                }
            }
        }
    }

    fn leave_search(&mut self) {
        self.focus = self.focus_order()[0];
        self.selected = 0;
    }

    fn play(&mut self) {
        if !self.view.play_control.enabled() {
            return;
        }
        if let PlayControl::Ready { token } = &self.view.play_control {
            self.open(Route::play(token.clone()));
            return;
        }
        let page = self.page.clone();
        tokio::spawn(async move {
            page.play(None).await;
        });
    }

    fn change_season(&mut self, delta: i32) {
        let season = self.view.season.saturating_add_signed(delta).max(1);
        if season == self.view.season {
            return;
        }
        self.selected = 0;
        let page = self.page.clone();
        tokio::spawn(async move { page.change_season(season).await });
    }

    fn cycle_theme(&mut self) {
        let theme = next_theme(&self.view.theme);
        if let Err(e) = self.page.select_theme(theme) {
            self.view.apply(Paint::Notice(format!("{:#}", e)));
        }
    }

    fn cycle_quality(&mut self) {
        if self.file_qualities.is_empty() {
            return;
        }
        self.quality_filter = (self.quality_filter + 1) % (self.file_qualities.len() + 1);
        let quality = match self.quality_filter {
            0 => crate::files::ALL_QUALITIES.to_string(),
            n => self.file_qualities[n - 1].clone(),
        };
        self.selected = 0;
        self.page.filter_files(&quality);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_input.clear();
                self.search.on_escape();
                self.leave_search();
            }
            KeyCode::Enter => self.activate(),
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Tab => {
                self.search.on_outside_click();
                self.leave_search();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.selected = 0;
                self.search.on_input(&self.search_input);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.selected = 0;
                self.search.on_input(&self.search_input);
            }
            _ => {}
        }
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1)) {
                self.show_help = false;
            }
            return None;
        }

        if self.focus == Focus::Search {
            self.handle_search_key(key);
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => self.show_help = true,
            KeyCode::Char('/') => {
                self.focus = Focus::Search;
                self.selected = 0;
                self.search.on_focus();
            }
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Enter => self.activate(),
            KeyCode::Char('p') if self.view.screen == Screen::Detail => self.play(),
            KeyCode::Char('[') if self.view.screen == Screen::Detail => self.change_season(-1),
            KeyCode::Char(']') if self.view.screen == Screen::Detail => self.change_season(1),
            KeyCode::Char('f') if self.view.screen == Screen::Files => self.cycle_quality(),
            KeyCode::Char('f') => self.open_files(),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('s') => {
                if self.player.is_playing().await {
                    self.player.stop().await;
                    self.view.apply(Paint::Notice("Playback stopped".to_string()));
                }
            }
            KeyCode::Char('h') | KeyCode::Esc | KeyCode::Backspace => self.open(Route::Home),
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: u32) -> EpisodeRow {
        EpisodeRow {
            number,
            title: format!("Episode {}", number),
            thumbnail_url: None,
            runtime: "45m".to_string(),
            available: false,
            stream_token: None,
        }
    }

    #[test]
    fn hero_paints_merge_field_by_field() {
        let mut view = ViewState::new("red");
        view.apply(Paint::Hero(HeroView {
            title: Some("Dark".to_string()),
            poster_url: Some("p.jpg".to_string()),
            genres: vec!["Drama".to_string()],
            ..Default::default()
        }));
        view.apply(Paint::Hero(HeroView {
            synopsis: Some("Time travel.".to_string()),
            ..Default::default()
        }));

        assert_eq!(view.hero.title.as_deref(), Some("Dark"));
        assert_eq!(view.hero.poster_url.as_deref(), Some("p.jpg"));
        assert_eq!(view.hero.synopsis.as_deref(), Some("Time travel."));
        assert_eq!(view.hero.genres, vec!["Drama"]);
    }

    #[test]
    fn episode_paint_replaces_rows() {
        let mut view = ViewState::new("red");
        view.apply(Paint::Episodes {
            season: 1,
            rows: (1..=10).map(row).collect(),
        });
        view.apply(Paint::Episodes {
            season: 2,
            rows: vec![row(1)],
        });
        assert_eq!(view.season, 2);
        assert_eq!(view.episodes.len(), 1);
    }

    #[test]
    fn hidden_search_keeps_last_results_for_refocus() {
        let mut view = ViewState::new("red");
        view.apply(Paint::Search {
            target: "search-results".to_string(),
            state: SearchState::NoResults,
        });
        view.apply(Paint::Search {
            target: "search-results".to_string(),
            state: SearchState::Hidden,
        });
        assert!(!view.search_visible);
        assert_eq!(view.search_state, SearchState::NoResults);
    }

    #[test]
    fn notices_expire() {
        let mut view = ViewState::new("red");
        view.apply(Paint::Notice("Failed to load media".to_string()));
        assert!(!view.expire_notice(Duration::from_secs(60)));
        assert!(view.expire_notice(Duration::ZERO));
        assert!(view.notice.is_none());
    }

    #[test]
    fn reset_keeps_theme_and_notice() {
        let mut view = ViewState::new("red");
        view.apply(Paint::Theme("blue".to_string()));
        view.apply(Paint::Notice("hello".to_string()));
        view.apply(Paint::Episodes {
            season: 3,
            rows: vec![row(1)],
        });

        view.reset_page(Screen::Detail);

        assert_eq!(view.theme, "blue");
        assert!(view.notice.is_some());
        assert!(view.episodes.is_empty());
        assert_eq!(view.season, 1);
        assert_eq!(view.screen, Screen::Detail);
    }

    #[test]
    fn file_filter_limits_visible_cards() {
        let card = |name: &str| FileCard {
            name: name.to_string(),
            size: "1 GB".to_string(),
            quality: "1080p".to_string(),
            badge: "1080P".to_string(),
            format: "MKV".to_string(),
            stream_token: None,
        };
        let mut view = ViewState::new("red");
        view.apply(Paint::Files(FilesState::Cards(vec![card("a"), card("b"), card("c")])));
        assert_eq!(view.file_cards().len(), 3);

        view.apply(Paint::FileFilter {
            quality: "1080p".to_string(),
            visible: vec![2],
        });
        let visible = view.file_cards();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].0, 2);
        assert_eq!(visible[0].1.name, "c");
    }
}
