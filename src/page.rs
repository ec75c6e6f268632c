// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Page orchestration.
//!
//! A [`Page`] owns the components of one page and the [`PageContext`] they
//! share. Initialization decides what loads from where the page came from;
//! afterwards each user action drives exactly one component.
//!
//! Every navigation gets a number. Loads paint through a surface stamped
//! with the navigation they belong to, and those paints are dropped once a
//! later navigation has started.

use crate::api::Backend;
use crate::config::Config;
use crate::context::{PageContext, PageSource, Route};
use crate::detail::DetailLoader;
use crate::episodes::EpisodeLoader;
use crate::files::FileGrid;
use crate::format::ImageBase;
use crate::models::MediaType;
use crate::playback::PlaybackResolver;
use crate::prefs::ThemeStore;
use crate::recent::{RecentlyAdded, Trending};
use crate::view::{FileCard, Paint, Surface};
use anyhow::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

struct NavigationSurface {
    inner: Arc<dyn Surface>,
    current: Arc<AtomicU64>,
    navigation: u64,
}

impl NavigationSurface {
    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.navigation
    }
}

impl Surface for NavigationSurface {
    fn paint(&self, paint: Paint) {
        if self.is_current() {
            self.inner.paint(paint);
        } else {
            debug!("Dropping paint from superseded navigation {}", self.navigation);
        }
    }
}

pub struct Page {
    context: Mutex<PageContext>,
    navigation: Arc<AtomicU64>,
    surface: Arc<dyn Surface>,
    episodes: Arc<EpisodeLoader>,
    detail: DetailLoader,
    recent: RecentlyAdded,
    trending: Trending,
    files: FileGrid,
    playback: PlaybackResolver,
    themes: ThemeStore,
}

impl Page {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        config: &Config,
        themes: ThemeStore,
    ) -> Self {
        let images = ImageBase::new(&config.api.image_base_url);
        let episodes = Arc::new(EpisodeLoader::new(
            backend.clone(),
            surface.clone(),
            images.clone(),
        ));

        Self {
            context: Mutex::new(PageContext::default()),
            navigation: Arc::new(AtomicU64::new(0)),
            detail: DetailLoader::new(
                backend.clone(),
                surface.clone(),
                images.clone(),
                episodes.clone(),
                config.ui.recommendation_limit,
            ),
            recent: RecentlyAdded::new(
                backend.clone(),
                surface.clone(),
                images.clone(),
                config.ui.recent_limit,
            ),
            trending: Trending::new(backend.clone(), surface.clone(), images),
            files: FileGrid::new(backend.clone(), surface.clone()),
            playback: PlaybackResolver::new(backend, surface.clone()),
            episodes,
            surface,
            themes,
        }
    }

    pub fn context(&self) -> PageContext {
        *self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Points the page at a title without loading anything.
    pub fn set_context(&self, ctx: PageContext) {
        self.update_context(|current| *current = ctx);
    }

    /// Surface for work belonging to `navigation`.
    fn stamped(&self, navigation: u64) -> Arc<NavigationSurface> {
        Arc::new(NavigationSurface {
            inner: self.surface.clone(),
            current: self.navigation.clone(),
            navigation,
        })
    }

    /// Supersedes every load still running for an earlier navigation.
    fn begin_navigation(&self) -> Arc<NavigationSurface> {
        let navigation = self.navigation.fetch_add(1, Ordering::SeqCst) + 1;
        self.stamped(navigation)
    }

    fn current_surface(&self) -> Arc<NavigationSurface> {
        self.stamped(self.navigation.load(Ordering::SeqCst))
    }

    fn update_context(&self, update: impl FnOnce(&mut PageContext)) -> PageContext {
        let mut ctx = self.context.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut ctx);
        *ctx
    }

    pub async fn initialize(&self, source: PageSource) {
        let stamped = self.begin_navigation();
        let surface: Arc<dyn Surface> = stamped.clone();
        self.themes.apply(surface.as_ref());

        let ctx = self.update_context(|ctx| *ctx = PageContext::from_source(&source));
        debug!("Initializing page with {:?}", ctx);

        let detail = self.detail.with_surface(surface.clone());

        match source {
            PageSource::Server(data) => {
                info!("Page rendered by server for {} {}", data.media_type, data.id);
                match data.media_type {
                    MediaType::Show => {
                        self.episodes
                            .with_surface(surface.clone())
                            .load(data.id, ctx.season)
                            .await
                    }
                    MediaType::Movie => detail.check_movie_availability(data.id).await,
                }
                detail.load_recommendations(data.media_type, data.id).await;
                if let Some(imdb_id) = data.imdb_id.as_deref().filter(|id| !id.is_empty()) {
                    detail.refresh_rating(imdb_id).await;
                }
            }
            PageSource::Route(Route::Media(media)) => match media.media_type {
                MediaType::Show => {
                    let season = detail.load_show(media.id).await;
                    if let Some(season) = season.filter(|_| stamped.is_current()) {
                        self.update_context(|ctx| ctx.set_season(season));
                    }
                }
                MediaType::Movie => detail.load_movie(media.id).await,
            },
            PageSource::Route(Route::Home) => {
                let recent = self.recent.with_surface(surface.clone());
                let trending = self.trending.with_surface(surface.clone());
                tokio::join!(recent.load(), trending.load());
            }
            PageSource::Route(Route::Play { .. }) => {
                debug!("Player route has no page content to load");
            }
        }
    }

    /// Season selector change. Only show pages have seasons.
    pub async fn change_season(&self, season: u32) {
        let ctx = self.update_context(|ctx| ctx.set_season(season));
        match ctx.show_id() {
            Some(show_id) => {
                self.episodes
                    .with_surface(self.current_surface())
                    .load(show_id, season)
                    .await
            }
            None => debug!("Ignoring season change on a page without a show"),
        }
    }

    pub async fn play(&self, episode: Option<u32>) -> Option<Route> {
        let ctx = self.context();
        self.playback
            .with_surface(self.current_surface())
            .play(&ctx, episode)
            .await
    }

    /// The files grid is a page of its own; opening it supersedes title loads.
    pub async fn load_files(&self) -> Vec<FileCard> {
        self.begin_navigation();
        self.files.load().await
    }

    pub async fn search_files(&self, query: &str) -> Vec<FileCard> {
        self.files.search(query).await
    }

    pub fn filter_files(&self, quality: &str) -> Vec<usize> {
        self.files.filter(quality)
    }

    pub fn click_file(&self, index: usize) -> Option<Paint> {
        self.files.click(index)
    }

    pub fn select_theme(&self, theme: &str) -> Result<()> {
        self.themes.select(theme, self.surface.as_ref())
    }

    pub fn theme(&self) -> String {
        self.themes.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{MediaRef, ServerMediaData};
    use crate::models::{
        AvailabilityRecord, FileRecord, ImdbRating, MovieDetails, SeasonDetails, SeasonSummary,
        TvDetails,
    };
    use crate::test_support::{FakeBackend, RecordingSurface, item};
    use crate::view::{GridKind, GridState, PlayControl};
    use std::time::Duration;

    fn page(backend: FakeBackend) -> (Page, Arc<FakeBackend>, Arc<RecordingSurface>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(backend);
        let surface = Arc::new(RecordingSurface::new());
        let page = Page::new(
            backend.clone(),
            surface.clone(),
            &Config::default(),
            ThemeStore::new(dir.path().join("prefs.json"), "red"),
        );
        (page, backend, surface, dir)
    }

    fn show() -> TvDetails {
        TvDetails {
            id: 1396,
            name: Some("Breaking Bad".to_string()),
            seasons: vec![
                SeasonSummary {
                    season_number: 1,
                    ..Default::default()
                },
                SeasonSummary {
                    season_number: 2,
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn season(number: u32) -> SeasonDetails {
        SeasonDetails {
            season_number: number,
            episodes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn home_loads_both_grids_and_theme() {
        let (page, _backend, surface, _dir) = page(
            FakeBackend::new()
                .with_files(vec![FileRecord {
                    tmdb_id: 603,
                    media_type: Some("movie".to_string()),
                    ..Default::default()
                }])
                .with_movie(MovieDetails {
                    id: 603,
                    title: Some("The Matrix".to_string()),
                    ..Default::default()
                })
                .with_trending(vec![item(1, "One", "tv")]),
        );

        page.initialize(PageSource::Route(Route::Home)).await;

        assert_eq!(surface.paints()[0], Paint::Theme("red".to_string()));
        assert!(matches!(
            surface.last_grid(GridKind::RecentlyAdded),
            Some(GridState::Cards(c)) if c[0].title == "The Matrix"
        ));
        assert!(surface.last_grid(GridKind::Trending).is_some());
        assert_eq!(page.context(), PageContext::default());
    }

    #[tokio::test]
    async fn show_route_then_season_change() {
        let (page, backend, surface, _dir) = page(
            FakeBackend::new()
                .with_show(show())
                .with_season(1396, season(1))
                .with_season(1396, season(2)),
        );

        page.initialize(PageSource::Route(Route::parse("/tv/1396"))).await;
        assert_eq!(page.context().season, 1);

        page.change_season(2).await;
        assert_eq!(page.context().season, 2);
        assert_eq!(
            backend.calls_starting_with("season:"),
            vec!["season:1396:1", "season:1396:2"]
        );
        assert!(matches!(
            surface.last(),
            Some(Paint::Episodes { season: 2, .. })
        ));
    }

    #[tokio::test]
    async fn server_page_loads_only_dynamic_parts() {
        let (page, backend, surface, _dir) = page(
            FakeBackend::new()
                .with_show(show())
                .with_season(1396, season(3))
                .with_imdb(
                    "tt0903747",
                    ImdbRating {
                        rating: Some("9.5".to_string()),
                        votes: Some("2,000,000".to_string()),
                        error: None,
                    },
                ),
        );
        let data = ServerMediaData::from_json(
            r#"{"id": 1396, "type": "tv", "imdbId": "tt0903747", "season": 3}"#,
        )
        .unwrap();

        page.initialize(PageSource::Server(data)).await;

        assert_eq!(page.context().media, Some(MediaRef::show(1396)));
        assert!(backend.calls().contains(&"season:1396:3".to_string()));
        assert!(!surface.paints().iter().any(|p| matches!(p, Paint::Hero(_))));
        assert!(matches!(surface.last(), Some(Paint::Rating(_))));
    }

    #[tokio::test]
    async fn season_change_on_movie_page_does_nothing() {
        let (page, backend, surface, _dir) = page(
            FakeBackend::new()
                .with_movie(MovieDetails {
                    id: 8,
                    title: Some("Eight".to_string()),
                    ..Default::default()
                })
                .with_movie_file(8, AvailabilityRecord::default()),
        );

        page.initialize(PageSource::Route(Route::parse("/movie/8"))).await;
        page.change_season(4).await;

        assert!(backend.calls_starting_with("season").is_empty());
        assert_eq!(page.play(None).await, None);
        assert_eq!(surface.last(), Some(Paint::PlayControl(PlayControl::Idle)));
    }

    #[tokio::test]
    async fn theme_selection_is_painted() {
        let (page, _backend, surface, _dir) = page(FakeBackend::new());
        page.select_theme("green").unwrap();
        assert_eq!(surface.last(), Some(Paint::Theme("green".to_string())));
        assert_eq!(page.theme(), "green");
    }

    fn movie(id: u64, title: &str, token: &str) -> (MovieDetails, AvailabilityRecord) {
        (
            MovieDetails {
                id,
                title: Some(title.to_string()),
                ..Default::default()
            },
            AvailabilityRecord {
                available: true,
                stream_token: Some(token.to_string()),
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn slow_load_of_previous_title_paints_nothing() {
        let (old, old_file) = movie(1, "Old", "OLD-TOKEN");
        let (new, new_file) = movie(2, "New", "NEW-TOKEN");
        let (page, _backend, surface, _dir) = page(
            FakeBackend::new()
                .with_movie(old)
                .with_movie_file(1, old_file)
                .with_movie(new)
                .with_movie_file(2, new_file)
                .with_delay("movie:1", Duration::from_secs(5)),
        );
        let page = Arc::new(page);

        let slow = tokio::spawn({
            let page = page.clone();
            async move {
                page.initialize(PageSource::Route(Route::parse("/movie/1")))
                    .await
            }
        });
        tokio::task::yield_now().await;

        page.initialize(PageSource::Route(Route::parse("/movie/2")))
            .await;
        slow.await.unwrap();

        assert_eq!(page.context().media, Some(MediaRef::movie(2)));
        let titles: Vec<Option<String>> = surface
            .paints()
            .into_iter()
            .filter_map(|p| match p {
                Paint::Hero(hero) => Some(hero.title),
                _ => None,
            })
            .collect();
        assert_eq!(titles, vec![Some("New".to_string())]);

        let controls: Vec<PlayControl> = surface
            .paints()
            .into_iter()
            .filter_map(|p| match p {
                Paint::PlayControl(control) => Some(control),
                _ => None,
            })
            .collect();
        assert_eq!(
            controls,
            vec![PlayControl::Ready {
                token: "NEW-TOKEN".to_string()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn opening_files_stops_a_running_title_load() {
        let (old, old_file) = movie(1, "Old", "OLD-TOKEN");
        let (page, _backend, surface, _dir) = page(
            FakeBackend::new()
                .with_movie(old)
                .with_movie_file(1, old_file)
                .with_files(Vec::new())
                .with_delay("movie:1", Duration::from_secs(5)),
        );
        let page = Arc::new(page);

        let slow = tokio::spawn({
            let page = page.clone();
            async move {
                page.initialize(PageSource::Route(Route::parse("/movie/1")))
                    .await
            }
        });
        tokio::task::yield_now().await;

        page.load_files().await;
        slow.await.unwrap();

        assert!(
            !surface
                .paints()
                .iter()
                .any(|p| matches!(p, Paint::Hero(_) | Paint::PlayControl(_)))
        );
    }
}
