// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Hero, recommendations and rating for a title page.

use crate::api::Backend;
use crate::episodes::EpisodeLoader;
use crate::format::{ImageBase, ImageSize, format_duration, format_rating, plural, year_of};
use crate::models::{
    Genre, ImdbRating, MediaItem, MediaType, MovieDetails, ProductionCountry, Recommendations,
    TvDetails, detail_rating,
};
use crate::view::{
    GridKind, GridState, HeroView, Paint, PlayControl, RatingView, Surface, media_card,
};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const MAX_GENRES: usize = 3;

fn genre_names(genres: &[Genre]) -> Vec<String> {
    genres
        .iter()
        .map(|g| g.name.trim())
        .filter(|n| !n.is_empty())
        .take(MAX_GENRES)
        .map(str::to_string)
        .collect()
}

fn country_names(countries: &[ProductionCountry]) -> Option<String> {
    let names: Vec<&str> = countries
        .iter()
        .map(|c| c.name.trim())
        .filter(|n| !n.is_empty())
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

pub fn show_hero(details: &TvDetails, images: &ImageBase) -> HeroView {
    HeroView {
        title: details.name.clone(),
        synopsis: details.overview.clone(),
        rating: detail_rating(&details.vote_average).map(format_rating),
        backdrop_url: images.url(ImageSize::Original, details.backdrop_path.as_deref()),
        poster_url: images.url(ImageSize::W500, details.poster_path.as_deref()),
        year: details
            .first_air_date
            .as_deref()
            .and_then(year_of)
            .map(|y| y.to_string()),
        genres: genre_names(&details.genres),
        seasons: (details.number_of_seasons > 0)
            .then(|| plural(details.number_of_seasons as usize, "Season")),
        runtime: None,
        countries: country_names(&details.production_countries),
    }
}

pub fn movie_hero(details: &MovieDetails, images: &ImageBase) -> HeroView {
    HeroView {
        title: details.title.clone(),
        synopsis: details.overview.clone(),
        rating: detail_rating(&details.vote_average).map(format_rating),
        backdrop_url: images.url(ImageSize::Original, details.backdrop_path.as_deref()),
        poster_url: images.url(ImageSize::W500, details.poster_path.as_deref()),
        year: details
            .release_date
            .as_deref()
            .and_then(year_of)
            .map(|y| y.to_string()),
        genres: genre_names(&details.genres),
        seasons: None,
        runtime: details.runtime.map(format_duration),
        countries: country_names(&details.production_countries),
    }
}

pub fn recommendation_grid(
    recommendations: Option<&Recommendations>,
    images: &ImageBase,
    fallback: MediaType,
    limit: usize,
) -> GridState {
    let items: &[MediaItem] = recommendations.map(|r| r.results.as_slice()).unwrap_or(&[]);
    let cards = items
        .iter()
        .take(limit)
        .map(|item| media_card(item, images, fallback))
        .collect();
    GridState::from_cards(GridKind::Recommendations, cards)
}

/// `None` when the lookup reported an error or carries no usable rating.
pub fn rating_view(rating: &ImdbRating) -> Option<RatingView> {
    if rating.error.is_some() {
        return None;
    }
    let value = rating.rating.as_deref().filter(|r| *r != "N/A")?;
    Some(RatingView {
        value: value.to_string(),
        source: "IMDb".to_string(),
        votes: rating
            .votes
            .as_deref()
            .filter(|v| *v != "N/A")
            .map(|v| format!("{} votes", v)),
    })
}

fn require_id(id: u64, what: &str) -> Result<()> {
    if id == 0 {
        bail!("{} payload has no id", what);
    }
    Ok(())
}

#[derive(Clone)]
pub struct DetailLoader {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    images: ImageBase,
    episodes: Arc<EpisodeLoader>,
    recommendation_limit: usize,
}

impl DetailLoader {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        images: ImageBase,
        episodes: Arc<EpisodeLoader>,
        recommendation_limit: usize,
    ) -> Self {
        Self {
            backend,
            surface,
            images,
            episodes,
            recommendation_limit,
        }
    }

    /// Same loader painting elsewhere; its episode loader follows along.
    pub fn with_surface(&self, surface: Arc<dyn Surface>) -> Self {
        Self {
            episodes: Arc::new(self.episodes.with_surface(surface.clone())),
            surface,
            ..self.clone()
        }
    }

    fn notice(&self, text: &str) {
        self.surface.paint(Paint::Notice(text.to_string()));
    }

    async fn fetch_show(&self, id: u64) -> Result<TvDetails> {
        let details = self.backend.tv_details(id).await?;
        require_id(details.id, "TV show")?;
        Ok(details)
    }

    async fn fetch_movie(&self, id: u64) -> Result<MovieDetails> {
        let details = self.backend.movie_details(id).await?;
        require_id(details.id, "Movie")?;
        Ok(details)
    }

    /// Paints a show page and its first real season. Returns the season
    /// that was loaded.
    pub async fn load_show(&self, id: u64) -> Option<u32> {
        let details = match self.fetch_show(id).await {
            Ok(details) => details,
            Err(e) => {
                error!("Error loading TV show {}: {:#}", id, e);
                self.notice("Failed to load TV show details");
                return None;
            }
        };
        info!(
            "Loaded TV show {} ({})",
            details.name.as_deref().unwrap_or("untitled"),
            id
        );

        self.surface.paint(Paint::Hero(show_hero(&details, &self.images)));

        let season = details.initial_season();
        match season {
            Some(season) => self.episodes.load(id, season).await,
            None => debug!("Show {} lists no seasons", id),
        }

        self.paint_recommendations(details.recommendations.as_ref(), MediaType::Show);

        if let Some(imdb_id) = details.external_ids.as_ref().and_then(|e| e.imdb_id.as_deref()) {
            self.refresh_rating(imdb_id).await;
        }

        season
    }

    pub async fn load_movie(&self, id: u64) {
        let details = match self.fetch_movie(id).await {
            Ok(details) => details,
            Err(e) => {
                error!("Error loading movie {}: {:#}", id, e);
                self.notice("Failed to load movie details");
                return;
            }
        };
        info!(
            "Loaded movie {} ({})",
            details.title.as_deref().unwrap_or("untitled"),
            id
        );

        self.surface.paint(Paint::Hero(movie_hero(&details, &self.images)));

        self.check_movie_availability(id).await;

        self.paint_recommendations(details.recommendations.as_ref(), MediaType::Movie);

        if let Some(imdb_id) = details.external_ids.as_ref().and_then(|e| e.imdb_id.as_deref()) {
            self.refresh_rating(imdb_id).await;
        }
    }

    /// Binds "Play Now" to the movie's token when it has one.
    pub async fn check_movie_availability(&self, id: u64) {
        match self.backend.movie_availability(id).await {
            Ok(record) => match record.stream_token {
                Some(token) => self.surface.paint(Paint::PlayControl(PlayControl::Ready { token })),
                None => debug!("Movie {} has no playable file", id),
            },
            Err(e) => warn!("Could not check availability of movie {}: {:#}", id, e),
        }
    }

    /// Recommendations only, for pages whose hero came from the server.
    pub async fn load_recommendations(&self, media_type: MediaType, id: u64) {
        let recommendations = match media_type {
            MediaType::Show => self.backend.tv_details(id).await.map(|d| d.recommendations),
            MediaType::Movie => self.backend.movie_details(id).await.map(|d| d.recommendations),
        };
        match recommendations {
            Ok(recommendations) => self.paint_recommendations(recommendations.as_ref(), media_type),
            Err(e) => {
                error!("Error loading recommendations for {} {}: {:#}", media_type, id, e);
                self.notice("Failed to load recommendations");
            }
        }
    }

    fn paint_recommendations(&self, recommendations: Option<&Recommendations>, media_type: MediaType) {
        let state = recommendation_grid(
            recommendations,
            &self.images,
            media_type,
            self.recommendation_limit,
        );
        self.surface.paint(Paint::Grid {
            grid: GridKind::Recommendations,
            state,
        });
    }

    /// Replaces the rating with the IMDb one. Any failure keeps the
    /// current rating.
    pub async fn refresh_rating(&self, imdb_id: &str) {
        match self.backend.imdb_rating(imdb_id).await {
            Ok(rating) => match rating_view(&rating) {
                Some(view) => self.surface.paint(Paint::Rating(view)),
                None => debug!(
                    "No IMDb rating for {}: {}",
                    imdb_id,
                    rating.error.as_deref().unwrap_or("missing rating")
                ),
            },
            Err(e) => warn!("Error fetching IMDb rating for {}: {:#}", imdb_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AvailabilityRecord, ExternalIds, SeasonAvailability, SeasonDetails, SeasonSummary,
    };
    use crate::test_support::{FakeBackend, RecordingSurface, item};
    use serde_json::json;

    fn loader(backend: FakeBackend) -> (DetailLoader, Arc<FakeBackend>, Arc<RecordingSurface>) {
        let backend = Arc::new(backend);
        let surface = Arc::new(RecordingSurface::new());
        let images = ImageBase::default();
        let episodes = Arc::new(EpisodeLoader::new(
            backend.clone(),
            surface.clone(),
            images.clone(),
        ));
        let loader = DetailLoader::new(backend.clone(), surface.clone(), images, episodes, 16);
        (loader, backend, surface)
    }

    fn hero(surface: &RecordingSurface) -> HeroView {
        surface
            .paints()
            .into_iter()
            .find_map(|p| match p {
                Paint::Hero(hero) => Some(hero),
                _ => None,
            })
            .expect("hero painted")
    }

    #[tokio::test]
    async fn movie_without_poster_still_fills_title_and_synopsis() {
        let movie: MovieDetails = serde_json::from_value(json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A hacker learns the truth.",
            "poster_path": null,
            "backdrop_path": "/back.jpg",
            "vote_average": 8.2,
            "release_date": "1999-03-30",
            "runtime": 136,
            "genres": [
                {"id": 28, "name": "Action"},
                {"id": 878, "name": "Science Fiction"},
                {"id": 53, "name": "Thriller"},
                {"id": 1, "name": "Extra"}
            ]
        }))
        .unwrap();
        let (loader, _backend, surface) = loader(FakeBackend::new().with_movie(movie));

        loader.load_movie(603).await;

        let hero = hero(&surface);
        assert_eq!(hero.title.as_deref(), Some("The Matrix"));
        assert_eq!(hero.synopsis.as_deref(), Some("A hacker learns the truth."));
        assert_eq!(hero.poster_url, None);
        assert_eq!(
            hero.backdrop_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/back.jpg")
        );
        assert_eq!(hero.genres, vec!["Action", "Science Fiction", "Thriller"]);
        assert_eq!(hero.runtime.as_deref(), Some("2h 16m"));
        assert_eq!(hero.year.as_deref(), Some("1999"));
        assert_eq!(
            surface.last_grid(GridKind::Recommendations),
            Some(GridState::Empty("No recommendations available".to_string()))
        );
        assert!(surface.notices().is_empty());
    }

    #[tokio::test]
    async fn available_movie_gets_play_now() {
        let (loader, _backend, surface) = loader(
            FakeBackend::new()
                .with_movie(MovieDetails {
                    id: 9,
                    title: Some("Heat".to_string()),
                    ..Default::default()
                })
                .with_movie_file(
                    9,
                    AvailabilityRecord {
                        available: true,
                        stream_token: Some("heat-token".to_string()),
                        ..Default::default()
                    },
                ),
        );

        loader.load_movie(9).await;

        assert!(surface.paints().contains(&Paint::PlayControl(PlayControl::Ready {
            token: "heat-token".to_string()
        })));
    }

    #[tokio::test]
    async fn show_loads_first_real_season_and_recommendations() {
        let show = TvDetails {
            id: 1399,
            name: Some("Game of Thrones".to_string()),
            number_of_seasons: 8,
            seasons: vec![
                SeasonSummary {
                    season_number: 0,
                    ..Default::default()
                },
                SeasonSummary {
                    season_number: 1,
                    ..Default::default()
                },
            ],
            recommendations: Some(Recommendations {
                results: vec![item(1, "Vikings", "tv"), MediaItem { id: 2, ..Default::default() }],
            }),
            external_ids: Some(ExternalIds {
                imdb_id: Some("tt0944947".to_string()),
            }),
            ..Default::default()
        };
        let (loader, backend, surface) = loader(
            FakeBackend::new()
                .with_show(show)
                .with_season(
                    1399,
                    SeasonDetails {
                        season_number: 1,
                        episodes: Vec::new(),
                    },
                )
                .with_season_files(1399, 1, SeasonAvailability::default())
                .with_imdb(
                    "tt0944947",
                    ImdbRating {
                        rating: Some("9.2".to_string()),
                        votes: Some("2,300,000".to_string()),
                        error: None,
                    },
                ),
        );

        assert_eq!(loader.load_show(1399).await, Some(1));

        assert_eq!(hero(&surface).seasons.as_deref(), Some("8 Seasons"));
        assert!(backend.calls().contains(&"season:1399:1".to_string()));
        let Some(GridState::Cards(cards)) = surface.last_grid(GridKind::Recommendations) else {
            panic!("expected recommendation cards");
        };
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[1].route.to_string(), "/tv/2");
        assert_eq!(
            surface.last(),
            Some(Paint::Rating(RatingView {
                value: "9.2".to_string(),
                source: "IMDb".to_string(),
                votes: Some("2,300,000 votes".to_string()),
            }))
        );
    }

    #[tokio::test]
    async fn failures_become_notices() {
        let (loader, _backend, surface) = loader(
            FakeBackend::new().with_show(TvDetails {
                id: 0,
                name: Some("Broken".to_string()),
                ..Default::default()
            }),
        );

        assert_eq!(loader.load_show(0).await, None);
        loader.load_movie(5).await;

        assert_eq!(
            surface.notices(),
            vec![
                "Failed to load TV show details".to_string(),
                "Failed to load movie details".to_string()
            ]
        );
    }

    #[test]
    fn imdb_ratings() {
        assert_eq!(
            rating_view(&ImdbRating {
                rating: Some("7.1".to_string()),
                votes: Some("N/A".to_string()),
                error: None
            })
            .map(|v| v.votes),
            Some(None)
        );
        assert_eq!(
            rating_view(&ImdbRating {
                rating: Some("7.1".to_string()),
                votes: None,
                error: Some("Not found".to_string())
            }),
            None
        );
        assert_eq!(rating_view(&ImdbRating::default()), None);
    }

    #[test]
    fn show_hero_skips_missing_fields() {
        let hero = show_hero(&TvDetails::default(), &ImageBase::default());
        assert_eq!(hero, HeroView::default());
    }
}
