// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Scriptable backend and a surface that records paints.

use crate::api::Backend;
use crate::models::{
    AvailabilityRecord, FileRecord, FileSearchResponse, ImdbRating, MediaItem, MovieDetails,
    SearchResponse, SeasonAvailability, SeasonDetails, TvDetails,
};
use crate::view::{GridKind, GridState, Paint, SearchState, Surface};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Entries that were never registered fail like a backend 404.
#[derive(Default)]
pub struct FakeBackend {
    searches: HashMap<String, Vec<MediaItem>>,
    delays: HashMap<String, Duration>,
    failing_searches: Vec<String>,
    trending: Option<Vec<MediaItem>>,
    shows: HashMap<u64, TvDetails>,
    movies: HashMap<u64, MovieDetails>,
    seasons: HashMap<(u64, u32), SeasonDetails>,
    season_files: HashMap<(u64, u32), SeasonAvailability>,
    episode_files: HashMap<(u64, u32, u32), AvailabilityRecord>,
    movie_files: HashMap<u64, AvailabilityRecord>,
    files: Option<Vec<FileRecord>>,
    imdb: HashMap<String, ImdbRating>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: &str, results: Vec<MediaItem>) -> Self {
        self.searches.insert(query.to_string(), results);
        self
    }

    pub fn with_search_delay(self, query: &str, delay: Duration) -> Self {
        self.with_delay(&format!("search:{}", query), delay)
    }

    /// Holds back the answer to one call, named as in [`FakeBackend::calls`].
    pub fn with_delay(mut self, call: &str, delay: Duration) -> Self {
        self.delays.insert(call.to_string(), delay);
        self
    }

    pub fn with_failing_search(mut self, query: &str) -> Self {
        self.failing_searches.push(query.to_string());
        self
    }

    pub fn with_trending(mut self, results: Vec<MediaItem>) -> Self {
        self.trending = Some(results);
        self
    }

    pub fn with_show(mut self, details: TvDetails) -> Self {
        self.shows.insert(details.id, details);
        self
    }

    pub fn with_movie(mut self, details: MovieDetails) -> Self {
        self.movies.insert(details.id, details);
        self
    }

    pub fn with_season(mut self, show_id: u64, details: SeasonDetails) -> Self {
        self.seasons.insert((show_id, details.season_number), details);
        self
    }

    pub fn with_season_files(
        mut self,
        show_id: u64,
        season: u32,
        files: SeasonAvailability,
    ) -> Self {
        self.season_files.insert((show_id, season), files);
        self
    }

    pub fn with_episode_file(
        mut self,
        show_id: u64,
        season: u32,
        episode: u32,
        record: AvailabilityRecord,
    ) -> Self {
        self.episode_files.insert((show_id, season, episode), record);
        self
    }

    pub fn with_movie_file(mut self, id: u64, record: AvailabilityRecord) -> Self {
        self.movie_files.insert(id, record);
        self
    }

    pub fn with_files(mut self, files: Vec<FileRecord>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn with_imdb(mut self, imdb_id: &str, rating: ImdbRating) -> Self {
        self.imdb.insert(imdb_id.to_string(), rating);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    async fn record(&self, call: String) {
        let delay = self.delays.get(&call).copied();
        self.calls.lock().unwrap().push(call);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

fn missing(what: String) -> anyhow::Error {
    anyhow!("HTTP request for {} failed with status: 404 Not Found", what)
}

#[async_trait]
impl Backend for FakeBackend {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        self.record(format!("search:{}", query)).await;
        if self.failing_searches.iter().any(|q| q == query) {
            return Err(anyhow!("connection reset"));
        }
        Ok(SearchResponse {
            query: Some(query.to_string()),
            results: self.searches.get(query).cloned().unwrap_or_default(),
        })
    }

    async fn trending(&self) -> Result<SearchResponse> {
        self.record("trending".to_string()).await;
        self.trending
            .clone()
            .map(|results| SearchResponse {
                query: None,
                results,
            })
            .ok_or_else(|| missing("trending".to_string()))
    }

    async fn tv_details(&self, id: u64) -> Result<TvDetails> {
        self.record(format!("tv:{}", id)).await;
        self.shows
            .get(&id)
            .cloned()
            .ok_or_else(|| missing(format!("tv/{}", id)))
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.record(format!("movie:{}", id)).await;
        self.movies
            .get(&id)
            .cloned()
            .ok_or_else(|| missing(format!("movie/{}", id)))
    }

    async fn season(&self, show_id: u64, season: u32) -> Result<SeasonDetails> {
        self.record(format!("season:{}:{}", show_id, season)).await;
        self.seasons
            .get(&(show_id, season))
            .cloned()
            .ok_or_else(|| missing(format!("tv/{}/season/{}", show_id, season)))
    }

    async fn season_availability(
        &self,
        show_id: u64,
        season: u32,
    ) -> Result<SeasonAvailability> {
        self.record(format!("season-files:{}:{}", show_id, season)).await;
        self.season_files
            .get(&(show_id, season))
            .cloned()
            .ok_or_else(|| missing(format!("media/tv/{}/season/{}", show_id, season)))
    }

    async fn episode_availability(
        &self,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<AvailabilityRecord> {
        self.record(format!("episode-file:{}:{}:{}", show_id, season, episode)).await;
        self.episode_files
            .get(&(show_id, season, episode))
            .cloned()
            .ok_or_else(|| missing(format!("media/tv/{}/season/{}/episode/{}", show_id, season, episode)))
    }

    async fn movie_availability(&self, id: u64) -> Result<AvailabilityRecord> {
        self.record(format!("movie-file:{}", id)).await;
        self.movie_files
            .get(&id)
            .cloned()
            .ok_or_else(|| missing(format!("media/movie/{}", id)))
    }

    async fn files(&self, limit: Option<usize>) -> Result<Vec<FileRecord>> {
        self.record(format!("files:{:?}", limit)).await;
        let files = self.files.clone().ok_or_else(|| missing("files".to_string()))?;
        Ok(match limit {
            Some(limit) => files.into_iter().take(limit).collect(),
            None => files,
        })
    }

    async fn search_files(&self, query: &str) -> Result<FileSearchResponse> {
        self.record(format!("search-files:{}", query)).await;
        let needle = query.to_lowercase();
        let results: Vec<FileRecord> = self
            .files
            .clone()
            .unwrap_or_default()
            .into_iter()
            .filter(|f| {
                f.file_name
                    .as_deref()
                    .or(f.title.as_deref())
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
            })
            .collect();
        Ok(FileSearchResponse {
            query: query.to_string(),
            count: results.len(),
            results,
        })
    }

    async fn imdb_rating(&self, imdb_id: &str) -> Result<ImdbRating> {
        self.record(format!("imdb:{}", imdb_id)).await;
        self.imdb
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| missing(format!("imdb/{}", imdb_id)))
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    paints: Mutex<Vec<Paint>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paints(&self) -> Vec<Paint> {
        self.paints.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.paints()
            .into_iter()
            .filter_map(|p| match p {
                Paint::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn search_states(&self) -> Vec<SearchState> {
        self.paints()
            .into_iter()
            .filter_map(|p| match p {
                Paint::Search { state, .. } => Some(state),
                _ => None,
            })
            .collect()
    }

    pub fn last_search(&self) -> Option<SearchState> {
        self.search_states().pop()
    }

    pub fn last_grid(&self, kind: GridKind) -> Option<GridState> {
        self.paints().into_iter().rev().find_map(|p| match p {
            Paint::Grid { grid, state } if grid == kind => Some(state),
            _ => None,
        })
    }

    pub fn last(&self) -> Option<Paint> {
        self.paints().pop()
    }
}

impl Surface for RecordingSurface {
    fn paint(&self, paint: Paint) {
        self.paints.lock().unwrap().push(paint);
    }
}

pub fn item(id: u64, title: &str, media_type: &str) -> MediaItem {
    MediaItem {
        id,
        title: Some(title.to_string()),
        media_type: Some(media_type.to_string()),
        vote_average: 7.5,
        ..Default::default()
    }
}
