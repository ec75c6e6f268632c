// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::config::ApiConfig;
use crate::models::{
    AvailabilityRecord, FileRecord, FileSearchResponse, ImdbRating, MovieDetails,
    SearchResponse, SeasonAvailability, SeasonDetails, TvDetails,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Read-only view of the media backend. Every page component talks to the
/// backend through this trait so it can be driven without a network.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse>;
    async fn trending(&self) -> Result<SearchResponse>;
    async fn tv_details(&self, id: u64) -> Result<TvDetails>;
    async fn movie_details(&self, id: u64) -> Result<MovieDetails>;
    async fn season(&self, show_id: u64, season: u32) -> Result<SeasonDetails>;
    async fn season_availability(&self, show_id: u64, season: u32)
    -> Result<SeasonAvailability>;
    async fn episode_availability(
        &self,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<AvailabilityRecord>;
    async fn movie_availability(&self, id: u64) -> Result<AvailabilityRecord>;
    async fn files(&self, limit: Option<usize>) -> Result<Vec<FileRecord>>;
    async fn search_files(&self, query: &str) -> Result<FileSearchResponse>;
    async fn imdb_rating(&self, imdb_id: &str) -> Result<ImdbRating>;
}

#[derive(Debug)]
pub struct StrixApi {
    client: Client,
    base_url: String,
    show_progress: bool,
}

impl StrixApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let url = url::Url::parse(&config.base_url).with_context(|| "Invalid server URL")?;

        let base_url = if let Some(port) = url.port() {
            format!(
                "{}://{}:{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost"),
                port
            )
        } else {
            format!(
                "{}://{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost")
            )
        };

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(concat!("strix/", env!("CARGO_PKG_VERSION")))
                .build()?,
            base_url,
            show_progress: false,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Spinners are only wanted in line-oriented output; the TUI keeps them off.
    pub fn enable_progress(&mut self) {
        self.show_progress = true;
    }

    pub fn disable_progress(&mut self) {
        self.show_progress = false;
    }

    /// URL the external player streams from for a token.
    pub fn stream_url(&self, token: &str) -> String {
        format!("{}/stream/{}", self.base_url, urlencoding::encode(token))
    }

    fn spinner(&self, path: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}] {bytes}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Fetching {}...", path));
        Some(pb)
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = format!("{}/api/{}", self.base_url, path);
        debug!("Requesting: {}", url);

        let pb = self.spinner(path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            if let Some(pb) = &pb {
                pb.finish_and_clear();
            }
            return Err(anyhow::anyhow!(
                "HTTP request to {} failed with status: {}",
                url,
                response.status()
            ));
        }

        let mut response_bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk_result) = futures_util::StreamExt::next(&mut stream).await {
            let chunk = chunk_result.with_context(|| "Failed to read response chunk")?;
            response_bytes.extend_from_slice(&chunk);
            if let Some(pb) = &pb {
                pb.set_position(response_bytes.len() as u64);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }

        debug!("Response size: {} bytes", response_bytes.len());

        let response_text = String::from_utf8(response_bytes)
            .with_context(|| "Failed to convert response to UTF-8 string")?;

        if response_text.trim().is_empty() {
            return Err(anyhow::anyhow!("Empty response from server for {}", path));
        }

        Ok(response_text)
    }

    async fn make_request<T>(&self, path: &str) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response_text = self.fetch_text(path).await?;

        serde_json::from_str(&response_text).map_err(|e| {
            let error_msg = {
                let line_num = e.line();
                let col_num = e.column();

                let mut byte_pos = 0;
                for (i, line_content) in response_text.lines().enumerate() {
                    if i + 1 == line_num {
                        byte_pos += col_num.saturating_sub(1);
                        break;
                    }
                    byte_pos += line_content.len() + 1;
                }

                let start = floor_char_boundary(&response_text, byte_pos.saturating_sub(100));
                let end = floor_char_boundary(
                    &response_text,
                    std::cmp::min(byte_pos + 100, response_text.len()),
                );
                let context = &response_text[start..end];

                format!(
                    "JSON parsing failed for {} at line {}, column {}:\n\
                    Context: ...{}...\n\
                    Error: {}",
                    path,
                    line_num,
                    col_num,
                    context.replace(['\n', '\r'], " "),
                    e
                )
            };

            warn!("JSON parsing error: {}", error_msg);
            anyhow::anyhow!(error_msg)
        })
    }

    /// Raw JSON for any API path, for debugging from the command line.
    pub async fn make_request_raw(&self, path: &str) -> Result<Value> {
        let path = path.trim_start_matches('/').trim_start_matches("api/");
        self.make_request(path).await
    }
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[async_trait]
impl Backend for StrixApi {
    async fn search(&self, query: &str) -> Result<SearchResponse> {
        self.make_request(&format!("search?q={}", urlencoding::encode(query)))
            .await
    }

    async fn trending(&self) -> Result<SearchResponse> {
        self.make_request("trending").await
    }

    async fn tv_details(&self, id: u64) -> Result<TvDetails> {
        self.make_request(&format!("tv/{}", id)).await
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.make_request(&format!("movie/{}", id)).await
    }

    async fn season(&self, show_id: u64, season: u32) -> Result<SeasonDetails> {
        self.make_request(&format!("tv/{}/season/{}", show_id, season))
            .await
    }

    async fn season_availability(
        &self,
        show_id: u64,
        season: u32,
    ) -> Result<SeasonAvailability> {
        self.make_request(&format!("media/tv/{}/season/{}", show_id, season))
            .await
    }

    async fn episode_availability(
        &self,
        show_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<AvailabilityRecord> {
        self.make_request(&format!(
            "media/tv/{}/season/{}/episode/{}",
            show_id, season, episode
        ))
        .await
    }

    async fn movie_availability(&self, id: u64) -> Result<AvailabilityRecord> {
        self.make_request(&format!("media/movie/{}", id)).await
    }

    async fn files(&self, limit: Option<usize>) -> Result<Vec<FileRecord>> {
        let path = match limit {
            Some(limit) => format!("files?limit={}", limit),
            None => "files".to_string(),
        };
        // The backend encodes an empty listing as `null`.
        let files: Option<Vec<FileRecord>> = self.make_request(&path).await?;
        Ok(files.unwrap_or_default())
    }

    async fn search_files(&self, query: &str) -> Result<FileSearchResponse> {
        self.make_request(&format!("files/search?q={}", urlencoding::encode(query)))
            .await
    }

    async fn imdb_rating(&self, imdb_id: &str) -> Result<ImdbRating> {
        self.make_request(&format!("imdb/{}", urlencoding::encode(imdb_id)))
            .await
    }
}
