// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::api::Backend;
use crate::format::{ImageBase, ImageSize};
use crate::models::{EpisodeRecord, SeasonAvailability};
use crate::view::{EpisodeRow, Paint, Surface, runtime_label};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, warn};

/// Joins an episode list with the season's availability map on episode
/// number. Every episode yields a row; episodes missing from the map are
/// locked.
pub fn join_availability(
    episodes: &[EpisodeRecord],
    availability: &SeasonAvailability,
    images: &ImageBase,
) -> Vec<EpisodeRow> {
    episodes
        .iter()
        .map(|episode| {
            let record = availability.get(episode.episode_number);
            EpisodeRow {
                number: episode.episode_number,
                title: episode
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("Episode {}", episode.episode_number)),
                thumbnail_url: images.url(ImageSize::W300, episode.still_path.as_deref()),
                runtime: runtime_label(episode.runtime),
                available: record.is_some_and(|r| r.available),
                stream_token: record.and_then(|r| r.stream_token.clone()),
            }
        })
        .collect()
}

/// Loaders made with [`EpisodeLoader::with_surface`] share the generation
/// counter, so a newer season load overtakes an older one on any surface.
#[derive(Clone)]
pub struct EpisodeLoader {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    images: ImageBase,
    generation: Arc<AtomicU64>,
}

impl EpisodeLoader {
    pub fn new(backend: Arc<dyn Backend>, surface: Arc<dyn Surface>, images: ImageBase) -> Self {
        Self {
            backend,
            surface,
            images,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_surface(&self, surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            ..self.clone()
        }
    }

    /// Loads and paints one season, replacing whatever list was painted
    /// before. A load that was overtaken by a later one paints nothing.
    pub async fn load(&self, show_id: u64, season: u32) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Loading season {} of show {}", season, show_id);

        let (episodes, availability) = tokio::join!(
            self.backend.season(show_id, season),
            self.backend.season_availability(show_id, season)
        );

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "Discarding season {} of show {}: a newer season was requested",
                season, show_id
            );
            return;
        }

        let episodes = match episodes {
            Ok(details) => details.episodes,
            Err(e) => {
                error!("Failed to load season {} of show {}: {:#}", season, show_id, e);
                self.surface
                    .paint(Paint::Notice("Failed to load episodes".to_string()));
                return;
            }
        };

        let availability = availability.unwrap_or_else(|e| {
            warn!(
                "No availability for season {} of show {}: {:#}",
                season, show_id, e
            );
            SeasonAvailability::default()
        });

        let rows = join_availability(&episodes, &availability, &self.images);
        debug!(
            "Season {}: {} episodes, {} available",
            season,
            rows.len(),
            rows.iter().filter(|r| r.available).count()
        );
        self.surface.paint(Paint::Episodes { season, rows });
    }
}
