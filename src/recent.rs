// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Home page grids: recently added titles and trending titles.

use crate::api::Backend;
use crate::context::MediaRef;
use crate::format::ImageBase;
use crate::models::{FileRecord, MediaType};
use crate::view::{GridKind, GridState, MediaCard, Paint, Surface, media_card};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Distinct titles among the files, in the order first seen, at most
/// `limit` of them. Files without a known type or id are skipped.
pub fn unique_media(files: &[FileRecord], limit: usize) -> Vec<MediaRef> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for file in files {
        if unique.len() >= limit {
            break;
        }
        let Some(media_type) = file.media_type.as_deref().and_then(MediaType::parse) else {
            continue;
        };
        if file.tmdb_id == 0 {
            continue;
        }
        let media = MediaRef::new(media_type, file.tmdb_id);
        if seen.insert(media) {
            unique.push(media);
        }
    }

    unique
}

#[derive(Clone)]
pub struct RecentlyAdded {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    images: ImageBase,
    limit: usize,
}

impl RecentlyAdded {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        images: ImageBase,
        limit: usize,
    ) -> Self {
        Self {
            backend,
            surface,
            images,
            limit,
        }
    }

    pub fn with_surface(&self, surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            ..self.clone()
        }
    }

    async fn card(&self, media: MediaRef) -> Result<MediaCard> {
        let item = match media.media_type {
            MediaType::Show => self.backend.tv_details(media.id).await?.summary(),
            MediaType::Movie => self.backend.movie_details(media.id).await?.summary(),
        };
        Ok(media_card(&item, &self.images, media.media_type))
    }

    /// Fetches each title one after another. A title that fails to load is
    /// left out; the rest still render.
    pub async fn load(&self) -> Vec<MediaCard> {
        let files = match self.backend.files(Some(self.limit)).await {
            Ok(files) => files,
            Err(e) => {
                error!("Error loading recently added files: {:#}", e);
                self.surface.paint(Paint::Notice(
                    "Failed to load recently added content".to_string(),
                ));
                return Vec::new();
            }
        };

        let unique = unique_media(&files, self.limit);
        debug!(
            "{} recent files, {} distinct titles",
            files.len(),
            unique.len()
        );

        let mut cards = Vec::with_capacity(unique.len());
        for media in unique {
            match self.card(media).await {
                Ok(card) => cards.push(card),
                Err(e) => warn!("Error loading details for {}: {:#}", media, e),
            }
        }

        info!("Recently added: {} titles", cards.len());
        self.surface.paint(Paint::Grid {
            grid: GridKind::RecentlyAdded,
            state: GridState::from_cards(GridKind::RecentlyAdded, cards.clone()),
        });
        cards
    }
}

#[derive(Clone)]
pub struct Trending {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    images: ImageBase,
}

impl Trending {
    pub fn new(backend: Arc<dyn Backend>, surface: Arc<dyn Surface>, images: ImageBase) -> Self {
        Self {
            backend,
            surface,
            images,
        }
    }

    pub fn with_surface(&self, surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            ..self.clone()
        }
    }

    pub async fn load(&self) {
        match self.backend.trending().await {
            Ok(response) => {
                let cards = response
                    .results
                    .iter()
                    .map(|item| media_card(item, &self.images, MediaType::Movie))
                    .collect();
                self.surface.paint(Paint::Grid {
                    grid: GridKind::Trending,
                    state: GridState::from_cards(GridKind::Trending, cards),
                });
            }
            Err(e) => {
                error!("Error loading trending: {:#}", e);
                self.surface
                    .paint(Paint::Notice("Failed to load trending content".to_string()));
            }
        }
    }
}
