// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::api::Backend;
use crate::context::{PageContext, Route};
use crate::models::MediaType;
use crate::view::{Paint, PlayControl, Surface};
use anyhow::Result;
use std::sync::Arc;
use tracing::{error, info};

pub const NO_FILES: &str = "No files available for this title";

/// Turns the current page into a player route.
#[derive(Clone)]
pub struct PlaybackResolver {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
}

impl PlaybackResolver {
    pub fn new(backend: Arc<dyn Backend>, surface: Arc<dyn Surface>) -> Self {
        Self { backend, surface }
    }

    pub fn with_surface(&self, surface: Arc<dyn Surface>) -> Self {
        Self {
            surface,
            ..self.clone()
        }
    }

    /// Movies use their single record; shows take the first playable file
    /// of season 1 unless an episode of the current season is named.
    async fn token_for(&self, ctx: &PageContext, episode: Option<u32>) -> Result<Option<String>> {
        let Some(media) = ctx.media else {
            return Ok(None);
        };

        let token = match (media.media_type, episode) {
            (MediaType::Movie, _) => self.backend.movie_availability(media.id).await?.stream_token,
            (MediaType::Show, Some(episode)) => {
                self.backend
                    .episode_availability(media.id, ctx.season, episode)
                    .await?
                    .stream_token
            }
            (MediaType::Show, None) => self
                .backend
                .season_availability(media.id, 1)
                .await?
                .first_playable()
                .and_then(|r| r.stream_token.clone()),
        };
        Ok(token)
    }

    /// Paints the control busy while resolving. On success navigates to the
    /// player; otherwise notices and puts the control back to its default.
    pub async fn play(&self, ctx: &PageContext, episode: Option<u32>) -> Option<Route> {
        self.surface.paint(Paint::PlayControl(PlayControl::Loading));

        match self.token_for(ctx, episode).await {
            Ok(Some(token)) => {
                info!("Resolved stream for {:?}", ctx.media);
                let route = Route::play(token.clone());
                self.surface
                    .paint(Paint::PlayControl(PlayControl::Ready { token }));
                self.surface.paint(Paint::Navigate(route.clone()));
                Some(route)
            }
            Ok(None) => {
                info!("No files for {:?}", ctx.media);
                self.surface.paint(Paint::Notice(NO_FILES.to_string()));
                self.surface.paint(Paint::PlayControl(PlayControl::Idle));
                None
            }
            Err(e) => {
                error!("Error resolving playback for {:?}: {:#}", ctx.media, e);
                self.surface
                    .paint(Paint::Notice("Failed to load media".to_string()));
                self.surface.paint(Paint::PlayControl(PlayControl::Idle));
                None
            }
        }
    }
}
