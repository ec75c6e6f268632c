// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use strix::context::{PageContext, Route};
use strix::player::{Player, stream_url};

/// Resolves a title to a stream and hands it to the external player.
pub struct PlayCommand {
    pub route: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Print the stream URL instead of starting the player.
    pub print: bool,
}

impl PlayCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let route = match Route::parse(&self.route) {
            route @ Route::Play { .. } => route,
            Route::Media(media) => {
                let page = context.page();
                let mut ctx = PageContext::for_media(media);
                if let Some(season) = self.season {
                    ctx.set_season(season);
                }
                page.set_context(ctx);
                match page.play(self.episode).await {
                    Some(route) => route,
                    None => anyhow::bail!("Nothing to play for {}", self.route),
                }
            }
            Route::Home => anyhow::bail!(
                "Expected /tv/{{id}}, /movie/{{id}} or /play?token=..., got '{}'",
                self.route
            ),
        };

        let Some(url) = stream_url(&context.api, &route) else {
            anyhow::bail!("No stream for {}", route);
        };

        if self.print {
            println!("{}", url);
            return Ok(());
        }

        let player = Player::new(context.config.player.clone());
        if !player.is_available() {
            anyhow::bail!(
                "'{}' not found. Install it or set [player] command in the config, or use --print",
                context.config.player.command
            );
        }
        tokio::task::spawn_blocking(move || player.play(&url)).await??;
        Ok(())
    }
}
