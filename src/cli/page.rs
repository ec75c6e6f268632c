// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::{Context, Result};
use strix::context::{PageSource, Route, ServerMediaData};

/// Renders one page the way a browser would on first load.
pub struct PageCommand {
    pub route: String,
    /// Server-rendered media data as JSON; skips the hero fetch.
    pub server_data: Option<String>,
    pub season: Option<u32>,
}

impl PageCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let source = match &self.server_data {
            Some(json) => PageSource::Server(
                ServerMediaData::from_json(json).with_context(|| "Invalid server media data")?,
            ),
            None => PageSource::Route(Route::parse(&self.route)),
        };

        let page = context.page();
        page.initialize(source).await;

        if let Some(season) = self.season {
            if page.context().show_id().is_none() {
                anyhow::bail!("--season only applies to TV show pages");
            }
            if season != page.context().season {
                page.change_season(season).await;
            }
        }

        Ok(())
    }
}
