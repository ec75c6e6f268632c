// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use strix::format::ImageBase;
use strix::search::SearchClient;
use strix::view::SearchState;

pub struct SearchCommand {
    pub query: String,
    pub mobile: bool,
}

impl SearchCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let profile = if self.mobile {
            context.config.search.mobile.clone()
        } else {
            context.config.search.desktop.clone()
        };

        let query = self.query.trim();
        if query.chars().count() < profile.submit_min_len.max(1) {
            anyhow::bail!(
                "Query must be at least {} character(s)",
                profile.submit_min_len.max(1)
            );
        }

        let client = SearchClient::new(
            context.api.clone(),
            context.surface.clone(),
            profile,
            ImageBase::new(&context.config.api.image_base_url),
        );

        match client.search_now(query).await {
            SearchState::Error => anyhow::bail!("Search for '{}' failed", query),
            _ => Ok(()),
        }
    }
}
