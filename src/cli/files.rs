// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use strix::files::{ALL_QUALITIES, qualities};

pub struct FilesCommand {
    pub quality: Option<String>,
    pub search: Option<String>,
}

impl FilesCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let page = context.page();

        let cards = match &self.search {
            Some(query) => page.search_files(query).await,
            None => page.load_files().await,
        };

        match self.quality.as_deref() {
            Some(quality) if quality != ALL_QUALITIES => {
                let available = qualities(&cards);
                if !available.iter().any(|q| q.eq_ignore_ascii_case(quality)) {
                    eprintln!("Available qualities: {}", available.join(", "));
                }
                page.filter_files(quality);
            }
            _ => {}
        }

        Ok(())
    }
}
