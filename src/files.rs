// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::api::Backend;
use crate::models::FileRecord;
use crate::view::{FileCard, FilesState, Paint, Surface, file_card};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error};

pub const ALL_QUALITIES: &str = "all";

/// Indices of the cards matching a quality filter (`all` matches every card).
pub fn filter_indices(cards: &[FileCard], quality: &str) -> Vec<usize> {
    let quality = quality.trim().to_lowercase();
    cards
        .iter()
        .enumerate()
        .filter(|(_, card)| quality == ALL_QUALITIES || card.quality == quality)
        .map(|(i, _)| i)
        .collect()
}

pub fn filter_notice(count: usize, quality: &str) -> String {
    let quality = quality.trim().to_lowercase();
    if quality == ALL_QUALITIES {
        format!("Showing {} file(s)", count)
    } else {
        format!("Showing {} {} file(s)", count, quality)
    }
}

/// Distinct quality tags in listing order, for building filter choices.
pub fn qualities(cards: &[FileCard]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for card in cards {
        if !tags.contains(&card.quality) {
            tags.push(card.quality.clone());
        }
    }
    tags
}

pub struct FileGrid {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    cards: Mutex<Vec<FileCard>>,
}

impl FileGrid {
    pub fn new(backend: Arc<dyn Backend>, surface: Arc<dyn Surface>) -> Self {
        Self {
            backend,
            surface,
            cards: Mutex::new(Vec::new()),
        }
    }

    fn show(&self, files: &[FileRecord]) -> Vec<FileCard> {
        let cards: Vec<FileCard> = files.iter().map(file_card).collect();
        *self.cards.lock().unwrap_or_else(PoisonError::into_inner) = cards.clone();

        let state = if cards.is_empty() {
            FilesState::Empty("No files available".to_string())
        } else {
            FilesState::Cards(cards.clone())
        };
        self.surface.paint(Paint::Files(state));
        cards
    }

    pub async fn load(&self) -> Vec<FileCard> {
        match self.backend.files(None).await {
            Ok(files) => {
                debug!("Loaded {} files", files.len());
                self.show(&files)
            }
            Err(e) => {
                error!("Error loading files: {:#}", e);
                self.surface
                    .paint(Paint::Notice("Failed to load files".to_string()));
                Vec::new()
            }
        }
    }

    pub async fn search(&self, query: &str) -> Vec<FileCard> {
        match self.backend.search_files(query.trim()).await {
            Ok(response) => {
                debug!("File search '{}' matched {}", response.query, response.count);
                self.show(&response.results)
            }
            Err(e) => {
                error!("Error searching files for '{}': {:#}", query, e);
                self.surface
                    .paint(Paint::Notice("Failed to search files".to_string()));
                Vec::new()
            }
        }
    }

    pub fn filter(&self, quality: &str) -> Vec<usize> {
        let visible = filter_indices(
            &self.cards.lock().unwrap_or_else(PoisonError::into_inner),
            quality,
        );
        self.surface.paint(Paint::FileFilter {
            quality: quality.trim().to_lowercase(),
            visible: visible.clone(),
        });
        self.surface
            .paint(Paint::Notice(filter_notice(visible.len(), quality)));
        visible
    }

    pub fn click(&self, index: usize) -> Option<Paint> {
        let paint = self
            .cards
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(index)
            .map(FileCard::activate)?;
        self.surface.paint(paint.clone());
        Some(paint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Route;
    use crate::test_support::{FakeBackend, RecordingSurface};

    fn record(name: &str, quality: Option<&str>, token: Option<&str>) -> FileRecord {
        FileRecord {
            file_name: Some(name.to_string()),
            quality: quality.map(str::to_string),
            stream_token: token.map(str::to_string),
            file_size: 1024,
            ..Default::default()
        }
    }

    fn grid() -> (FileGrid, Arc<RecordingSurface>) {
        let backend = FakeBackend::new().with_files(vec![
            record("a.mkv", Some("1080p"), Some("ta")),
            record("b.mp4", Some("720P"), None),
            record("c.avi", None, Some("tc")),
            record("d.mkv", Some("1080P"), Some("td")),
        ]);
        let surface = Arc::new(RecordingSurface::new());
        (FileGrid::new(Arc::new(backend), surface.clone()), surface)
    }

    #[tokio::test]
    async fn filter_compares_lowercase_tags() {
        let (grid, surface) = grid();
        let cards = grid.load().await;
        assert_eq!(qualities(&cards), vec!["1080p", "720p", "unknown"]);

        assert_eq!(grid.filter("1080P"), vec![0, 3]);
        assert_eq!(surface.last(), Some(Paint::Notice("Showing 2 1080p file(s)".to_string())));

        assert_eq!(grid.filter("unknown"), vec![2]);
        assert_eq!(grid.filter("all"), vec![0, 1, 2, 3]);
        assert_eq!(surface.last(), Some(Paint::Notice("Showing 4 file(s)".to_string())));
    }

    #[tokio::test]
    async fn clicking_cards() {
        let (grid, _surface) = grid();
        grid.load().await;

        assert_eq!(grid.click(0), Some(Paint::Navigate(Route::play("ta"))));
        assert_eq!(
            grid.click(1),
            Some(Paint::Notice("No stream available for: b.mp4".to_string()))
        );
        assert_eq!(grid.click(9), None);
    }

    #[tokio::test]
    async fn empty_listing() {
        let surface = Arc::new(RecordingSurface::new());
        let grid = FileGrid::new(Arc::new(FakeBackend::new().with_files(Vec::new())), surface.clone());
        grid.load().await;
        assert_eq!(
            surface.last(),
            Some(Paint::Files(FilesState::Empty("No files available".to_string())))
        );
    }

    #[tokio::test]
    async fn search_narrows_listing() {
        let (grid, _surface) = grid();
        let cards = grid.search("MKV").await;
        assert_eq!(cards.len(), 2);
    }
}
