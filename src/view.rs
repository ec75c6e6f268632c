// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! View models and the paint boundary.
//!
//! Components build plain values here and hand them to a [`Surface`] as a
//! [`Paint`]. Nothing in this module performs I/O, so every mapping from an
//! API record to what the user sees can be checked without a terminal.

use crate::context::Route;
use crate::format::{
    ImageBase, ImageSize, format_duration, format_file_size, format_rating, rating_label,
    year_label,
};
use crate::models::{FileRecord, MediaItem, MediaType};
use serde::Serialize;

pub const DEFAULT_RUNTIME_MINUTES: u32 = 45;
pub const NO_DESCRIPTION: &str = "No description available";

/// Whatever the user looks at. Implementations apply a paint in full,
/// replacing the previous content of the region it names.
pub trait Surface: Send + Sync {
    fn paint(&self, paint: Paint);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "paint", content = "data", rename_all = "snake_case")]
pub enum Paint {
    Search { target: String, state: SearchState },
    Hero(HeroView),
    Rating(RatingView),
    Episodes { season: u32, rows: Vec<EpisodeRow> },
    Grid { grid: GridKind, state: GridState },
    Files(FilesState),
    FileFilter { quality: String, visible: Vec<usize> },
    PlayControl(PlayControl),
    Notice(String),
    Navigate(Route),
    Theme(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SearchState {
    Hidden,
    Loading,
    Results(Vec<SearchRow>),
    NoResults,
    Error,
}

impl SearchState {
    pub const LOADING_TEXT: &'static str = "Searching...";
    pub const NO_RESULTS_TEXT: &'static str = "No results found";
    pub const ERROR_TEXT: &'static str = "Search failed. Please try again.";

    /// Whether the dropdown has something worth re-showing.
    pub fn has_content(&self) -> bool {
        !matches!(self, SearchState::Hidden | SearchState::Loading)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRow {
    pub title: String,
    pub type_label: String,
    pub year: String,
    pub rating: String,
    pub poster_url: Option<String>,
    pub route: Option<Route>,
}

/// Hero fields; `None` means "leave what is there".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeroView {
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub rating: Option<String>,
    pub backdrop_url: Option<String>,
    pub poster_url: Option<String>,
    pub year: Option<String>,
    pub genres: Vec<String>,
    pub seasons: Option<String>,
    pub runtime: Option<String>,
    pub countries: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingView {
    pub value: String,
    pub source: String,
    pub votes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRow {
    pub number: u32,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub runtime: String,
    pub available: bool,
    pub stream_token: Option<String>,
}

impl EpisodeRow {
    /// What activating the row does; locked rows are inert.
    pub fn activate(&self) -> Option<Paint> {
        if !self.available {
            return None;
        }
        Some(match &self.stream_token {
            Some(token) => Paint::Navigate(Route::play(token.clone())),
            None => Paint::Notice("Stream not available".to_string()),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GridKind {
    Recommendations,
    Trending,
    RecentlyAdded,
}

impl GridKind {
    pub fn title(&self) -> &'static str {
        match self {
            GridKind::Recommendations => "More Like This",
            GridKind::Trending => "Trending Now",
            GridKind::RecentlyAdded => "Recently Added",
        }
    }

    pub fn empty_text(&self) -> &'static str {
        match self {
            GridKind::Recommendations => "No recommendations available",
            GridKind::Trending => "No trending content",
            GridKind::RecentlyAdded => "No recently added content",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GridState {
    Cards(Vec<MediaCard>),
    Empty(String),
}

impl GridState {
    pub fn from_cards(grid: GridKind, cards: Vec<MediaCard>) -> Self {
        if cards.is_empty() {
            GridState::Empty(grid.empty_text().to_string())
        } else {
            GridState::Cards(cards)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaCard {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub year: String,
    pub rating: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub route: Route,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FilesState {
    Cards(Vec<FileCard>),
    Empty(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCard {
    pub name: String,
    pub size: String,
    /// Lowercased tag used by the quality filter.
    pub quality: String,
    pub badge: String,
    pub format: String,
    pub stream_token: Option<String>,
}

impl FileCard {
    pub fn activate(&self) -> Paint {
        match &self.stream_token {
            Some(token) => Paint::Navigate(Route::play(token.clone())),
            None => Paint::Notice(format!("No stream available for: {}", self.name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PlayControl {
    /// Enabled, default label.
    Idle,
    Loading,
    /// A "Play Now" action bound to a token.
    Ready { token: String },
}

impl PlayControl {
    pub fn label(&self) -> &'static str {
        match self {
            PlayControl::Loading => "Loading...",
            PlayControl::Idle | PlayControl::Ready { .. } => "Play Now",
        }
    }

    pub fn enabled(&self) -> bool {
        !matches!(self, PlayControl::Loading)
    }
}

pub fn search_row(item: &MediaItem, images: &ImageBase, default_type: Option<MediaType>) -> SearchRow {
    let kind = match item.media_type {
        Some(_) => item.kind(),
        None => default_type,
    };
    SearchRow {
        title: item.display_title().unwrap_or("Unknown").to_string(),
        type_label: kind.unwrap_or(MediaType::Movie).label().to_string(),
        year: year_label(item.date()),
        rating: rating_label(item.vote_average),
        poster_url: images.url(ImageSize::W92, item.poster_path.as_deref()),
        route: kind.map(|k| Route::media(k, item.id)),
    }
}

/// Card for grids. Items without a usable type take `fallback`.
pub fn media_card(item: &MediaItem, images: &ImageBase, fallback: MediaType) -> MediaCard {
    let media_type = item.kind().unwrap_or(fallback);
    MediaCard {
        id: item.id,
        media_type,
        title: item.display_title().unwrap_or("Unknown").to_string(),
        year: year_label(item.date()),
        rating: format_rating(item.vote_average),
        overview: item
            .overview
            .clone()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        poster_url: images.url(ImageSize::W400, item.poster_path.as_deref()),
        route: Route::media(media_type, item.id),
    }
}

pub fn quality_tag(quality: Option<&str>) -> String {
    quality
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn quality_badge(quality: Option<&str>) -> String {
    let quality = quality.map(str::trim).filter(|q| !q.is_empty()).unwrap_or("sd");
    if quality.eq_ignore_ascii_case("4k") {
        "4K UHD".to_string()
    } else {
        quality.to_uppercase()
    }
}

pub fn file_card(file: &FileRecord) -> FileCard {
    let name = file
        .file_name
        .clone()
        .or_else(|| file.title.clone())
        .unwrap_or_else(|| "Unknown".to_string());
    let format = file
        .file_name
        .as_deref()
        .and_then(|n| n.rsplit_once('.').map(|(_, ext)| ext))
        .filter(|ext| !ext.is_empty())
        .unwrap_or("mp4")
        .to_uppercase();

    FileCard {
        name,
        size: format_file_size(file.file_size),
        quality: quality_tag(file.quality.as_deref()),
        badge: quality_badge(file.quality.as_deref()),
        format,
        stream_token: file.stream_token.clone(),
    }
}

pub fn runtime_label(minutes: Option<u32>) -> String {
    format_duration(minutes.unwrap_or(DEFAULT_RUNTIME_MINUTES))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> MediaItem {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn search_row_for_show() {
        let row = search_row(
            &item(json!({
                "id": 66732,
                "name": "Stranger Things",
                "first_air_date": "2016-07-15",
                "media_type": "tv",
                "vote_average": 8.62,
                "poster_path": "/x.jpg"
            })),
            &ImageBase::default(),
            None,
        );
        assert_eq!(row.title, "Stranger Things");
        assert_eq!(row.type_label, "TV Series");
        assert_eq!(row.year, "2016");
        assert_eq!(row.rating, "8.6");
        assert_eq!(
            row.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w92/x.jpg")
        );
        assert_eq!(row.route, Some(Route::media(MediaType::Show, 66732)));
    }

    #[test]
    fn search_row_defaults() {
        let images = ImageBase::default();
        let bare = item(json!({"id": 3}));
        let row = search_row(&bare, &images, None);
        assert_eq!(row.title, "Unknown");
        assert_eq!(row.year, "N/A");
        assert_eq!(row.rating, "N/A");
        assert_eq!(row.route, None);

        let defaulted = search_row(&bare, &images, Some(MediaType::Movie));
        assert_eq!(defaulted.route, Some(Route::media(MediaType::Movie, 3)));

        let person = item(json!({"id": 4, "media_type": "person"}));
        assert_eq!(search_row(&person, &images, Some(MediaType::Movie)).route, None);
    }

    #[test]
    fn media_card_fields() {
        let card = media_card(
            &item(json!({"id": 10, "title": "Arrival", "media_type": "movie"})),
            &ImageBase::default(),
            MediaType::Show,
        );
        assert_eq!(card.route.to_string(), "/movie/10");
        assert_eq!(card.overview, NO_DESCRIPTION);
        assert_eq!(card.rating, "0.0");
        assert_eq!(card.poster_url, None);

        let untyped = media_card(&item(json!({"id": 11})), &ImageBase::default(), MediaType::Show);
        assert_eq!(untyped.route.to_string(), "/tv/11");
    }

    #[test]
    fn file_cards() {
        let file: FileRecord = serde_json::from_value(json!({
            "file_name": "Dark.S01E01.1080p.mkv",
            "file_size": 1_610_612_736u64,
            "quality": "1080P",
            "stream_token": "tok"
        }))
        .unwrap();
        let card = file_card(&file);
        assert_eq!(card.size, "1.5 GB");
        assert_eq!(card.quality, "1080p");
        assert_eq!(card.badge, "1080P");
        assert_eq!(card.format, "MKV");
        assert_eq!(card.activate(), Paint::Navigate(Route::play("tok")));

        let bare = file_card(&FileRecord::default());
        assert_eq!(bare.name, "Unknown");
        assert_eq!(bare.quality, "unknown");
        assert_eq!(bare.badge, "SD");
        assert_eq!(bare.format, "MP4");
        assert_eq!(
            bare.activate(),
            Paint::Notice("No stream available for: Unknown".to_string())
        );

        assert_eq!(quality_badge(Some("4k")), "4K UHD");
    }

    #[test]
    fn episode_rows_activate_by_availability() {
        let mut row = EpisodeRow {
            number: 1,
            title: "Pilot".to_string(),
            thumbnail_url: None,
            runtime: runtime_label(None),
            available: false,
            stream_token: Some("t".to_string()),
        };
        assert_eq!(row.runtime, "45m");
        assert_eq!(row.activate(), None);

        row.available = true;
        assert_eq!(row.activate(), Some(Paint::Navigate(Route::play("t"))));

        row.stream_token = None;
        assert_eq!(
            row.activate(),
            Some(Paint::Notice("Stream not available".to_string()))
        );
    }

    #[test]
    fn empty_grids_get_a_message() {
        assert_eq!(
            GridState::from_cards(GridKind::RecentlyAdded, Vec::new()),
            GridState::Empty("No recently added content".to_string())
        );
    }

    #[test]
    fn play_control_labels() {
        assert!(!PlayControl::Loading.enabled());
        assert!(PlayControl::Idle.enabled());
        assert_eq!(PlayControl::Idle.label(), "Play Now");
    }
}
