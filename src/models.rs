// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// The backend passes numbers through from several upstreams; anything that
// is not a usable number decodes as zero instead of failing the payload.
fn lenient_f64(value: Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    let n = lenient_f64(value);
    Ok(if n.is_finite() { n } else { 0.0 })
}

fn deserialize_lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    let n = match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| n.as_f64().map_or(0, |f| f.max(0.0) as u64)),
        other => lenient_f64(other).max(0.0) as u64,
    };
    Ok(n)
}

fn deserialize_lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let n = deserialize_lenient_u64(deserializer)?;
    Ok(u32::try_from(n).unwrap_or(0))
}

fn deserialize_optional_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Value = Deserialize::deserialize(deserializer)?;
    let minutes = match value {
        Value::Null => None,
        other => Some(lenient_f64(other).max(0.0) as u32),
    };
    Ok(minutes.filter(|m| *m > 0))
}

/// `null` decodes like a missing field.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv", alias = "show")]
    Show,
}

impl MediaType {
    /// Lenient parse of the `media_type` strings found in payloads and routes.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "movie" | "movies" => Some(Self::Movie),
            "tv" | "show" | "series" => Some(Self::Show),
            _ => None,
        }
    }

    /// Path segment used by both the API and the page routes.
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Show => "tv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Show => "TV Series",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// A title as it appears in search, trending and recommendation lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub vote_average: f64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub media_type: Option<String>,
}

impl MediaItem {
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.name.as_deref())
    }

    pub fn date(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
    }

    /// Declared type, `None` when absent or not a movie/show (e.g. people).
    pub fn kind(&self) -> Option<MediaType> {
        self.media_type.as_deref().and_then(MediaType::parse)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub results: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionCountry {
    #[serde(default, rename = "iso_3166_1")]
    pub iso: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub imdb_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub results: Vec<MediaItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonSummary {
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub season_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub episode_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TvDetails {
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub first_air_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub number_of_seasons: u32,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub recommendations: Option<Recommendations>,
}

impl TvDetails {
    /// First season numbered above zero (specials are season 0), falling
    /// back to whatever is listed first.
    pub fn initial_season(&self) -> Option<u32> {
        self.seasons
            .iter()
            .find(|s| s.season_number > 0)
            .or_else(|| self.seasons.first())
            .map(|s| s.season_number)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub id: u64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_minutes")]
    pub runtime: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub genres: Vec<Genre>,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub production_countries: Vec<ProductionCountry>,
    #[serde(default)]
    pub external_ids: Option<ExternalIds>,
    #[serde(default)]
    pub recommendations: Option<Recommendations>,
}

impl TvDetails {
    pub fn summary(&self) -> MediaItem {
        MediaItem {
            id: self.id,
            name: self.name.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: detail_rating(&self.vote_average).unwrap_or(0.0),
            first_air_date: self.first_air_date.clone(),
            media_type: Some(MediaType::Show.as_path().to_string()),
            ..Default::default()
        }
    }
}

impl MovieDetails {
    pub fn summary(&self) -> MediaItem {
        MediaItem {
            id: self.id,
            title: self.title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            vote_average: detail_rating(&self.vote_average).unwrap_or(0.0),
            release_date: self.release_date.clone(),
            media_type: Some(MediaType::Movie.as_path().to_string()),
            ..Default::default()
        }
    }
}

/// Rating carried by a detail payload; `None` when the field is absent so
/// the renderer can leave the current value alone.
pub fn detail_rating(value: &Option<Value>) -> Option<f64> {
    value.clone().map(lenient_f64)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub episode_number: u32,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub still_path: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_minutes")]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonDetails {
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub season_number: u32,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub episodes: Vec<EpisodeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(default)]
    pub available: bool,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub stream_token: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AvailabilityRecord {
    pub fn token(&self) -> Option<&str> {
        self.stream_token.as_deref()
    }
}

/// Availability of every file in one season, keyed by episode number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeasonAvailability(pub BTreeMap<u32, AvailabilityRecord>);

// Season file listings come back either keyed by episode number or, from
// older backends, as a flat `files` array.
impl<'de> Deserialize<'de> for SeasonAvailability {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let mut value: Value = Deserialize::deserialize(deserializer)?;

        if let Some(files) = value.get_mut("files").filter(|f| f.is_array()) {
            let files: Vec<AvailabilityRecord> =
                serde_json::from_value(files.take()).map_err(D::Error::custom)?;
            return Ok(Self(
                files
                    .into_iter()
                    .enumerate()
                    .map(|(i, f)| (i as u32 + 1, f))
                    .collect(),
            ));
        }

        match value {
            Value::Object(entries) => {
                let mut map = BTreeMap::new();
                for (key, entry) in entries {
                    let Ok(episode) = key.trim().parse::<u32>() else {
                        continue;
                    };
                    let record: AvailabilityRecord =
                        serde_json::from_value(entry).map_err(D::Error::custom)?;
                    map.insert(episode, record);
                }
                Ok(Self(map))
            }
            Value::Null => Ok(Self::default()),
            _ => Err(D::Error::custom("Expected an object of season files")),
        }
    }
}

impl SeasonAvailability {
    pub fn get(&self, episode: u32) -> Option<&AvailabilityRecord> {
        self.0.get(&episode)
    }

    /// Lowest-numbered entry that carries a stream token.
    pub fn first_playable(&self) -> Option<&AvailabilityRecord> {
        self.0.values().find(|r| r.token().is_some())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One ingested file as listed by `/api/files`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub tmdb_id: u64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub media_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u64")]
    pub file_size: u64,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub quality: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub season: u32,
    #[serde(default, deserialize_with = "deserialize_lenient_u32")]
    pub episode: u32,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub stream_token: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileSearchResponse {
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub query: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub results: Vec<FileRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImdbRating {
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub votes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_empty")]
    pub error: Option<String>,
}
