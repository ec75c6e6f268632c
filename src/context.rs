// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::models::MediaType;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaRef {
    pub media_type: MediaType,
    pub id: u64,
}

impl MediaRef {
    pub fn new(media_type: MediaType, id: u64) -> Self {
        Self { media_type, id }
    }

    pub fn show(id: u64) -> Self {
        Self::new(MediaType::Show, id)
    }

    pub fn movie(id: u64) -> Self {
        Self::new(MediaType::Movie, id)
    }
}

impl std::fmt::Display for MediaRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.media_type, self.id)
    }
}

/// Page locations the front-end can move to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    Home,
    Media(MediaRef),
    Play { token: String },
}

impl Route {
    pub fn media(media_type: MediaType, id: u64) -> Self {
        Route::Media(MediaRef::new(media_type, id))
    }

    pub fn play(token: impl Into<String>) -> Self {
        Route::Play {
            token: token.into(),
        }
    }

    /// Parses `/tv/{id}`, `/movie/{id}` and `/play?token=…`; anything else
    /// is the home page. Extra trailing path segments are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.trim();
        let (path_part, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        let segments: Vec<&str> = path_part.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["play", ..] => query
                .and_then(|q| {
                    q.split('&').find_map(|pair| {
                        let (key, value) = pair.split_once('=')?;
                        (key == "token" && !value.is_empty()).then(|| {
                            urlencoding::decode(value)
                                .map(|v| v.into_owned())
                                .unwrap_or_else(|_| value.to_string())
                        })
                    })
                })
                .map(Route::play)
                .unwrap_or(Route::Home),
            [kind, id, ..] => match (MediaType::parse(kind), id.parse::<u64>()) {
                (Some(media_type), Ok(id)) if *kind != "series" && *kind != "movies" => {
                    Route::media(media_type, id)
                }
                _ => Route::Home,
            },
            _ => Route::Home,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Media(media) => write!(f, "/{}/{}", media.media_type, media.id),
            Route::Play { token } => write!(f, "/play?token={}", urlencoding::encode(token)),
        }
    }
}

/// Media data a server-rendered page embeds for the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMediaData {
    pub id: u64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default, rename = "imdbId")]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub season: Option<u32>,
}

impl ServerMediaData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Where the page's initial data comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PageSource {
    /// The server already rendered the hero; only dynamic parts load.
    Server(ServerMediaData),
    Route(Route),
}

/// Page-scoped state handed to every component call. Only a season change
/// mutates it after initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContext {
    pub media: Option<MediaRef>,
    pub season: u32,
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            media: None,
            season: 1,
        }
    }
}

impl PageContext {
    pub fn for_media(media: MediaRef) -> Self {
        Self {
            media: Some(media),
            season: 1,
        }
    }

    pub fn from_source(source: &PageSource) -> Self {
        match source {
            PageSource::Server(data) => Self {
                media: Some(MediaRef::new(data.media_type, data.id)),
                season: data.season.unwrap_or(1),
            },
            PageSource::Route(Route::Media(media)) => Self::for_media(*media),
            PageSource::Route(_) => Self::default(),
        }
    }

    pub fn show_id(&self) -> Option<u64> {
        self.media
            .filter(|m| m.media_type == MediaType::Show)
            .map(|m| m.id)
    }

    pub fn set_season(&mut self, season: u32) {
        self.season = season;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_media_routes() {
        assert_eq!(Route::parse("/tv/1399"), Route::media(MediaType::Show, 1399));
        assert_eq!(
            Route::parse("/movie/284052/"),
            Route::media(MediaType::Movie, 284052)
        );
        assert_eq!(Route::parse("/tv/abc"), Route::Home);
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse("/search"), Route::Home);
    }

    #[test]
    fn play_route_round_trips_token() {
        let route = Route::play("a b/c");
        let path = route.to_string();
        assert_eq!(path, "/play?token=a%20b%2Fc");
        assert_eq!(Route::parse(&path), route);
        assert_eq!(Route::parse("/play"), Route::Home);
    }

    #[test]
    fn media_routes_render_as_paths() {
        assert_eq!(Route::media(MediaType::Show, 7).to_string(), "/tv/7");
        assert_eq!(Route::media(MediaType::Movie, 9).to_string(), "/movie/9");
    }

    #[test]
    fn context_from_server_data() {
        let data = ServerMediaData::from_json(r#"{"id": 66732, "type": "tv", "imdbId": "tt4574334"}"#)
            .unwrap();
        let ctx = PageContext::from_source(&PageSource::Server(data));
        assert_eq!(ctx.show_id(), Some(66732));
        assert_eq!(ctx.season, 1);
    }

    #[test]
    fn context_for_movie_has_no_show_id() {
        let ctx = PageContext::from_source(&PageSource::Route(Route::parse("/movie/5")));
        assert_eq!(ctx.media, Some(MediaRef::movie(5)));
        assert_eq!(ctx.show_id(), None);
        assert_eq!(
            PageContext::from_source(&PageSource::Route(Route::Home)),
            PageContext::default()
        );
    }
}
