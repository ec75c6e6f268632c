// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Search-as-you-type with a debounce.
//!
//! One [`SearchClient`] serves any search input; the desktop and mobile
//! inputs are two [`SearchProfile`]s of it. Every request is stamped with a
//! generation number and results are only painted while that generation is
//! still current, so a slow answer to an old query never replaces a newer
//! one.

use crate::api::Backend;
use crate::config::SearchProfile;
use crate::context::Route;
use crate::format::ImageBase;
use crate::models::{MediaType, SearchResponse};
use crate::view::{Paint, SearchRow, SearchState, Surface, search_row};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Rows for a search response, capped at `limit`. Results without a
/// declared type are treated as movies.
pub fn search_rows(response: &SearchResponse, limit: usize, images: &ImageBase) -> Vec<SearchRow> {
    response
        .results
        .iter()
        .take(limit)
        .map(|item| search_row(item, images, Some(MediaType::Movie)))
        .collect()
}

struct Shared {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    profile: SearchProfile,
    images: ImageBase,
    generation: AtomicU64,
    last: Mutex<SearchState>,
}

impl Shared {
    fn show(&self, state: SearchState) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        self.surface.paint(Paint::Search {
            target: self.profile.target.clone(),
            state,
        });
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    async fn run(&self, query: String, generation: u64) {
        debug!("Searching for '{}'", query);
        let result = self.backend.search(&query).await;

        if !self.is_current(generation) {
            debug!("Discarding stale results for '{}'", query);
            return;
        }

        let state = match result {
            Ok(response) => {
                let rows = search_rows(&response, self.profile.result_limit, &self.images);
                debug!("Search '{}' returned {} rows", query, rows.len());
                if rows.is_empty() {
                    SearchState::NoResults
                } else {
                    SearchState::Results(rows)
                }
            }
            Err(e) => {
                error!("Search error for '{}': {:#}", query, e);
                SearchState::Error
            }
        };
        self.show(state);
    }
}

pub struct SearchClient {
    shared: Arc<Shared>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchClient {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        profile: SearchProfile,
        images: ImageBase,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                backend,
                surface,
                profile,
                images,
                generation: AtomicU64::new(0),
                last: Mutex::new(SearchState::Hidden),
            }),
            pending: Mutex::new(None),
        }
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    fn schedule(&self, query: String, debounce: bool) {
        let generation = self.shared.next_generation();
        self.shared.show(SearchState::Loading);

        let shared = Arc::clone(&self.shared);
        let delay = if debounce {
            Some(shared.profile.debounce())
        } else {
            None
        };
        let handle = tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            shared.run(query, generation).await;
        });

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// A keystroke. Short queries hide the dropdown without a request;
    /// anything else shows the loading state and restarts the quiet period.
    pub fn on_input(&self, query: &str) {
        self.cancel_pending();
        let query = query.trim();

        if query.chars().count() < self.shared.profile.min_query_len {
            self.shared.next_generation();
            self.shared.show(SearchState::Hidden);
            return;
        }

        self.schedule(query.to_string(), true);
    }

    /// Enter: search right away when the query is long enough.
    pub fn on_submit(&self, query: &str) {
        let query = query.trim();
        let len = query.chars().count();
        if len == 0 || len < self.shared.profile.submit_min_len {
            return;
        }

        self.cancel_pending();
        self.schedule(query.to_string(), false);
    }

    pub fn on_escape(&self) {
        self.cancel_pending();
        self.shared.next_generation();
        self.shared.show(SearchState::Hidden);
    }

    /// Hides the dropdown but keeps its content for the next focus.
    pub fn on_outside_click(&self) {
        self.shared.surface.paint(Paint::Search {
            target: self.shared.profile.target.clone(),
            state: SearchState::Hidden,
        });
    }

    pub fn on_focus(&self) {
        let last = self
            .shared
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if last.has_content() {
            self.shared.surface.paint(Paint::Search {
                target: self.shared.profile.target.clone(),
                state: last,
            });
        }
    }

    /// Clicking a row navigates to its title.
    pub fn select(&self, index: usize) -> Option<Route> {
        let route = match &*self.shared.last.lock().unwrap_or_else(PoisonError::into_inner) {
            SearchState::Results(rows) => rows.get(index).and_then(|r| r.route.clone()),
            _ => None,
        }?;
        self.on_outside_click();
        self.shared.surface.paint(Paint::Navigate(route.clone()));
        Some(route)
    }

    pub fn current(&self) -> SearchState {
        self.shared
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs a search to completion in the caller's task, bypassing the
    /// debounce. Used by the line-oriented front-end.
    pub async fn search_now(&self, query: &str) -> SearchState {
        self.cancel_pending();
        let generation = self.shared.next_generation();
        self.shared.show(SearchState::Loading);
        self.shared.run(query.trim().to_string(), generation).await;
        self.current()
    }
}

impl Drop for SearchClient {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
