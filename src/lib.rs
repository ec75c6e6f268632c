// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod api;
pub mod config;
pub mod context;
pub mod detail;
pub mod episodes;
pub mod files;
pub mod format;
pub mod models;
pub mod page;
pub mod playback;
pub mod player;
pub mod prefs;
pub mod recent;
pub mod search;
pub mod tui;
pub mod view;

#[cfg(test)]
mod test_support;

pub use api::{Backend, StrixApi};
pub use config::Config;
pub use page::Page;
pub use player::Player;
pub use tui::run_tui;
