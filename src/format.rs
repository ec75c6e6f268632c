// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use chrono::{Datelike, NaiveDate};

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable byte count in binary steps, rounded to two decimals with
/// trailing zeros dropped ("1.5 KB", "1 MB"). Counts beyond the largest
/// unit stay in TB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let unit = size_unit_index(bytes);
    let value = bytes as f64 / 1024f64.powi(unit as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, SIZE_UNITS[unit])
}

/// Index into the unit table `format_file_size` picks for a count.
pub fn size_unit_index(bytes: u64) -> usize {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    unit
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

fn parse_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            chrono::DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Long US-style date, e.g. "January 2, 2006".
pub fn format_date(date: &str) -> Option<String> {
    parse_date(date).map(|d| d.format("%B %-d, %Y").to_string())
}

pub fn year_of(date: &str) -> Option<i32> {
    parse_date(date).map(|d| d.year()).or_else(|| {
        date.split('-')
            .next()
            .and_then(|y| y.trim().parse::<i32>().ok())
    })
}

pub fn year_label(date: Option<&str>) -> String {
    date.and_then(year_of)
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_rating(rating: f64) -> String {
    let rating = if rating.is_finite() { rating } else { 0.0 };
    format!("{:.1}", rating)
}

/// Search rows show "N/A" instead of a zero score.
pub fn rating_label(rating: f64) -> String {
    if rating.is_finite() && rating > 0.0 {
        format_rating(rating)
    } else {
        "N/A".to_string()
    }
}

pub fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{} {}", count, word)
    } else {
        format!("{} {}s", count, word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W92,
    W300,
    W400,
    W500,
    Original,
}

impl ImageSize {
    pub fn segment(&self) -> &'static str {
        match self {
            ImageSize::W92 => "w92",
            ImageSize::W300 => "w300",
            ImageSize::W400 => "w400",
            ImageSize::W500 => "w500",
            ImageSize::Original => "original",
        }
    }
}

/// Image CDN addressing: base + size segment + path from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBase {
    base_url: String,
}

impl ImageBase {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, size: ImageSize, path: Option<&str>) -> Option<String> {
        let path = path?.trim();
        if path.is_empty() {
            return None;
        }
        let separator = if path.starts_with('/') { "" } else { "/" };
        Some(format!(
            "{}/{}{}{}",
            self.base_url,
            size.segment(),
            separator,
            path
        ))
    }
}

impl Default for ImageBase {
    fn default() -> Self {
        Self::new("https://image.tmdb.org/t/p")
    }
}
