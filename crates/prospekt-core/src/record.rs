//! The canonical leaflet record and its normalization rules.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::clock::Clock;
use crate::dates::{format_date, ISO_DATE_FORMAT};

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-&,.]").expect("valid character class regex"));

static ISO_DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid iso date regex"));

const UNKNOWN_SHOP: &str = "Unknown";

/// Raw, possibly messy values for one leaflet as pulled out of the page.
#[derive(Debug, Clone, Default)]
pub struct LeafletFields {
    pub title: String,
    pub thumbnail: String,
    pub shop_name: String,
    pub valid_from: String,
    pub valid_to: String,
    /// Kept verbatim when present; otherwise stamped from the clock.
    pub parsed_time: Option<String>,
}

/// One normalized leaflet, ready for export.
///
/// Field order here is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafletRecord {
    title: String,
    thumbnail: String,
    shop_name: String,
    valid_from: String,
    valid_to: String,
    parsed_time: String,
}

impl LeafletRecord {
    /// Normalizes `fields` into a record. Never fails.
    ///
    /// - `title` / `shop_name` are whitespace-collapsed and restricted to
    ///   word characters, whitespace, `-`, `&`, `,` and `.`.
    /// - `shop_name` is never empty and never equal to `title`.
    /// - Dates that are not valid `YYYY-MM-DD` become today; dates more than
    ///   one year ahead are moved into the current year.
    #[must_use]
    pub fn new(fields: LeafletFields, clock: &dyn Clock) -> Self {
        let title = clean_text(&fields.title);
        let shop_name = resolve_shop_name(&clean_text(&fields.shop_name), &title);
        let valid_from = validate_date(&fields.valid_from, clock);
        let valid_to = validate_date(&fields.valid_to, clock);
        let parsed_time = fields.parsed_time.unwrap_or_else(|| clock.timestamp());

        Self {
            title,
            thumbnail: fields.thumbnail,
            shop_name,
            valid_from,
            valid_to,
            parsed_time,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn thumbnail(&self) -> &str {
        &self.thumbnail
    }

    #[must_use]
    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    #[must_use]
    pub fn valid_from(&self) -> &str {
        &self.valid_from
    }

    #[must_use]
    pub fn valid_to(&self) -> &str {
        &self.valid_to
    }

    #[must_use]
    pub fn parsed_time(&self) -> &str {
        &self.parsed_time
    }

    /// Fills in `parsed_time` only if it is blank.
    pub fn stamp_parsed_time(&mut self, timestamp: &str) {
        if self.parsed_time.trim().is_empty() {
            self.parsed_time = timestamp.to_owned();
        }
    }

    /// Ordered `(key, value)` view of the record, in export order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("title", self.title.as_str()),
            ("thumbnail", self.thumbnail.as_str()),
            ("shop_name", self.shop_name.as_str()),
            ("valid_from", self.valid_from.as_str()),
            ("valid_to", self.valid_to.as_str()),
            ("parsed_time", self.parsed_time.as_str()),
        ]
    }
}

/// Strips characters outside `[\w\s\-&,.]`, then collapses and trims
/// whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(text, "");
    WHITESPACE_RUN.replace_all(stripped.trim(), " ").into_owned()
}

fn resolve_shop_name(cleaned_shop: &str, title: &str) -> String {
    if !cleaned_shop.is_empty() && cleaned_shop != title {
        return cleaned_shop.to_owned();
    }

    let derived = match title.split_once(" - ") {
        Some((head, _)) => head.to_owned(),
        None => title
            .split_whitespace()
            .next()
            .unwrap_or(UNKNOWN_SHOP)
            .to_owned(),
    };

    if derived.is_empty() || derived == title {
        if title == UNKNOWN_SHOP {
            return "Unknown Shop".to_owned();
        }
        return UNKNOWN_SHOP.to_owned();
    }
    derived
}

fn validate_date(raw: &str, clock: &dyn Clock) -> String {
    let today = || format_date(clock.today());

    if !ISO_DATE_SHAPE.is_match(raw) {
        return today();
    }
    let Ok(date) = NaiveDate::parse_from_str(raw, ISO_DATE_FORMAT) else {
        return today();
    };

    let current_year = clock.current_year();
    if date.year() > current_year + 1 {
        return date
            .with_year(current_year)
            .map_or_else(today, format_date);
    }
    raw.to_owned()
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
