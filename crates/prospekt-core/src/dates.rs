//! Free-text validity-window parsing.
//!
//! Leaflet listings mix `13.03.2023 - 19.03.2023`, `14.03 - 20.03` and plain
//! marketing copy, and some carry corrupted years. Everything here resolves to
//! a usable `(from, to)` pair; nothing returns an error to the caller.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

use crate::clock::Clock;

/// Output format for `valid_from` / `valid_to`.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Days a leaflet is assumed to run when its dates cannot be read.
pub const FALLBACK_WINDOW_DAYS: u64 = 7;

static FULL_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}\.\d{2}\.\d{4}").expect("valid full date regex"));

static SHORT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}\.\d{2}").expect("valid short date regex"));

#[derive(Debug)]
enum RangeMiss {
    /// Fewer than two date tokens in the text.
    Insufficient,
    /// Tokens were found but do not form real calendar dates.
    Invalid(String),
}

/// Parses a validity window out of `text`, returning ISO `YYYY-MM-DD` strings.
///
/// Falls back to `today .. today + 7 days` when fewer than two dates are
/// present or the tokens are not valid dates.
#[must_use]
pub fn parse_date_range(text: &str, clock: &dyn Clock) -> (String, String) {
    let (from, to) = match extract_range(text, clock.current_year()) {
        Ok(range) => range,
        Err(RangeMiss::Insufficient) => {
            tracing::warn!(text, "could not find two dates in text; using default window");
            fallback_window(clock)
        }
        Err(RangeMiss::Invalid(reason)) => {
            tracing::error!(text, reason = %reason, "error parsing dates; using default window");
            fallback_window(clock)
        }
    };
    (format_date(from), format_date(to))
}

/// Like [`parse_date_range`] but reports a miss instead of substituting the
/// default window.
#[must_use]
pub fn try_parse_date_range(text: &str, clock: &dyn Clock) -> Option<(NaiveDate, NaiveDate)> {
    extract_range(text, clock.current_year()).ok()
}

/// The first two full `dd.mm.yyyy` dates in `text`, ordered so that
/// `from <= to`.
#[must_use]
pub fn scan_full_dates(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    let mut tokens = FULL_DATE.find_iter(text).map(|m| m.as_str());
    let first = parse_dmy(tokens.next()?).ok()?;
    let second = parse_dmy(tokens.next()?).ok()?;
    Some((first.min(second), first.max(second)))
}

/// `today .. today + 7 days`.
#[must_use]
pub fn fallback_window(clock: &dyn Clock) -> (NaiveDate, NaiveDate) {
    let today = clock.today();
    let end = today
        .checked_add_days(Days::new(FALLBACK_WINDOW_DAYS))
        .unwrap_or(today);
    (today, end)
}

#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

fn extract_range(text: &str, current_year: i32) -> Result<(NaiveDate, NaiveDate), RangeMiss> {
    let full: Vec<&str> = FULL_DATE.find_iter(text).map(|m| m.as_str()).take(2).collect();
    if let [from_raw, to_raw] = full[..] {
        let from = parse_dmy(from_raw)?;
        let to = parse_dmy(to_raw)?;
        if from.year() > current_year + 1 || to.year() > current_year + 1 {
            tracing::warn!(
                from = from_raw,
                to = to_raw,
                current_year,
                "dates with a future year detected; substituting the current year"
            );
            return Ok((
                with_year(from, current_year)?,
                with_year(to, current_year)?,
            ));
        }
        return Ok((from, to));
    }

    let short: Vec<&str> = SHORT_DATE.find_iter(text).map(|m| m.as_str()).take(2).collect();
    if let [from_raw, to_raw] = short[..] {
        let from = parse_dmy(&format!("{from_raw}.{current_year}"))?;
        let to = parse_dmy(&format!("{to_raw}.{current_year}"))?;
        return Ok((from, to));
    }

    Err(RangeMiss::Insufficient)
}

fn parse_dmy(raw: &str) -> Result<NaiveDate, RangeMiss> {
    NaiveDate::parse_from_str(raw, "%d.%m.%Y")
        .map_err(|e| RangeMiss::Invalid(format!("\"{raw}\": {e}")))
}

fn with_year(date: NaiveDate, year: i32) -> Result<NaiveDate, RangeMiss> {
    date.with_year(year)
        .ok_or_else(|| RangeMiss::Invalid(format!("{date} has no counterpart in {year}")))
}

#[cfg(test)]
#[path = "dates_test.rs"]
mod tests;
