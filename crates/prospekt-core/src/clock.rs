//! Injectable source of "now".
//!
//! Date validation and fallback validity windows depend on the current date.
//! Components take a `&dyn Clock` so tests can pin the date.

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

/// Format used for the `parsed_time` field of exported records.
pub const PARSED_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub trait Clock: Send + Sync {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn current_year(&self) -> i32 {
        self.today().year()
    }

    /// `now()` rendered as a `parsed_time` value.
    fn timestamp(&self) -> String {
        self.now().format(PARSED_TIME_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Clock frozen at noon on the given date.
    ///
    /// # Panics
    ///
    /// Panics if the date components are out of range. Intended for tests.
    #[must_use]
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        let at = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid fixed clock date");
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let clock = FixedClock::on(2025, 3, 18);
        assert_eq!(clock.current_year(), 2025);
        assert_eq!(clock.today().to_string(), "2025-03-18");
        assert_eq!(clock.timestamp(), "2025-03-18 12:00:00");
    }
}
