// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for timestamps, time windows and the simulated reference day.

use crate::error::{OpsError, Result};
use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone,
    Timelike, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a dataset timestamp.
///
/// Accepts RFC3339, `YYYY-MM-DD HH:MM:SS±HH:MM`, and naive
/// `YYYY-MM-DD HH:MM:SS` which is taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| OpsError::Parse(format!("Invalid timestamp {raw:?}: {e}")))
}

/// Source of the current instant. Core code never reads the system clock directly.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant (tests, replays).
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Half-open interval `[start, end)` over UTC instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(OpsError::InvalidParameter(format!(
                "Window ends before it starts: {} .. {}",
                format_utc_rfc3339(start),
                format_utc_rfc3339(end)
            )));
        }
        Ok(Self { start, end })
    }

    /// Window of `hours` ending at `end`.
    pub fn trailing(end: DateTime<Utc>, hours: i64) -> Result<Self> {
        if hours <= 0 {
            return Err(OpsError::InvalidParameter(format!(
                "Window length must be positive, got {hours}h"
            )));
        }
        let start = Duration::try_hours(hours)
            .and_then(|length| end.checked_sub_signed(length))
            .ok_or_else(|| {
                OpsError::InvalidParameter(format!(
                    "Window of {hours}h before {} is out of range",
                    format_utc_rfc3339(end)
                ))
            })?;
        Self::new(start, end)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// A historical day standing in for "today" in a given timezone.
///
/// The dashboards replay one day of data: "now" is the reference date at the
/// clock's current local time of day.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDay {
    pub date: NaiveDate,
    pub tz: Tz,
}

impl SimulatedDay {
    pub fn new(date: NaiveDate, tz: Tz) -> Self {
        Self { date, tz }
    }

    /// Local wall time on the reference date, resolved to UTC.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    pub fn at(&self, hour: u32, minute: u32) -> Result<DateTime<Utc>> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            OpsError::InvalidParameter(format!("Invalid time of day {hour:02}:{minute:02}"))
        })?;
        self.localize(self.date.and_time(time))
    }

    pub fn start_of_day(&self) -> Result<DateTime<Utc>> {
        self.at(0, 0)
    }

    pub fn start_of_month(&self) -> Result<DateTime<Utc>> {
        let first = self.date.with_day(1).ok_or_else(|| {
            OpsError::Internal(anyhow::anyhow!("No first day for month of {}", self.date))
        })?;
        self.localize(first.and_time(NaiveTime::MIN))
    }

    /// The reference date combined with the clock's local hour and minute.
    pub fn now(&self, clock: &dyn Clock) -> Result<DateTime<Utc>> {
        let local = clock.now().with_timezone(&self.tz);
        self.at(local.hour(), local.minute())
    }

    /// Window of `hours` ending at `hour:00` on the reference date.
    pub fn window_ending_at(&self, hour: u32, hours: i64) -> Result<TimeWindow> {
        TimeWindow::trailing(self.at(hour, 0)?, hours)
    }

    fn localize(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                OpsError::InvalidParameter(format!("{naive} does not exist in {}", self.tz))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn june_17() -> SimulatedDay {
        SimulatedDay::new(
            NaiveDate::from_ymd_opt(2022, 6, 17).unwrap(),
            chrono_tz::Europe::London,
        )
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2022, 6, 17, 7, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2022-06-17T08:30:00+01:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2022-06-17 08:30:00+01:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2022-06-17 07:30:00").unwrap(), expected);
        assert!(parse_timestamp("17/06/2022").is_err());
    }

    #[test]
    fn test_simulated_day_is_bst() {
        let day = june_17();
        // 09:00 BST is 08:00 UTC
        assert_eq!(
            day.at(9, 0).unwrap(),
            Utc.with_ymd_and_hms(2022, 6, 17, 8, 0, 0).unwrap()
        );
        assert_eq!(
            day.start_of_month().unwrap(),
            Utc.with_ymd_and_hms(2022, 5, 31, 23, 0, 0).unwrap()
        );
        assert!(day.at(24, 0).is_err());
    }

    #[test]
    fn test_simulated_now_uses_clock_time_of_day() {
        let day = june_17();
        // 2026-01-05 14:20 UTC is 14:20 GMT in London
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 1, 5, 14, 20, 0).unwrap());
        assert_eq!(day.now(&clock).unwrap(), day.at(14, 20).unwrap());
    }

    #[test]
    fn test_window_is_half_open() {
        let day = june_17();
        let window = day.window_ending_at(12, 3).unwrap();
        assert_eq!(window.start, day.at(9, 0).unwrap());
        assert!(window.contains(window.start));
        assert!(!window.contains(window.end));
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let end = Utc.with_ymd_and_hms(2022, 6, 17, 8, 0, 0).unwrap();
        assert!(TimeWindow::new(end, end - Duration::hours(1)).is_err());
        assert!(TimeWindow::trailing(end, 0).is_err());
    }

    #[test]
    fn test_huge_window_is_rejected() {
        let day = june_17();
        assert!(matches!(
            day.window_ending_at(9, i64::MAX / 1000),
            Err(OpsError::InvalidParameter(_))
        ));
        // Representable length, but it would start before the calendar does
        assert!(matches!(
            day.window_ending_at(9, 10_000_000_000),
            Err(OpsError::InvalidParameter(_))
        ));
    }
}
