// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Trip model and the raw CSV row it is coerced from.

use crate::error::{DataFault, DataFaultKind};
use crate::time_utils::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identifier column as it appears in the dataset.
///
/// Identifiers are kept verbatim so that data-quality triage can judge
/// them; `as_number` gives the numeric view used for joins.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-negative integer value, if the raw text is made only of digits.
    pub fn as_number(&self) -> Option<u64> {
        numeric_value(&self.0)
    }

    /// Identity used for grouping and ordering.
    pub fn key(&self) -> IdKey<'_> {
        IdKey::of(&self.0)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

fn numeric_value(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// An identifier reduced to what it denotes: "007" and "7" are the same bike.
///
/// Numeric ids order by value and sort before any non-numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdKey<'a> {
    Number(u64),
    Text(&'a str),
}

impl<'a> IdKey<'a> {
    pub fn of(raw: &'a str) -> Self {
        match numeric_value(raw) {
            Some(n) => IdKey::Number(n),
            None => IdKey::Text(raw),
        }
    }
}

/// Order raw identifiers by [`IdKey`], then by text so the order is total.
pub fn id_order(a: &str, b: &str) -> Ordering {
    IdKey::of(a).cmp(&IdKey::of(b)).then_with(|| a.cmp(b))
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A completed bike hire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub rental_id: RecordId,
    pub bike_id: RecordId,
    pub start_station_id: RecordId,
    pub start_station_name: Option<String>,
    pub end_station_id: RecordId,
    pub end_station_name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Duration in seconds
    pub duration: i64,
}

/// One row of the trips CSV before coercion.
#[derive(Debug, Clone, Deserialize)]
pub struct TripRow {
    pub rental_id: String,
    pub bike_id: String,
    pub start_station_id: String,
    #[serde(default)]
    pub start_station_name: Option<String>,
    pub end_station_id: String,
    #[serde(default)]
    pub end_station_name: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub duration: String,
}

impl TryFrom<TripRow> for Trip {
    type Error = DataFault;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        let record = format!("rental {}", row.rental_id);

        let start_date = parse_timestamp(&row.start_date)
            .map_err(|e| DataFault::new(DataFaultKind::BadTimestamp, &record, e.to_string()))?;
        let end_date = parse_timestamp(&row.end_date)
            .map_err(|e| DataFault::new(DataFaultKind::BadTimestamp, &record, e.to_string()))?;
        let duration = parse_duration(&row.duration).ok_or_else(|| {
            DataFault::new(
                DataFaultKind::BadDuration,
                &record,
                format!("Invalid duration {:?}", row.duration),
            )
        })?;

        Ok(Trip {
            rental_id: RecordId(row.rental_id),
            bike_id: RecordId(row.bike_id),
            start_station_id: RecordId(row.start_station_id),
            start_station_name: row.start_station_name.filter(|n| !n.is_empty()),
            end_station_id: RecordId(row.end_station_id),
            end_station_name: row.end_station_name.filter(|n| !n.is_empty()),
            start_date,
            end_date,
            duration,
        })
    }
}

/// Whole seconds; integral floats such as `"1200.0"` are accepted.
fn parse_duration(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Some(secs);
    }
    let secs: f64 = raw.parse().ok()?;
    (secs.is_finite() && secs.fract() == 0.0 && secs.abs() < i64::MAX as f64)
        .then_some(secs as i64)
}
