// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data-quality triage results.

use crate::models::Trip;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Delimiter between labels when several rules fire on one record.
pub const LABEL_DELIMITER: &str = "; ";

/// Which built-in check a rule performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    YearOutOfRange,
    DurationOutOfBounds,
    BikeIdNonNumeric,
    StartStationNonNumeric,
    EndStationNonNumeric,
    RentalIdNonNumeric,
    Custom,
}

/// Violation count for one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RuleSummary {
    pub rule: String,
    pub invalid_rows: usize,
    pub total_rows: usize,
    /// Share of invalid rows in percent, two decimals
    pub invalid_pct: f64,
}

/// Per-record membership for one rule, aligned with the evaluated trips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMask {
    pub rule: String,
    #[serde(skip)]
    pub kind: RuleKind,
    pub mask: Vec<bool>,
}

impl RuleMask {
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|hit| **hit).count()
    }
}

/// Outcome of evaluating a rule set over a batch of trips.
///
/// Triage only labels; no record is ever dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriageReport {
    pub summary: Vec<RuleSummary>,
    pub masks: Vec<RuleMask>,
    pub total_rows: usize,
}

impl TriageReport {
    /// Logical OR across all rule masks.
    pub fn any_mask(&self) -> Vec<bool> {
        let mut any = vec![false; self.total_rows];
        for rule in &self.masks {
            for (acc, hit) in any.iter_mut().zip(&rule.mask) {
                *acc |= *hit;
            }
        }
        any
    }

    /// Number of records violating at least one rule.
    pub fn flagged_count(&self) -> usize {
        self.any_mask().into_iter().filter(|hit| *hit).count()
    }

    /// Labels of the rules fired for `row`, in rule declaration order.
    pub fn rules_for(&self, row: usize) -> Vec<&str> {
        self.masks
            .iter()
            .filter(|rule| rule.mask.get(row).copied().unwrap_or(false))
            .map(|rule| rule.rule.as_str())
            .collect()
    }

    /// Concatenated label per record; empty string when no rule fired.
    pub fn labels(&self) -> Vec<String> {
        (0..self.total_rows)
            .map(|row| self.rules_for(row).join(LABEL_DELIMITER))
            .collect()
    }

    /// Mask of a single built-in rule, if present in the evaluated set.
    pub fn mask_of(&self, kind: RuleKind) -> Option<&RuleMask> {
        self.masks.iter().find(|rule| rule.kind == kind)
    }
}

/// A trip that violated at least one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedTrip {
    pub trip: Trip,
    /// Labels joined with [`LABEL_DELIMITER`]
    pub bike_issue: String,
}

/// Flagged-ride count for one bike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BikeIssueCount {
    pub bike_id: String,
    pub issues: usize,
}

/// Docking station a ride ended at, for placing it on a map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RideDestination {
    pub station_id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Maintenance view over the flagged trips of a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeTriageReport {
    pub summary: Vec<RuleSummary>,
    /// Flagged trips surviving the fault filter, in input order
    pub flagged: Vec<FlaggedTrip>,
    /// Bikes ordered by flagged rides, most first
    pub bikes: Vec<BikeIssueCount>,
    pub most_flagged_bike: Option<String>,
    /// Most recent flagged ride of the most flagged bike
    pub latest_ride: Option<FlaggedTrip>,
    /// Where that ride ended, if the station is known
    pub latest_destination: Option<RideDestination>,
    /// Up to five most recent flagged rides of the most flagged bike
    pub recent_rides: Vec<FlaggedTrip>,
}

impl BikeTriageReport {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}
