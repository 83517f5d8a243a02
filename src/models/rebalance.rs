// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rebalancing recommendations.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A nearby station able to take bikes from an overloaded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RebalanceCandidate {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub station_id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub docks_count: u32,
    pub bikes_present: u32,
    /// docks_count - bikes_present; negative when overbooked
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub available_docks: i64,
    /// available_docks / docks_count, not clamped
    pub available_ratio: f64,
    /// Great-circle distance from the origin, rounded to 0.1 m
    pub distance_m: f64,
}

/// Targets for one over-capacity origin station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RebalanceSuggestion {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub origin_station_id: u64,
    pub origin_name: String,
    pub origin_capacity_pct: f64,
    /// Empty when no neighbor clears the availability threshold
    pub targets: Vec<RebalanceCandidate>,
}
