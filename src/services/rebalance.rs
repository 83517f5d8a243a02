// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rebalancing target selection.
//!
//! For an origin station, look at its nearest neighbors and keep those with
//! enough free docks to take bikes.

use crate::error::{OpsError, Result};
use crate::models::{RebalanceCandidate, RebalanceQuery, RebalanceSuggestion, StationStatus};
use crate::services::spatial::SpatialIndex;
use crate::services::status::over_capacity;
use std::collections::HashMap;

/// Nearby stations with at least `min_available_ratio` free docks, freest first.
///
/// Candidates with equal availability keep the index's distance order. An
/// empty result means no neighbor qualifies; an unknown origin is a
/// [`OpsError::Lookup`]. Neighbors without a status row (zero-dock stations)
/// are never candidates.
pub fn find_targets(
    index: &SpatialIndex,
    statuses: &[StationStatus],
    query: &RebalanceQuery,
) -> Result<Vec<RebalanceCandidate>> {
    let by_id: HashMap<u64, &StationStatus> =
        statuses.iter().map(|s| (s.station_id, s)).collect();
    find_targets_in(index, &by_id, query)
}

fn find_targets_in(
    index: &SpatialIndex,
    by_id: &HashMap<u64, &StationStatus>,
    query: &RebalanceQuery,
) -> Result<Vec<RebalanceCandidate>> {
    let origin = index
        .position_of(query.origin_station_id)
        .ok_or(OpsError::Lookup(query.origin_station_id))?;

    let neighbors = index.query(origin, query.k)?;

    let mut candidates: Vec<RebalanceCandidate> = neighbors
        .iter()
        .filter_map(|neighbor| {
            let Some(status) = by_id.get(&neighbor.station_id) else {
                tracing::debug!(
                    station_id = neighbor.station_id,
                    "Neighbor has no status, skipping"
                );
                return None;
            };
            Some(candidate(status, neighbor.distance_m))
        })
        .filter(|c| c.available_ratio >= query.min_available_ratio)
        .collect();

    // Stable: ties stay in distance order
    candidates.sort_by(|a, b| b.available_ratio.total_cmp(&a.available_ratio));

    tracing::debug!(
        origin = query.origin_station_id,
        neighbors = neighbors.len(),
        candidates = candidates.len(),
        "Rebalance targets"
    );
    Ok(candidates)
}

fn candidate(status: &StationStatus, distance_m: f64) -> RebalanceCandidate {
    let available_docks = i64::from(status.docks_count) - i64::from(status.bikes_present);
    RebalanceCandidate {
        station_id: status.station_id,
        name: status.name.clone(),
        latitude: status.latitude,
        longitude: status.longitude,
        docks_count: status.docks_count,
        bikes_present: status.bikes_present,
        available_docks,
        available_ratio: available_docks as f64 / f64::from(status.docks_count),
        distance_m: round_decimeters(distance_m),
    }
}

fn round_decimeters(meters: f64) -> f64 {
    (meters * 10.0).round() / 10.0
}

/// Targets for every station at or above `threshold`, fullest origin first.
pub fn rebalance_plan(
    index: &SpatialIndex,
    statuses: &[StationStatus],
    threshold: f64,
    k: usize,
    min_available_ratio: f64,
) -> Result<Vec<RebalanceSuggestion>> {
    let by_id: HashMap<u64, &StationStatus> =
        statuses.iter().map(|s| (s.station_id, s)).collect();

    over_capacity(statuses, threshold)
        .into_iter()
        .map(|origin| {
            let query = RebalanceQuery::new(origin.station_id, k, min_available_ratio)?;
            let targets = find_targets_in(index, &by_id, &query)?;
            Ok(RebalanceSuggestion {
                origin_station_id: origin.station_id,
                origin_name: origin.name,
                origin_capacity_pct: origin.capacity_pct,
                targets,
            })
        })
        .collect()
}
