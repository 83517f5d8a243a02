// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bikes present per station within a time window.
//!
//! A bike counts as present at a station when one of its trips ended there
//! inside the window. A bike that left again before the window closed is
//! still counted; the trip table alone cannot tell a docked bike from one
//! passing through, so this stays an approximation.

use crate::models::{IdKey, Trip};
use crate::time_utils::TimeWindow;
use std::collections::{HashMap, HashSet};

/// Station id to number of distinct bikes present.
pub type Occupancy = HashMap<u64, u32>;

/// Count distinct bikes per end station for trips ending inside `window`.
///
/// Bikes are told apart by [`IdKey`], so "007" and "7" are one bike.
///
/// Trips whose end station id is not numeric cannot be joined to a station
/// and are skipped; triage reports them.
pub fn occupancy(trips: &[Trip], window: &TimeWindow) -> Occupancy {
    let mut bikes_by_station: HashMap<u64, HashSet<IdKey<'_>>> = HashMap::new();
    let mut unjoinable = 0usize;

    for trip in trips.iter().filter(|t| window.contains(t.end_date)) {
        match trip.end_station_id.as_number() {
            Some(station_id) => {
                bikes_by_station
                    .entry(station_id)
                    .or_default()
                    .insert(trip.bike_id.key());
            }
            None => unjoinable += 1,
        }
    }

    if unjoinable > 0 {
        tracing::debug!(unjoinable, "Skipped trips with non-numeric end station");
    }

    bikes_by_station
        .into_iter()
        .map(|(station_id, bikes)| (station_id, bikes.len() as u32))
        .collect()
}
