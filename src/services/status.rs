// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Join station metadata with window occupancy.

use crate::error::{DataFault, DataFaultKind};
use crate::models::{Station, StationStatus};
use crate::services::occupancy::Occupancy;
use std::cmp::Ordering;

/// Statuses for every usable station, plus stations that could not be rated.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusMerge {
    /// One entry per station with docks, in station order
    pub statuses: Vec<StationStatus>,
    pub faults: Vec<DataFault>,
}

impl StatusMerge {
    pub fn get(&self, station_id: u64) -> Option<&StationStatus> {
        self.statuses.iter().find(|s| s.station_id == station_id)
    }

    pub fn at_capacity(&self) -> impl Iterator<Item = &StationStatus> {
        self.statuses.iter().filter(|s| s.at_capacity)
    }
}

/// Left-join `stations` with `occupancy`.
///
/// Stations absent from the occupancy map get zero bikes. Stations with zero
/// docks have no defined capacity ratio; they are left out of the statuses
/// and reported as faults.
pub fn merge_station_status(
    stations: &[Station],
    occupancy: &Occupancy,
    threshold: f64,
) -> StatusMerge {
    let mut statuses = Vec::with_capacity(stations.len());
    let mut faults = Vec::new();

    for station in stations {
        if station.docks_count == 0 {
            tracing::warn!(station_id = station.id, name = %station.name, "Station has zero docks, skipping");
            faults.push(DataFault::new(
                DataFaultKind::ZeroDocks,
                format!("station {}", station.id),
                "docks_count is zero",
            ));
            continue;
        }

        let bikes_present = occupancy.get(&station.id).copied().unwrap_or(0);
        let capacity_pct = f64::from(bikes_present) / f64::from(station.docks_count);

        statuses.push(StationStatus {
            station_id: station.id,
            name: station.name.clone(),
            latitude: station.latitude(),
            longitude: station.longitude(),
            docks_count: station.docks_count,
            bikes_present,
            capacity_pct,
            at_capacity: capacity_pct >= threshold,
        });
    }

    tracing::debug!(
        stations = statuses.len(),
        skipped = faults.len(),
        threshold,
        "Merged station status"
    );

    StatusMerge { statuses, faults }
}

/// Stations at or above `threshold`, fullest first.
pub fn over_capacity(statuses: &[StationStatus], threshold: f64) -> Vec<StationStatus> {
    let mut over: Vec<_> = statuses
        .iter()
        .filter(|s| s.capacity_pct >= threshold)
        .cloned()
        .collect();
    over.sort_by(|a, b| by_capacity(b, a));
    over
}

/// Stations strictly below `threshold`, emptiest first.
pub fn under_capacity(statuses: &[StationStatus], threshold: f64) -> Vec<StationStatus> {
    let mut under: Vec<_> = statuses
        .iter()
        .filter(|s| s.capacity_pct < threshold)
        .cloned()
        .collect();
    under.sort_by(by_capacity);
    under
}

fn by_capacity(a: &StationStatus, b: &StationStatus) -> Ordering {
    a.capacity_pct.total_cmp(&b.capacity_pct)
}
