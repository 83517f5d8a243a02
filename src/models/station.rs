// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Docking station reference data and its derived per-window status.

use crate::error::{DataFault, DataFaultKind};
use crate::time_utils::TimeWindow;
use geo::Point;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A docking station.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u64,
    pub name: String,
    /// Location in degrees (x = longitude, y = latitude)
    pub location: Point<f64>,
    /// Total docking capacity. Zero is loaded but never divided by.
    pub docks_count: u32,
}

impl Station {
    pub fn new(
        id: u64,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        docks_count: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            location: Point::new(longitude, latitude),
            docks_count,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }
}

/// One row of the stations CSV before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct StationRow {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub docks_count: i64,
}

impl TryFrom<StationRow> for Station {
    type Error = DataFault;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        let record = format!("station {}", row.id);

        let id = crate::models::RecordId::new(row.id.as_str())
            .as_number()
            .ok_or_else(|| {
                DataFault::new(DataFaultKind::NonNumericId, &record, "Station id is not numeric")
            })?;

        if !(-90.0..=90.0).contains(&row.latitude) || !(-180.0..=180.0).contains(&row.longitude) {
            return Err(DataFault::new(
                DataFaultKind::BadCoordinates,
                &record,
                format!("({}, {}) is not a valid position", row.latitude, row.longitude),
            ));
        }

        let docks_count = u32::try_from(row.docks_count).map_err(|_| {
            DataFault::new(
                DataFaultKind::NegativeDocks,
                &record,
                format!("docks_count {} out of range", row.docks_count),
            )
        })?;

        Ok(Station::new(id, row.name, row.latitude, row.longitude, docks_count))
    }
}

/// Station occupancy for one time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StationStatus {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub station_id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub docks_count: u32,
    pub bikes_present: u32,
    /// bikes_present / docks_count
    pub capacity_pct: f64,
    pub at_capacity: bool,
}

/// Capacity picture for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityReport {
    pub window: TimeWindow,
    pub threshold: f64,
    /// Every rated station, in station order
    pub statuses: Vec<StationStatus>,
    /// At or above the capacity threshold, fullest first
    pub over_capacity: Vec<StationStatus>,
    /// Below the under-capacity threshold, emptiest first
    pub under_capacity: Vec<StationStatus>,
    /// Stations that could not be rated
    pub faults: Vec<DataFault>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, lat: f64, lon: f64, docks: i64) -> StationRow {
        StationRow {
            id: id.to_string(),
            name: "River Street".to_string(),
            latitude: lat,
            longitude: lon,
            docks_count: docks,
        }
    }

    #[test]
    fn test_station_coordinates() {
        let station = Station::try_from(row("1", 51.529, -0.109, 19)).unwrap();
        assert_eq!(station.id, 1);
        assert_eq!(station.latitude(), 51.529);
        assert_eq!(station.longitude(), -0.109);
    }

    #[test]
    fn test_zero_docks_loads() {
        let station = Station::try_from(row("2", 51.5, -0.1, 0)).unwrap();
        assert_eq!(station.docks_count, 0);
    }

    #[test]
    fn test_invalid_rows_rejected() {
        let fault = Station::try_from(row("abc", 51.5, -0.1, 10)).unwrap_err();
        assert_eq!(fault.kind, DataFaultKind::NonNumericId);

        let fault = Station::try_from(row("3", 91.0, -0.1, 10)).unwrap_err();
        assert_eq!(fault.kind, DataFaultKind::BadCoordinates);

        let fault = Station::try_from(row("4", 51.5, -0.1, -1)).unwrap_err();
        assert_eq!(fault.kind, DataFaultKind::NegativeDocks);
    }
}
