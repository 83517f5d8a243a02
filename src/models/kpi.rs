//! Headline figures for the overview dashboard.
//!
//! Summaries are folded one trip at a time, then finalized into the
//! reported shape.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::{id_order, StationStatus, Trip};

/// Activity figures for one period (today, month to date).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivitySummary {
    // ─── Volume ──────────────────────────────────────────────────
    pub trips: usize,
    pub unique_bikes: usize,
    /// Distinct station ids seen as either start or end
    pub stations_used: usize,

    // ─── Hot spots ───────────────────────────────────────────────
    pub busiest_start_station: Option<String>,
    pub busiest_end_station: Option<String>,
    pub top_bike: Option<String>,
    pub top_bike_trips: usize,

    // ─── Data quality ────────────────────────────────────────────
    /// Distinct bikes with at least one flagged ride
    pub bikes_with_issues: usize,
    pub top_faulty_bike: Option<String>,
    pub top_faulty_bike_issues: usize,
}

/// Running counters behind an [`ActivitySummary`].
#[derive(Debug, Default)]
pub struct ActivityTally {
    trips: usize,
    bikes: HashMap<String, usize>,
    stations: HashSet<String>,
    start_names: HashMap<String, usize>,
    end_names: HashMap<String, usize>,
    faulty_bikes: HashMap<String, usize>,
}

impl ActivityTally {
    /// Count one trip; `flagged` marks a ride that violated a triage rule.
    pub fn record(&mut self, trip: &Trip, flagged: bool) {
        self.trips += 1;

        *self.bikes.entry(trip.bike_id.to_string()).or_insert(0) += 1;
        self.stations.insert(trip.start_station_id.to_string());
        self.stations.insert(trip.end_station_id.to_string());

        if let Some(name) = &trip.start_station_name {
            *self.start_names.entry(name.clone()).or_insert(0) += 1;
        }
        if let Some(name) = &trip.end_station_name {
            *self.end_names.entry(name.clone()).or_insert(0) += 1;
        }

        if flagged {
            *self
                .faulty_bikes
                .entry(trip.bike_id.to_string())
                .or_insert(0) += 1;
        }
    }

    pub fn finish(self) -> ActivitySummary {
        let top_bike = most_frequent(&self.bikes);
        let top_faulty = most_frequent(&self.faulty_bikes);

        ActivitySummary {
            trips: self.trips,
            unique_bikes: self.bikes.len(),
            stations_used: self.stations.len(),
            busiest_start_station: most_frequent(&self.start_names).map(|(name, _)| name),
            busiest_end_station: most_frequent(&self.end_names).map(|(name, _)| name),
            top_bike_trips: top_bike.as_ref().map_or(0, |(_, n)| *n),
            top_bike: top_bike.map(|(id, _)| id),
            bikes_with_issues: self.faulty_bikes.len(),
            top_faulty_bike_issues: top_faulty.as_ref().map_or(0, |(_, n)| *n),
            top_faulty_bike: top_faulty.map(|(id, _)| id),
        }
    }
}

/// Highest count; ties go to the lowest key (numeric ids by value).
pub(crate) fn most_frequent(counts: &HashMap<String, usize>) -> Option<(String, usize)> {
    counts
        .iter()
        .max_by(|(ka, na), (kb, nb)| na.cmp(nb).then_with(|| id_order(kb, ka)))
        .map(|(key, n)| (key.clone(), *n))
}

/// Over/under capacity overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationSummary {
    pub over_capacity: usize,
    pub under_capacity: usize,
    /// Up to three fullest stations
    pub top_overloaded: Vec<StationStatus>,
    /// Up to three emptiest stations
    pub top_underused: Vec<StationStatus>,
}

/// Everything the overview page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub today: ActivitySummary,
    pub month_to_date: ActivitySummary,
    pub stations: StationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::{TimeZone, Utc};

    fn make_trip(rental: u64, bike: &str, from: (u64, &str), to: (u64, &str)) -> Trip {
        let start = Utc.with_ymd_and_hms(2022, 6, 17, 8, 0, 0).unwrap();
        Trip {
            rental_id: rental.into(),
            bike_id: RecordId::from(bike),
            start_station_id: from.0.into(),
            start_station_name: Some(from.1.to_string()),
            end_station_id: to.0.into(),
            end_station_name: Some(to.1.to_string()),
            start_date: start,
            end_date: start + chrono::Duration::minutes(10),
            duration: 600,
        }
    }

    #[test]
    fn test_empty_tally() {
        let summary = ActivityTally::default().finish();
        assert_eq!(summary, ActivitySummary::default());
        assert_eq!(summary.busiest_start_station, None);
    }

    #[test]
    fn test_tally_counts() {
        let mut tally = ActivityTally::default();
        tally.record(&make_trip(1, "7", (1, "Soho"), (2, "Bank")), false);
        tally.record(&make_trip(2, "7", (2, "Bank"), (3, "Angel")), true);
        tally.record(&make_trip(3, "9", (1, "Soho"), (2, "Bank")), false);

        let summary = tally.finish();
        assert_eq!(summary.trips, 3);
        assert_eq!(summary.unique_bikes, 2);
        assert_eq!(summary.stations_used, 3);
        assert_eq!(summary.busiest_start_station.as_deref(), Some("Soho"));
        assert_eq!(summary.busiest_end_station.as_deref(), Some("Bank"));
        assert_eq!(summary.top_bike.as_deref(), Some("7"));
        assert_eq!(summary.top_bike_trips, 2);
        assert_eq!(summary.bikes_with_issues, 1);
        assert_eq!(summary.top_faulty_bike.as_deref(), Some("7"));
        assert_eq!(summary.top_faulty_bike_issues, 1);
    }

    #[test]
    fn test_most_frequent_tie_break() {
        let counts: HashMap<String, usize> =
            [("b".to_string(), 2), ("a".to_string(), 2), ("c".to_string(), 1)]
                .into_iter()
                .collect();
        assert_eq!(most_frequent(&counts), Some(("a".to_string(), 2)));

        let bikes: HashMap<String, usize> = [("10".to_string(), 3), ("9".to_string(), 3)]
            .into_iter()
            .collect();
        assert_eq!(most_frequent(&bikes), Some(("9".to_string(), 3)));
    }
}
