// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Operations facade over one loaded dataset.
//!
//! Loads trips and stations once, builds the spatial index once, and answers
//! the dashboard questions against the simulated reference day.

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    BikeIssueCount, BikeTriageReport, CapacityQuery, CapacityReport, KpiSummary,
    RebalanceCandidate, RebalanceQuery, RebalanceSuggestion, Station, StationStatus, Trip,
};
use crate::services::kpi::{activity_summary, station_summary, trips_started_in};
use crate::services::occupancy::{occupancy, Occupancy};
use crate::services::rebalance::{find_targets, rebalance_plan};
use crate::services::spatial::SpatialIndex;
use crate::services::status::{merge_station_status, over_capacity, under_capacity, StatusMerge};
use crate::services::store::{QuarantinedRow, TripStationStore};
use crate::services::triage::{bike_triage_report, bikes_flagged_for_service, RuleSet};
use crate::time_utils::{Clock, SimulatedDay, TimeWindow};
use validator::Validate;

/// Occupancy window for "bikes present right now".
const PRESENT_NOW_HOURS: i64 = 1;

pub struct OperationsService {
    config: Config,
    day: SimulatedDay,
    trips: Vec<Trip>,
    stations: Vec<Station>,
    index: SpatialIndex,
    quarantined: Vec<QuarantinedRow>,
}

impl OperationsService {
    /// Load both datasets from `store` and index the stations.
    pub fn load(config: Config, store: &dyn TripStationStore) -> Result<Self> {
        let trips = store.load_trips()?;
        let stations = store.load_stations()?;

        tracing::info!(
            trips = trips.records.len(),
            stations = stations.records.len(),
            quarantined_trips = trips.quarantined.len(),
            quarantined_stations = stations.quarantined.len(),
            "Loaded datasets"
        );

        let mut service = Self::new(config, trips.records, stations.records);
        service.quarantined = trips.quarantined;
        service.quarantined.extend(stations.quarantined);
        Ok(service)
    }

    pub fn new(config: Config, trips: Vec<Trip>, stations: Vec<Station>) -> Self {
        let day = SimulatedDay::new(config.reference_date, config.reference_tz);
        let index = SpatialIndex::build(&stations);
        Self {
            config,
            day,
            trips,
            stations,
            index,
            quarantined: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn day(&self) -> &SimulatedDay {
        &self.day
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Rows rejected while loading, trips first.
    pub fn quarantined(&self) -> &[QuarantinedRow] {
        &self.quarantined
    }

    /// Every station's occupancy in `window`, rated against the query threshold.
    pub fn station_status(&self, window: &TimeWindow, query: &CapacityQuery) -> Result<StatusMerge> {
        query.validate()?;
        let occ = occupancy(&self.trips, window);
        Ok(merge_station_status(&self.stations, &occ, query.threshold))
    }

    /// Capacity views for the configured window ending at `hour:00` on the reference day.
    pub fn capacity_report(&self, hour: u32) -> Result<CapacityReport> {
        let window = self.day.window_ending_at(hour, self.config.window_hours)?;
        let query = CapacityQuery::new(self.config.capacity_threshold)?;
        let merged = self.station_status(&window, &query)?;

        Ok(CapacityReport {
            window,
            threshold: query.threshold,
            over_capacity: over_capacity(&merged.statuses, query.threshold),
            under_capacity: under_capacity(
                &merged.statuses,
                self.config.under_capacity_threshold,
            ),
            statuses: merged.statuses,
            faults: merged.faults,
        })
    }

    /// Bikes docked per station over the last hour before the simulated now.
    pub fn bikes_present_now(&self, clock: &dyn Clock) -> Result<Occupancy> {
        let now = self.day.now(clock)?;
        let window = TimeWindow::trailing(now, PRESENT_NOW_HOURS)?;
        Ok(occupancy(&self.trips, &window))
    }

    pub fn rebalance_targets(
        &self,
        statuses: &[StationStatus],
        query: &RebalanceQuery,
    ) -> Result<Vec<RebalanceCandidate>> {
        query.validate()?;
        find_targets(&self.index, statuses, query)
    }

    /// Targets for every station at or above the configured capacity threshold.
    pub fn rebalance_plan(&self, statuses: &[StationStatus]) -> Result<Vec<RebalanceSuggestion>> {
        rebalance_plan(
            &self.index,
            statuses,
            self.config.capacity_threshold,
            self.config.neighbor_count,
            self.config.min_available_ratio,
        )
    }

    /// Maintenance triage over trips from the start of the month up to the simulated now.
    pub fn bike_triage(
        &self,
        clock: &dyn Clock,
        fault_filter: Option<&[&str]>,
    ) -> Result<BikeTriageReport> {
        let trips = self.month_to_now(clock)?;
        Ok(bike_triage_report(
            &trips,
            &self.stations,
            &RuleSet::bike_triage(),
            fault_filter,
        ))
    }

    /// Bikes with enough duration or bike-id violations this month to pull for service.
    pub fn bikes_for_service(&self, clock: &dyn Clock) -> Result<Vec<BikeIssueCount>> {
        let trips = self.month_to_now(clock)?;
        Ok(bikes_flagged_for_service(
            &trips,
            &RuleSet::bike_triage(),
            self.config.triage_min_issues,
        ))
    }

    /// Overview figures for today, the month before today, and station capacity now.
    pub fn kpi_summary(&self, clock: &dyn Clock) -> Result<KpiSummary> {
        let now = self.day.now(clock)?;
        let start_of_day = self.day.start_of_day()?;
        let start_of_month = self.day.start_of_month()?;
        let ruleset = RuleSet::bike_hire();

        let today: Vec<Trip> = trips_started_in(&self.trips, &TimeWindow::new(start_of_day, now)?)
            .into_iter()
            .cloned()
            .collect();
        let month: Vec<Trip> =
            trips_started_in(&self.trips, &TimeWindow::new(start_of_month, start_of_day)?)
                .into_iter()
                .cloned()
                .collect();

        let present = self.bikes_present_now(clock)?;
        let merged = merge_station_status(&self.stations, &present, self.config.capacity_threshold);

        Ok(KpiSummary {
            today: activity_summary(&today, &ruleset),
            month_to_date: activity_summary(&month, &ruleset),
            stations: station_summary(
                &merged.statuses,
                self.config.capacity_threshold,
                self.config.under_capacity_threshold,
            ),
        })
    }

    fn month_to_now(&self, clock: &dyn Clock) -> Result<Vec<Trip>> {
        let now = self.day.now(clock)?;
        let start_of_month = self.day.start_of_month()?;
        Ok(self
            .trips
            .iter()
            .filter(|t| t.start_date >= start_of_month && t.end_date <= now)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use crate::services::store::InMemoryStore;
    use crate::time_utils::FixedClock;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    // Reference day 2022-06-17 in Europe/London (BST, UTC+1)
    fn utc(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 6, day, hour, minute, 0).unwrap()
    }

    fn ride(rental: u64, bike: &str, from: u64, to: u64, end: DateTime<Utc>, secs: i64) -> Trip {
        Trip {
            rental_id: rental.into(),
            bike_id: RecordId::from(bike),
            start_station_id: from.into(),
            start_station_name: Some(format!("S{from}")),
            end_station_id: to.into(),
            end_station_name: Some(format!("S{to}")),
            start_date: end - Duration::seconds(secs.max(0)),
            end_date: end,
            duration: secs,
        }
    }

    fn service() -> OperationsService {
        let stations = vec![
            Station::new(1, "S1", 51.500, -0.100, 4),
            Station::new(2, "S2", 51.501, -0.100, 4),
            Station::new(3, "S3", 51.502, -0.100, 4),
        ];
        let trips = vec![
            // Earlier in the month
            ride(1, "10", 1, 2, utc(3, 9, 0), 600),
            ride(2, "11", 1, 2, utc(3, 9, 30), 0),
            // Reference day, local 08:xx
            ride(3, "10", 2, 1, utc(17, 7, 10), 600),
            ride(4, "12", 2, 1, utc(17, 7, 20), 600),
            ride(5, "13", 3, 1, utc(17, 7, 40), -5),
            ride(6, "12", 1, 3, utc(17, 9, 30), 600),
        ];
        let store = InMemoryStore::new(trips, stations);
        OperationsService::load(Config::default(), &store).unwrap()
    }

    // 09:00 in London (GMT in January), so 08:00 UTC on the reference day
    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_bikes_present_now() {
        let present = service().bikes_present_now(&clock()).unwrap();
        // Window is 07:00..08:00 UTC on the reference day
        assert_eq!(present.get(&1), Some(&3));
        assert_eq!(present.get(&3), None);
    }

    #[test]
    fn test_capacity_report_for_hour() {
        let report = service().capacity_report(9).unwrap();
        assert_eq!(report.window.end, utc(17, 8, 0));
        assert_eq!(report.window.start, utc(17, 5, 0));

        let over: Vec<_> = report.over_capacity.iter().map(|s| s.station_id).collect();
        assert_eq!(over, vec![1]);
        let under: Vec<_> = report.under_capacity.iter().map(|s| s.station_id).collect();
        assert_eq!(under, vec![2, 3]);
        assert!(report.faults.is_empty());
    }

    #[test]
    fn test_station_status_rejects_bad_threshold() {
        let svc = service();
        let window = svc.day().window_ending_at(9, 3).unwrap();
        let query = CapacityQuery { threshold: 1.5 };
        assert!(svc.station_status(&window, &query).is_err());
    }

    #[test]
    fn test_kpi_summary_periods() {
        let kpi = service().kpi_summary(&clock()).unwrap();

        assert_eq!(kpi.today.trips, 3);
        assert_eq!(kpi.today.unique_bikes, 3);
        assert_eq!(kpi.today.bikes_with_issues, 1);
        assert_eq!(kpi.today.top_faulty_bike.as_deref(), Some("13"));

        assert_eq!(kpi.month_to_date.trips, 2);
        assert_eq!(kpi.month_to_date.bikes_with_issues, 1);

        assert_eq!(kpi.stations.over_capacity, 1);
        assert_eq!(kpi.stations.top_overloaded[0].station_id, 1);
    }

    #[test]
    fn test_bike_triage_excludes_rides_after_now() {
        let report = service().bike_triage(&clock(), None).unwrap();
        assert!(report.flagged.iter().all(|f| f.trip.rental_id.to_string() != "6"));
        let rentals: Vec<_> = report
            .flagged
            .iter()
            .map(|f| f.trip.rental_id.to_string())
            .collect();
        assert_eq!(rentals, vec!["2", "5"]);
    }

    #[test]
    fn test_rebalance_plan_from_report() {
        let svc = service();
        let report = svc.capacity_report(9).unwrap();
        let plan = svc.rebalance_plan(&report.statuses).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].origin_station_id, 1);
        let targets: Vec<_> = plan[0].targets.iter().map(|t| t.station_id).collect();
        // Both neighbors are empty, so distance order decides
        assert_eq!(targets, vec![2, 3]);
    }
}
