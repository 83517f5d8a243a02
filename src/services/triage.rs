// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data-quality triage over trip records.
//!
//! Rules are independent predicates evaluated over every trip; a trip may
//! violate several at once. Evaluation produces a per-rule mask aligned with
//! the input and never drops a record.

use crate::models::triage::LABEL_DELIMITER;
use crate::models::{
    id_order, BikeIssueCount, BikeTriageReport, FlaggedTrip, RideDestination, RuleKind, RuleMask,
    RuleSummary, Station, Trip, TriageReport,
};
use chrono::Datelike;
use std::collections::HashMap;

/// Earliest plausible trip year.
pub const MIN_VALID_YEAR: i32 = 2015;
/// Latest plausible trip year.
pub const MAX_VALID_YEAR: i32 = 2023;
/// Trips of a full day or longer are treated as docking errors.
pub const MAX_DURATION_SECS: i64 = 86_400;

/// How many recent rides to show for the most flagged bike.
const RECENT_RIDES: usize = 5;

type Predicate = Box<dyn Fn(&Trip) -> bool + Send + Sync>;

/// A named validity check; the predicate returns `true` for a violation.
pub struct TriageRule {
    pub name: String,
    pub kind: RuleKind,
    predicate: Predicate,
}

impl TriageRule {
    pub fn new(
        name: impl Into<String>,
        kind: RuleKind,
        predicate: impl Fn(&Trip) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            predicate: Box::new(predicate),
        }
    }

    pub fn violated_by(&self, trip: &Trip) -> bool {
        (self.predicate)(trip)
    }
}

impl std::fmt::Debug for TriageRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriageRule")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered list of rules. Declaration order drives label order.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<TriageRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: TriageRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[TriageRule] {
        &self.rules
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Data-quality checks with short labels, used by the overview KPIs.
    pub fn bike_hire() -> Self {
        Self::builtin([
            "Year not 2015-2023",
            "Duration ≤ 0 OR ≥ 86400",
            "bike_id non-numeric",
            "start_station_id non-numeric",
            "end_station_id non-numeric",
            "rental_id non-numeric",
        ])
    }

    /// The same checks labelled with their likely operational cause.
    pub fn bike_triage() -> Self {
        Self::builtin([
            "Year not in 2015–2023 (possible test/faulty clock)",
            "Duration ≤ 0 or > 24h (possible logging or docking error)",
            "Bike ID not recognised (likely unregistered or test bike)",
            "Start station invalid (bike may not have docked in)",
            "End station invalid (bike may not have docked out)",
            "Rental session corrupt or missing ID",
        ])
    }

    fn builtin(labels: [&str; 6]) -> Self {
        let [year, duration, bike, start, end, rental] = labels;
        Self::new()
            .with_rule(TriageRule::new(year, RuleKind::YearOutOfRange, |t| {
                !(MIN_VALID_YEAR..=MAX_VALID_YEAR).contains(&t.start_date.year())
            }))
            .with_rule(TriageRule::new(duration, RuleKind::DurationOutOfBounds, |t| {
                t.duration <= 0 || t.duration >= MAX_DURATION_SECS
            }))
            .with_rule(TriageRule::new(bike, RuleKind::BikeIdNonNumeric, |t| {
                !t.bike_id.is_numeric()
            }))
            .with_rule(TriageRule::new(start, RuleKind::StartStationNonNumeric, |t| {
                !t.start_station_id.is_numeric()
            }))
            .with_rule(TriageRule::new(end, RuleKind::EndStationNonNumeric, |t| {
                !t.end_station_id.is_numeric()
            }))
            .with_rule(TriageRule::new(rental, RuleKind::RentalIdNonNumeric, |t| {
                !t.rental_id.is_numeric()
            }))
    }
}

/// Evaluate every rule over every trip.
pub fn evaluate(trips: &[Trip], ruleset: &RuleSet) -> TriageReport {
    let total_rows = trips.len();

    let masks: Vec<RuleMask> = ruleset
        .rules()
        .iter()
        .map(|rule| RuleMask {
            rule: rule.name.clone(),
            kind: rule.kind,
            mask: trips.iter().map(|t| rule.violated_by(t)).collect(),
        })
        .collect();

    let summary = masks
        .iter()
        .map(|mask| {
            let invalid_rows = mask.count();
            RuleSummary {
                rule: mask.rule.clone(),
                invalid_rows,
                total_rows,
                invalid_pct: percent(invalid_rows, total_rows),
            }
        })
        .collect();

    TriageReport {
        summary,
        masks,
        total_rows,
    }
}

/// Share of `part` in `total` as a percentage rounded to two decimals.
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        ((part as f64 / total as f64) * 10_000.0).round() / 100.0
    }
}

/// Flagged trips with their concatenated labels, in input order.
///
/// With `fault_filter`, only trips whose labels include at least one of the
/// given rule names are kept.
pub fn flagged_trips(
    trips: &[Trip],
    report: &TriageReport,
    fault_filter: Option<&[&str]>,
) -> Vec<FlaggedTrip> {
    trips
        .iter()
        .enumerate()
        .filter_map(|(row, trip)| {
            let fired = report.rules_for(row);
            if fired.is_empty() {
                return None;
            }
            if let Some(wanted) = fault_filter {
                if !fired.iter().any(|rule| wanted.contains(rule)) {
                    return None;
                }
            }
            Some(FlaggedTrip {
                trip: trip.clone(),
                bike_issue: fired.join(LABEL_DELIMITER),
            })
        })
        .collect()
}

/// Maintenance report: flagged rides, worst bike and its recent history.
///
/// `stations` is only used to place the latest flagged ride on a map.
pub fn bike_triage_report(
    trips: &[Trip],
    stations: &[Station],
    ruleset: &RuleSet,
    fault_filter: Option<&[&str]>,
) -> BikeTriageReport {
    let report = evaluate(trips, ruleset);
    let flagged = flagged_trips(trips, &report, fault_filter);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for flagged_trip in &flagged {
        *counts
            .entry(flagged_trip.trip.bike_id.to_string())
            .or_insert(0) += 1;
    }
    let bikes = ranked(counts);
    let most_flagged_bike = bikes.first().map(|b| b.bike_id.clone());

    let mut recent_rides: Vec<FlaggedTrip> = match &most_flagged_bike {
        Some(bike) => flagged
            .iter()
            .filter(|f| f.trip.bike_id.as_str() == bike)
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    recent_rides.sort_by(|a, b| b.trip.end_date.cmp(&a.trip.end_date));
    recent_rides.truncate(RECENT_RIDES);
    let latest_ride = recent_rides.first().cloned();
    let latest_destination = latest_ride
        .as_ref()
        .and_then(|ride| ride_destination(&ride.trip, stations));

    tracing::info!(
        trips = trips.len(),
        flagged = flagged.len(),
        bikes = bikes.len(),
        "Bike triage"
    );

    BikeTriageReport {
        summary: report.summary,
        flagged,
        bikes,
        most_flagged_bike,
        latest_ride,
        latest_destination,
        recent_rides,
    }
}

/// Station a ride ended at: by id, or by name when the id is unusable.
pub fn ride_destination(trip: &Trip, stations: &[Station]) -> Option<RideDestination> {
    let by_id = trip
        .end_station_id
        .as_number()
        .and_then(|id| stations.iter().find(|s| s.id == id));
    let station = by_id.or_else(|| {
        let name = trip.end_station_name.as_deref()?;
        stations.iter().find(|s| s.name == name)
    })?;

    Some(RideDestination {
        station_id: station.id,
        name: station.name.clone(),
        latitude: station.latitude(),
        longitude: station.longitude(),
    })
}

/// Bikes with at least `min_issues` rides violating the duration or bike-id rules.
pub fn bikes_flagged_for_service(
    trips: &[Trip],
    ruleset: &RuleSet,
    min_issues: usize,
) -> Vec<BikeIssueCount> {
    let report = evaluate(trips, ruleset);
    let duration = report.mask_of(RuleKind::DurationOutOfBounds);
    let bike_id = report.mask_of(RuleKind::BikeIdNonNumeric);
    let hit = |mask: Option<&RuleMask>, row: usize| mask.is_some_and(|m| m.mask[row]);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for (row, trip) in trips.iter().enumerate() {
        if hit(duration, row) || hit(bike_id, row) {
            *counts.entry(trip.bike_id.to_string()).or_insert(0) += 1;
        }
    }

    ranked(counts)
        .into_iter()
        .filter(|b| b.issues >= min_issues)
        .collect()
}

/// Most issues first; ties go to the lowest bike id.
fn ranked(counts: HashMap<String, usize>) -> Vec<BikeIssueCount> {
    let mut bikes: Vec<BikeIssueCount> = counts
        .into_iter()
        .map(|(bike_id, issues)| BikeIssueCount { bike_id, issues })
        .collect();
    bikes.sort_by(|a, b| {
        b.issues
            .cmp(&a.issues)
            .then_with(|| id_order(&a.bike_id, &b.bike_id))
    });
    bikes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn june(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 6, day, hour, 0, 0).unwrap()
    }

    fn make_trip(rental: &str, bike: &str, duration: i64, start: DateTime<Utc>) -> Trip {
        Trip {
            rental_id: RecordId::from(rental),
            bike_id: RecordId::from(bike),
            start_station_id: RecordId::from("1"),
            start_station_name: Some("Soho Square".to_string()),
            end_station_id: RecordId::from("2"),
            end_station_name: Some("Bank".to_string()),
            start_date: start,
            end_date: start + Duration::seconds(duration.max(0)),
            duration,
        }
    }

    #[test]
    fn test_duration_bounds() {
        let trips = vec![
            make_trip("1", "10", 0, june(1, 8)),
            make_trip("2", "10", 90_000, june(1, 9)),
            make_trip("3", "10", 3_600, june(1, 10)),
        ];
        let report = evaluate(&trips, &RuleSet::bike_hire());
        let mask = report.mask_of(RuleKind::DurationOutOfBounds).unwrap();
        assert_eq!(mask.mask, vec![true, true, false]);
        assert_eq!(report.summary[1].invalid_rows, 2);
        assert_eq!(report.summary[1].invalid_pct, 66.67);
    }

    #[test]
    fn test_year_rule() {
        let old = Utc.with_ymd_and_hms(2014, 12, 31, 23, 0, 0).unwrap();
        let future = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let trips = vec![
            make_trip("1", "10", 60, old),
            make_trip("2", "10", 60, future),
            make_trip("3", "10", 60, june(1, 8)),
        ];
        let report = evaluate(&trips, &RuleSet::bike_hire());
        assert_eq!(report.masks[0].mask, vec![true, true, false]);
    }

    #[test]
    fn test_rules_are_not_exclusive() {
        let trips = vec![
            make_trip("R-1", "TEST", -5, june(1, 8)),
            make_trip("2", "11", 600, june(1, 9)),
        ];
        let report = evaluate(&trips, &RuleSet::bike_hire());

        assert_eq!(report.any_mask(), vec![true, false]);
        assert_eq!(report.flagged_count(), 1);
        assert_eq!(
            report.labels()[0],
            "Duration ≤ 0 OR ≥ 86400; bike_id non-numeric; rental_id non-numeric"
        );
        assert_eq!(report.labels()[1], "");
    }

    #[test]
    fn test_no_rows_dropped() {
        let trips = vec![make_trip("1", "x", 60, june(1, 8)); 4];
        let report = evaluate(&trips, &RuleSet::bike_triage());
        assert_eq!(report.total_rows, 4);
        assert!(report.masks.iter().all(|m| m.mask.len() == 4));
        assert!(report.summary.iter().all(|s| s.total_rows == 4));
    }

    #[test]
    fn test_empty_input() {
        let report = evaluate(&[], &RuleSet::bike_hire());
        assert_eq!(report.summary.len(), 6);
        assert!(report.summary.iter().all(|s| s.invalid_pct == 0.0));
        assert!(report.any_mask().is_empty());
    }

    #[test]
    fn test_custom_rule() {
        let rules = RuleSet::new().with_rule(TriageRule::new(
            "Suspiciously short",
            RuleKind::Custom,
            |t| t.duration < 60,
        ));
        let trips = vec![
            make_trip("1", "1", 30, june(1, 8)),
            make_trip("2", "1", 600, june(1, 8)),
        ];
        let report = evaluate(&trips, &rules);
        assert_eq!(report.masks[0].mask, vec![true, false]);
        assert_eq!(rules.names(), vec!["Suspiciously short"]);
    }

    #[test]
    fn test_fault_filter() {
        let trips = vec![
            make_trip("1", "TEST", 600, june(1, 8)),
            make_trip("2", "12", 0, june(1, 9)),
        ];
        let rules = RuleSet::bike_hire();
        let report = evaluate(&trips, &rules);

        assert_eq!(flagged_trips(&trips, &report, None).len(), 2);
        let wanted = ["Duration ≤ 0 OR ≥ 86400"];
        let only_duration = flagged_trips(&trips, &report, Some(&wanted[..]));
        assert_eq!(only_duration.len(), 1);
        assert_eq!(only_duration[0].trip.bike_id.as_str(), "12");
    }

    #[test]
    fn test_bike_triage_report() {
        let trips = vec![
            make_trip("1", "7", 0, june(2, 8)),
            make_trip("2", "7", 100_000, june(3, 8)),
            make_trip("3", "8", 0, june(4, 8)),
            make_trip("4", "9", 600, june(5, 8)),
        ];
        let report = bike_triage_report(&trips, &[], &RuleSet::bike_triage(), None);

        assert_eq!(report.flagged.len(), 3);
        assert_eq!(report.most_flagged_bike.as_deref(), Some("7"));
        assert_eq!(report.bikes[0].issues, 2);
        assert_eq!(report.recent_rides.len(), 2);
        assert_eq!(report.latest_ride.unwrap().trip.rental_id.as_str(), "2");
    }

    #[test]
    fn test_latest_ride_destination() {
        let stations = vec![
            Station::new(2, "Bank", 51.5134, -0.0890, 20),
            Station::new(3, "Waterloo", 51.5036, -0.1143, 30),
        ];
        let trips = vec![
            make_trip("1", "7", 0, june(2, 8)),
            make_trip("2", "7", 0, june(3, 8)),
        ];
        let report = bike_triage_report(&trips, &stations, &RuleSet::bike_triage(), None);
        let destination = report.latest_destination.unwrap();
        assert_eq!(destination.station_id, 2);
        assert_eq!(destination.latitude, 51.5134);
        assert_eq!(destination.longitude, -0.0890);

        // Unusable id falls back to the station name
        let mut renamed = make_trip("3", "7", 0, june(4, 8));
        renamed.end_station_id = RecordId::from("N/A");
        assert_eq!(ride_destination(&renamed, &stations).unwrap().station_id, 2);

        renamed.end_station_name = Some("Nowhere".to_string());
        assert!(ride_destination(&renamed, &stations).is_none());
    }

    #[test]
    fn test_tied_bikes_prefer_lowest_number() {
        let trips = vec![
            make_trip("1", "10", 0, june(2, 8)),
            make_trip("2", "9", 0, june(2, 9)),
        ];
        let report = bike_triage_report(&trips, &[], &RuleSet::bike_triage(), None);

        assert_eq!(report.most_flagged_bike.as_deref(), Some("9"));
        let order: Vec<&str> = report.bikes.iter().map(|b| b.bike_id.as_str()).collect();
        assert_eq!(order, vec!["9", "10"]);
    }

    #[test]
    fn test_bike_triage_report_nothing_flagged() {
        let trips = vec![make_trip("1", "7", 600, june(2, 8))];
        let report = bike_triage_report(&trips, &[], &RuleSet::bike_triage(), None);
        assert!(report.is_empty());
        assert!(report.most_flagged_bike.is_none());
        assert!(report.latest_ride.is_none());
    }

    #[test]
    fn test_bikes_flagged_for_service() {
        let mut trips: Vec<Trip> = (0..3)
            .map(|i| make_trip(&i.to_string(), "5", 0, june(1, 8 + i)))
            .collect();
        trips.push(make_trip("10", "6", 0, june(1, 8)));
        // Bad rental id alone does not count toward service
        trips.push(make_trip("X", "6", 600, june(1, 9)));
        trips.push(make_trip("11", "6", 600, june(1, 10)));

        let flagged = bikes_flagged_for_service(&trips, &RuleSet::bike_hire(), 3);
        assert_eq!(
            flagged,
            vec![BikeIssueCount {
                bike_id: "5".to_string(),
                issues: 3
            }]
        );
    }
}
