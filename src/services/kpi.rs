// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Overview KPIs: trip activity per period and the station capacity summary.

use crate::models::{ActivitySummary, ActivityTally, StationStatus, StationSummary, Trip};
use crate::services::status::{over_capacity, under_capacity};
use crate::services::triage::{evaluate, RuleSet};
use crate::time_utils::TimeWindow;

/// How many stations the summary lists at each end of the capacity range.
const TOP_STATIONS: usize = 3;

/// Trips that started inside `window`.
pub fn trips_started_in<'a>(trips: &'a [Trip], window: &TimeWindow) -> Vec<&'a Trip> {
    trips
        .iter()
        .filter(|t| window.contains(t.start_date))
        .collect()
}

/// Fold a period's trips into headline figures, counting triage hits per bike.
pub fn activity_summary(trips: &[Trip], ruleset: &RuleSet) -> ActivitySummary {
    let report = evaluate(trips, ruleset);

    let mut tally = ActivityTally::default();
    for (trip, flagged) in trips.iter().zip(report.any_mask()) {
        tally.record(trip, flagged);
    }
    tally.finish()
}

/// Over/under capacity counts with the three most extreme stations each way.
pub fn station_summary(
    statuses: &[StationStatus],
    over_threshold: f64,
    under_threshold: f64,
) -> StationSummary {
    let over = over_capacity(statuses, over_threshold);
    let under = under_capacity(statuses, under_threshold);

    StationSummary {
        over_capacity: over.len(),
        under_capacity: under.len(),
        top_overloaded: over.into_iter().take(TOP_STATIONS).collect(),
        top_underused: under.into_iter().take(TOP_STATIONS).collect(),
    }
}
