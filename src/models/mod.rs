// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod kpi;
pub mod query;
pub mod rebalance;
pub mod station;
pub mod triage;
pub mod trip;

pub use kpi::{ActivitySummary, ActivityTally, KpiSummary, StationSummary};
pub use query::{CapacityQuery, RebalanceQuery};
pub use rebalance::{RebalanceCandidate, RebalanceSuggestion};
pub use station::{CapacityReport, Station, StationRow, StationStatus};
pub use triage::{
    BikeIssueCount, BikeTriageReport, FlaggedTrip, RideDestination, RuleKind, RuleMask,
    RuleSummary, TriageReport,
};
pub use trip::{id_order, IdKey, RecordId, Trip, TripRow};
