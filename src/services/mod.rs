// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod kpi;
pub mod map;
pub mod occupancy;
pub mod operations;
pub mod rebalance;
pub mod spatial;
pub mod status;
pub mod store;
pub mod triage;

pub use occupancy::{occupancy, Occupancy};
pub use operations::OperationsService;
pub use rebalance::{find_targets, rebalance_plan};
pub use spatial::{haversine_m, Neighbor, SpatialIndex, EARTH_RADIUS_M};
pub use status::{merge_station_status, over_capacity, under_capacity, StatusMerge};
pub use store::{CsvStore, InMemoryStore, Loaded, QuarantinedRow, TripStationStore};
pub use triage::{evaluate, RuleSet, TriageRule};
