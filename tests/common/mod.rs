// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use bikeshare_ops::config::Config;
use bikeshare_ops::services::{CsvStore, OperationsService};
use bikeshare_ops::time_utils::FixedClock;
use chrono::{TimeZone, Utc};
use std::path::PathBuf;

/// Directory holding the committed CSV fixtures.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Default configuration pointed at the fixtures.
#[allow(dead_code)]
pub fn fixture_config() -> Config {
    Config {
        data_dir: fixtures_dir(),
        trips_file: "trips.csv".to_string(),
        stations_file: "stations.csv".to_string(),
        ..Config::default()
    }
}

#[allow(dead_code)]
pub fn fixture_store() -> CsvStore {
    CsvStore::from_config(&fixture_config())
        .expect("Failed to open fixtures - are tests/fixtures committed?")
}

/// Service over the fixtures with the given configuration.
#[allow(dead_code)]
pub fn fixture_service(config: Config) -> OperationsService {
    OperationsService::load(config, &fixture_store()).expect("Failed to load fixtures")
}

/// 09:00 in London (GMT in January): the simulated now is 09:00 BST on the
/// reference day, 08:00 UTC.
#[allow(dead_code)]
pub fn nine_am() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2030, 1, 2, 9, 0, 0).unwrap())
}
