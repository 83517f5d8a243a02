// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip and station loading.
//!
//! The store is constructed once by the embedding application and passed to
//! whatever needs data; nothing here keeps process-wide state.

use crate::error::{DataFault, DataFaultKind, OpsError, Result};
use crate::models::{Station, StationRow, Trip, TripRow};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Read-only source of the two datasets.
pub trait TripStationStore {
    fn load_trips(&self) -> Result<Loaded<Trip>>;
    fn load_stations(&self) -> Result<Loaded<Station>>;
}

/// Records that passed schema coercion, plus the rows that did not.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub quarantined: Vec<QuarantinedRow>,
}

impl<T> Loaded<T> {
    pub fn clean(records: Vec<T>) -> Self {
        Self {
            records,
            quarantined: Vec::new(),
        }
    }
}

/// A row rejected at the load boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarantinedRow {
    /// 1-based line in the source file, header included
    pub line: u64,
    pub fault: DataFault,
}

/// CSV files in a data directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    trips_path: PathBuf,
    stations_path: PathBuf,
}

impl CsvStore {
    /// Locate both datasets, failing fast if the directory or either file is absent.
    pub fn open<P: AsRef<Path>>(dir: P, trips_file: &str, stations_file: &str) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(OpsError::MissingResource(dir.to_path_buf()));
        }

        let trips_path = dir.join(trips_file);
        let stations_path = dir.join(stations_file);
        for path in [&trips_path, &stations_path] {
            if !path.is_file() {
                return Err(OpsError::MissingResource(path.clone()));
            }
        }

        Ok(Self {
            trips_path,
            stations_path,
        })
    }

    /// Open the files named by the configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::open(&config.data_dir, &config.trips_file, &config.stations_file)
    }
}

impl TripStationStore for CsvStore {
    fn load_trips(&self) -> Result<Loaded<Trip>> {
        let loaded = read_csv::<TripRow, Trip>(&self.trips_path)?;
        tracing::info!(
            path = %self.trips_path.display(),
            count = loaded.records.len(),
            quarantined = loaded.quarantined.len(),
            "Loaded trips"
        );
        Ok(loaded)
    }

    fn load_stations(&self) -> Result<Loaded<Station>> {
        let loaded = read_csv::<StationRow, Station>(&self.stations_path)?;
        tracing::info!(
            path = %self.stations_path.display(),
            count = loaded.records.len(),
            quarantined = loaded.quarantined.len(),
            "Loaded stations"
        );
        Ok(loaded)
    }
}

/// Deserialize rows of type `R` and coerce them into `T`.
///
/// Rows that fail either step are quarantined; only an unreadable file aborts.
fn read_csv<R, T>(path: &Path) -> Result<Loaded<T>>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = DataFault>,
{
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => OpsError::MissingResource(path.to_path_buf()),
        _ => OpsError::Internal(anyhow::anyhow!("Failed to open {}: {}", path.display(), e)),
    })?;

    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let mut records = Vec::new();
    let mut quarantined = Vec::new();

    for (idx, row) in reader.deserialize::<R>().enumerate() {
        // Header is line 1
        let fallback_line = idx as u64 + 2;
        let outcome = match row {
            Ok(row) => T::try_from(row).map_err(|fault| (fallback_line, fault)),
            Err(err) => {
                if err.is_io_error() {
                    return Err(err.into());
                }
                let line = err.position().map_or(fallback_line, |pos| pos.line());
                Err((
                    line,
                    DataFault::new(
                        DataFaultKind::Schema,
                        format!("line {line}"),
                        err.to_string(),
                    ),
                ))
            }
        };

        match outcome {
            Ok(record) => records.push(record),
            Err((line, fault)) => {
                tracing::warn!(path = %path.display(), line, fault = %fault, "Quarantined row");
                quarantined.push(QuarantinedRow { line, fault });
            }
        }
    }

    Ok(Loaded {
        records,
        quarantined,
    })
}

/// Store over owned records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub trips: Vec<Trip>,
    pub stations: Vec<Station>,
}

impl InMemoryStore {
    pub fn new(trips: Vec<Trip>, stations: Vec<Station>) -> Self {
        Self { trips, stations }
    }
}

impl TripStationStore for InMemoryStore {
    fn load_trips(&self) -> Result<Loaded<Trip>> {
        Ok(Loaded::clean(self.trips.clone()))
    }

    fn load_stations(&self) -> Result<Loaded<Station>> {
        Ok(Loaded::clean(self.stations.clone()))
    }
}
