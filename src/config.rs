//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; everything has a default matching the
//! historical simulation the dashboards run against.

use chrono::NaiveDate;
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Input files ---
    /// Directory holding the trip and station datasets
    pub data_dir: PathBuf,
    /// Trip dataset file name (CSV)
    pub trips_file: String,
    /// Station dataset file name (CSV)
    pub stations_file: String,

    // --- Simulated time ---
    /// Historical day that stands in for "today"
    pub reference_date: NaiveDate,
    /// Timezone the reference day is expressed in
    pub reference_tz: Tz,
    /// Length of the capacity window ending at the selected hour
    pub window_hours: i64,

    // --- Query defaults ---
    pub capacity_threshold: f64,
    pub under_capacity_threshold: f64,
    pub neighbor_count: usize,
    pub min_available_ratio: f64,
    /// Issue count at which a bike is flagged for service
    pub triage_min_issues: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            trips_file: "cycle_hire_2022.csv".to_string(),
            stations_file: "cycle_stations.csv".to_string(),
            reference_date: NaiveDate::from_ymd_opt(2022, 6, 17).unwrap_or_default(),
            reference_tz: chrono_tz::Europe::London,
            window_hours: 3,
            capacity_threshold: 0.75,
            under_capacity_threshold: 0.25,
            neighbor_count: 5,
            min_available_ratio: 0.5,
            triage_min_issues: 3,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            data_dir: env::var("BIKESHARE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            trips_file: env::var("TRIPS_FILE").unwrap_or(defaults.trips_file),
            stations_file: env::var("STATIONS_FILE").unwrap_or(defaults.stations_file),
            reference_date: parse_var("REFERENCE_DATE", defaults.reference_date)?,
            reference_tz: parse_var("REFERENCE_TIMEZONE", defaults.reference_tz)?,
            window_hours: parse_window_hours(defaults.window_hours)?,
            capacity_threshold: parse_var("CAPACITY_THRESHOLD", defaults.capacity_threshold)?,
            under_capacity_threshold: parse_var(
                "UNDER_CAPACITY_THRESHOLD",
                defaults.under_capacity_threshold,
            )?,
            neighbor_count: parse_var("NEIGHBOR_COUNT", defaults.neighbor_count)?,
            min_available_ratio: parse_var("MIN_AVAILABLE_RATIO", defaults.min_available_ratio)?,
            triage_min_issues: parse_var("TRIAGE_MIN_ISSUES", defaults.triage_min_issues)?,
        })
    }

    pub fn trips_path(&self) -> PathBuf {
        self.data_dir.join(&self.trips_file)
    }

    pub fn stations_path(&self) -> PathBuf {
        self.data_dir.join(&self.stations_file)
    }
}

/// Longest capacity window accepted from the environment (one month).
const MAX_WINDOW_HOURS: i64 = 24 * 31;

fn parse_window_hours(default: i64) -> Result<i64, ConfigError> {
    let hours = parse_var("WINDOW_HOURS", default)?;
    if !(1..=MAX_WINDOW_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid {
            var: "WINDOW_HOURS",
            value: hours.to_string(),
        });
    }
    Ok(hours)
}

/// Parse an optional environment variable, keeping the default when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: name,
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
