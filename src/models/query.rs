//! Query parameters accepted from the presentation layer.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::config::Config;
use crate::error::Result;

/// NaN passes every range comparison, so it needs its own check.
fn finite(value: f64) -> std::result::Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("not_finite"))
    }
}

/// Threshold for the over/under capacity views.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct CapacityQuery {
    #[validate(range(min = 0.0, max = 1.0), custom(function = "finite"))]
    pub threshold: f64,
}

impl CapacityQuery {
    pub fn new(threshold: f64) -> Result<Self> {
        let query = Self { threshold };
        query.validate()?;
        Ok(query)
    }
}

/// Where to move bikes from, and how picky to be about targets.
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct RebalanceQuery {
    pub origin_station_id: u64,
    #[validate(range(min = 1, max = 500))]
    pub k: usize,
    #[validate(range(min = 0.0, max = 1.0), custom(function = "finite"))]
    pub min_available_ratio: f64,
}

impl RebalanceQuery {
    pub fn new(origin_station_id: u64, k: usize, min_available_ratio: f64) -> Result<Self> {
        let query = Self {
            origin_station_id,
            k,
            min_available_ratio,
        };
        query.validate()?;
        Ok(query)
    }

    /// Query using the configured neighbor count and availability ratio.
    pub fn with_defaults(origin_station_id: u64, config: &Config) -> Result<Self> {
        Self::new(
            origin_station_id,
            config.neighbor_count,
            config.min_available_ratio,
        )
    }
}
