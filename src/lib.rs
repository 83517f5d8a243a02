// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Bikeshare-Ops: station capacity and fleet health for a bike-share network
//!
//! This crate loads trip and station data, measures how full each docking
//! station is over a time window, suggests nearby stations to move bikes to,
//! and flags rides whose records point at faulty bikes or bad data.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;
pub mod time_utils;

pub use error::{OpsError, Result};
pub use services::OperationsService;
