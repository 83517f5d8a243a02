// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Structured JSON logging.

use crate::error::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a JSON subscriber filtered by `RUST_LOG` plus crate defaults.
///
/// Returns `false` when a global subscriber was already installed, so
/// embedding applications and tests can call this more than once.
pub fn init_logging() -> Result<bool> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = EnvFilter::from_default_env()
        .add_directive("bikeshare_ops=debug".parse().map_err(anyhow::Error::from)?)
        .add_directive("info".parse().map_err(anyhow::Error::from)?);

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .try_init()
        .is_ok())
}
