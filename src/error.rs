// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types shared by the loaders and the query services.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Library error type.
///
/// `MissingResource` is fatal for a computation cycle. `Lookup`,
/// `InvalidParameter` and `DataFault` describe a bad request or a bad record
/// and can be reported back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum OpsError {
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("Station not found: {0}")]
    Lookup(u64),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Data fault: {0}")]
    DataFault(DataFault),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl OpsError {
    /// Whether the caller can recover by fixing its request or skipping a record.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OpsError::Lookup(_) | OpsError::InvalidParameter(_) | OpsError::DataFault(_)
        )
    }
}

impl From<validator::ValidationErrors> for OpsError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OpsError::InvalidParameter(errors.to_string())
    }
}

impl From<csv::Error> for OpsError {
    fn from(err: csv::Error) -> Self {
        OpsError::Parse(err.to_string())
    }
}

/// Category of a per-record data problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFaultKind {
    /// Row could not be deserialized at all
    Schema,
    ZeroDocks,
    NonNumericId,
    BadTimestamp,
    BadDuration,
    BadCoordinates,
    NegativeDocks,
}

/// A malformed record, recorded rather than raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFault {
    pub kind: DataFaultKind,
    /// Identifier or row reference of the offending record
    pub record: String,
    pub detail: String,
}

impl DataFault {
    pub fn new(kind: DataFaultKind, record: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            record: record.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DataFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} in {}: {}", self.kind, self.record, self.detail)
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, OpsError>;
