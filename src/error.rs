//! # Error Types
//!
//! Errors surfaced by grid access and configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::GridPoint;

/// Failure to read a cell from a grid accessor.
///
/// Scanners never abort a tick on these; the cell is skipped and the failure is logged.
#[derive(Debug, Error)]
pub enum GridError {
    /// The cell belongs to a region that is not loaded.
    #[error("cell {0:?} is not loaded")]
    Unloaded(GridPoint),

    /// The accessor failed for another reason.
    #[error("grid access failed at {point:?}: {reason}")]
    Access {
        /// The cell that was being read
        point: GridPoint,
        /// Human readable cause
        reason: String,
    },
}

/// Failure to load or validate a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// The file that was being read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid JSON for the expected schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}
