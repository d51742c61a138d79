//! Configuration errors
//!
//! Everything here is raised at startup, before the first tick. Steady-state
//! edge cases inside the simulation are silent no-ops, never errors.

use std::path::PathBuf;

use thiserror::Error;

/// A rejected [`crate::Settings`] value.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("seed {seed} does not fit the 32-bit noise generator")]
    InvalidSeed { seed: u64 },
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },
    #[error("{field} range is empty or inverted ({min}..{max})")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} exceeds the limit of {max}")]
    TooLarge { field: &'static str, max: u64 },
    #[error("{table} table is empty")]
    EmptyTable { table: &'static str },
    #[error("{table} table is not strictly monotonic at entry {index}")]
    NonMonotonic { table: &'static str, index: usize },
    #[error("{table} table must start at 0, found {first}")]
    MissingBase { table: &'static str, first: u64 },
    #[error("failed to read settings from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}
