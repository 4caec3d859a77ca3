//! Configuration types for covmerge

use crate::error::{CovmergeError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default directory holding the resultset cache files
pub const DEFAULT_COVERAGE_DIR: &str = "coverage";

/// Default age after which a cached snapshot is no longer merged
pub const DEFAULT_MERGE_TIMEOUT: Duration = Duration::from_secs(600);

/// Output format for merged reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable console output
    #[default]
    Console,
    /// JSON output with structured data
    Json,
}

/// Configuration shared by every cache and merge operation
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory containing the `.<command>.resultset.json` files
    pub coverage_dir: PathBuf,

    /// Snapshots at least this old are left out of merges
    pub merge_timeout: Duration,

    /// Output format (console or json)
    pub output_format: OutputFormat,

    /// Path to output file (or "-" for stdout)
    pub output_filename: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coverage_dir: PathBuf::from(DEFAULT_COVERAGE_DIR),
            merge_timeout: DEFAULT_MERGE_TIMEOUT,
            output_format: OutputFormat::Console,
            output_filename: String::from("-"),
        }
    }
}

impl Config {
    /// Build a config rooted at `coverage_dir`, everything else default
    pub fn with_coverage_dir(coverage_dir: impl Into<PathBuf>) -> Self {
        Self {
            coverage_dir: coverage_dir.into(),
            ..Self::default()
        }
    }

    /// Reject settings no operation can work with
    pub fn validate(&self) -> Result<()> {
        if self.coverage_dir.as_os_str().is_empty() {
            return Err(CovmergeError::InvalidConfig(
                "coverage directory must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge timeout as a chrono duration, saturating on overflow
    pub fn merge_timeout_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.merge_timeout).unwrap_or(chrono::Duration::MAX)
    }
}
