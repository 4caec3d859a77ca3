//! CLI argument parsing using clap

use crate::config::{Config, OutputFormat};
use crate::coverage::CoverageMap;
use crate::error::{CovmergeError, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Merge coverage resultsets cached by independent test runs
#[derive(Parser, Debug)]
#[command(name = "covmerge")]
#[command(version)]
#[command(about = "Cache and merge coverage results from multiple test runs", long_about = None)]
pub struct Cli {
    /// Directory holding the resultset cache files
    #[arg(
        long = "coverage-dir",
        value_name = "DIR",
        env = "COVMERGE_DIR",
        default_value = "coverage",
        global = true
    )]
    pub coverage_dir: PathBuf,

    /// Ignore cached results at least this many seconds old
    #[arg(
        long = "merge-timeout",
        value_name = "SECS",
        env = "COVMERGE_MERGE_TIMEOUT",
        default_value = "600",
        global = true
    )]
    pub merge_timeout: u64,

    /// Log skipped and stale resultsets
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a coverage map as the cached result of a command
    Store {
        /// Name of the test command that produced the coverage
        #[arg(value_name = "COMMAND_NAME")]
        command_name: String,

        /// JSON file mapping source paths to line hits ("-" for stdin)
        #[arg(value_name = "COVERAGE_FILE")]
        coverage_file: String,

        /// Capture time as unix seconds (default: now)
        #[arg(long = "timestamp", value_name = "SECS")]
        timestamp: Option<i64>,
    },

    /// Merge all fresh cached results and print a report
    Merge {
        /// Output in JSON format
        #[arg(long = "json")]
        json: bool,

        /// Output file for the report (use "-" for stdout)
        #[arg(short = 'o', long = "output", value_name = "OUTPUT", default_value = "-")]
        output: String,
    },

    /// List the cached results that would take part in a merge
    List,

    /// Print the stored resultset of a command
    Show {
        #[arg(value_name = "COMMAND_NAME")]
        command_name: String,
    },

    /// Print the resultset file path of a command
    Path {
        #[arg(value_name = "COMMAND_NAME")]
        command_name: String,
    },

    /// Remove all cached resultsets
    Clean,
}

impl Cli {
    /// Build the Config for the parsed arguments
    pub fn to_config(&self) -> Result<Config> {
        let (output_format, output_filename) = match &self.command {
            Command::Merge { json: true, output } => (OutputFormat::Json, output.clone()),
            Command::Merge {
                json: false,
                output,
            } => (OutputFormat::Console, output.clone()),
            _ => (OutputFormat::Console, String::from("-")),
        };

        let config = Config {
            coverage_dir: self.coverage_dir.clone(),
            merge_timeout: Duration::from_secs(self.merge_timeout),
            output_format,
            output_filename,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Load a coverage map (`{"path": [hits or null, ...]}`) from a file or stdin
pub fn load_coverage_file(path: &str) -> Result<CoverageMap> {
    let data = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(path).map_err(|e| CovmergeError::InvalidCoverage {
            path: path.to_string(),
            reason: e.to_string(),
        })?
    };

    serde_json::from_str(&data).map_err(|e| CovmergeError::InvalidCoverage {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
