//! covmerge - Cache and merge coverage results from multiple test runs

use chrono::DateTime;
use clap::Parser;
use covmerge::cli::{load_coverage_file, Cli, Command};
use covmerge::export::{create_exporter, get_output_writer};
use covmerge::merger::{self, clear_results};
use covmerge::{Config, CoverageSnapshot, CovmergeError, Result};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Convert to config
    let config = match cli.to_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let outcome = match cli.command {
        Command::Store {
            command_name,
            coverage_file,
            timestamp,
        } => run_store(&config, &command_name, &coverage_file, timestamp),
        Command::Merge { .. } => run_merge(&config),
        Command::List => run_list(&config),
        Command::Show { command_name } => run_show(&config, &command_name),
        Command::Path { command_name } => {
            println!("{}", merger::resultset_path(&config, &command_name).display());
            Ok(())
        }
        Command::Clean => clear_results(&config).map(|removed| {
            eprintln!("Removed {} resultset file(s)", removed);
        }),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

/// Send logs to stderr; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let default = if verbose { "covmerge=debug" } else { "covmerge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run_store(
    config: &Config,
    command_name: &str,
    coverage_file: &str,
    timestamp: Option<i64>,
) -> Result<()> {
    let coverage = load_coverage_file(coverage_file)?;
    let mut snapshot = CoverageSnapshot::new(command_name, coverage);
    if let Some(secs) = timestamp {
        let created_at = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            CovmergeError::InvalidConfig(format!("timestamp {} out of range", secs))
        })?;
        snapshot = snapshot.with_created_at(created_at);
    }
    merger::store_result(config, &snapshot)
}

fn run_merge(config: &Config) -> Result<()> {
    let merged = merger::merged_result(config);

    let exporter = create_exporter(config.output_format);
    let mut writer = get_output_writer(&config.output_filename)?;
    exporter.export(&merged, config, &mut *writer)?;
    writer.flush()?;
    Ok(())
}

fn run_list(config: &Config) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for snapshot in merger::all_results(config) {
        writeln!(
            stdout,
            "{}\t{}\t{} file(s)",
            snapshot.command_name(),
            snapshot.created_at().to_rfc3339(),
            snapshot.coverage().len()
        )?;
    }
    Ok(())
}

fn run_show(config: &Config, command_name: &str) -> Result<()> {
    let set = merger::resultset(config, command_name);
    let json = serde_json::to_string_pretty(&set)
        .map_err(|e| CovmergeError::Serialize(e.to_string()))?;
    println!("{}", json);
    Ok(())
}
