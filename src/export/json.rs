//! JSON exporter

use crate::config::Config;
use crate::coverage::{CoverageSnapshot, FileStats, LineHits};
use crate::error::{CovmergeError, Result};
use crate::export::Exporter;
use serde::Serialize;
use std::io::Write;

/// JSON output exporter
pub struct JsonExporter;

#[derive(Serialize)]
struct JsonOutput<'a> {
    command_name: &'a str,
    created_at: String,
    files: Vec<JsonFile<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    path: &'a str,
    relevant_lines: usize,
    covered_lines: usize,
    covered_percent: f64,
    lines: &'a LineHits,
}

#[derive(Serialize)]
struct JsonSummary {
    files: usize,
    relevant_lines: usize,
    covered_lines: usize,
    missed_lines: usize,
    covered_percent: f64,
}

impl Exporter for JsonExporter {
    fn export(
        &self,
        snapshot: &CoverageSnapshot,
        _config: &Config,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let files: Vec<JsonFile> = snapshot
            .coverage()
            .iter()
            .map(|(path, lines)| {
                let stats = FileStats::from_hits(lines);
                JsonFile {
                    path,
                    relevant_lines: stats.relevant_lines,
                    covered_lines: stats.covered_lines,
                    covered_percent: stats.covered_percent(),
                    lines,
                }
            })
            .collect();

        let total = snapshot.total_stats();
        let output = JsonOutput {
            command_name: snapshot.command_name(),
            created_at: snapshot.created_at().to_rfc3339(),
            files,
            summary: JsonSummary {
                files: snapshot.coverage().len(),
                relevant_lines: total.relevant_lines,
                covered_lines: total.covered_lines,
                missed_lines: total.missed_lines(),
                covered_percent: total.covered_percent(),
            },
        };

        let json = serde_json::to_string_pretty(&output)
            .map_err(|e| CovmergeError::Serialize(e.to_string()))?;
        writeln!(writer, "{}", json)?;

        Ok(())
    }
}
