//! Console (human-readable) exporter

use crate::config::Config;
use crate::coverage::CoverageSnapshot;
use crate::error::Result;
use crate::export::Exporter;
use std::io::Write;

/// Human-readable console output exporter
pub struct ConsoleExporter;

impl Exporter for ConsoleExporter {
    fn export(
        &self,
        snapshot: &CoverageSnapshot,
        config: &Config,
        writer: &mut dyn Write,
    ) -> Result<()> {
        let name = if snapshot.command_name().is_empty() {
            "(no cached results)"
        } else {
            snapshot.command_name()
        };
        writeln!(writer, "Coverage for {}", name)?;
        writeln!(writer)?;

        let width = snapshot
            .coverage()
            .keys()
            .map(|path| path.len())
            .max()
            .unwrap_or(0);

        for (path, stats) in snapshot.file_stats() {
            writeln!(
                writer,
                "  {:<width$}  {:>6}/{:<6} {:>6.2}%",
                path,
                stats.covered_lines,
                stats.relevant_lines,
                stats.covered_percent(),
                width = width
            )?;
        }
        if !snapshot.coverage().is_empty() {
            writeln!(writer)?;
        }

        let total = snapshot.total_stats();
        writeln!(writer, "Summary:")?;
        writeln!(writer, "  Coverage directory: {}", config.coverage_dir.display())?;
        writeln!(writer, "  Files: {}", snapshot.coverage().len())?;
        writeln!(writer, "  Relevant lines: {}", total.relevant_lines)?;
        writeln!(writer, "  Covered lines: {}", total.covered_lines)?;
        writeln!(writer, "  Missed lines: {}", total.missed_lines())?;
        writeln!(writer, "  Coverage: {:.2}%", total.covered_percent())?;

        Ok(())
    }
}
