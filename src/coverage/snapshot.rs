//! Coverage snapshots and their resultset representation

use crate::coverage::{CoverageMap, LineHits};
use crate::error::{CovmergeError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parsed contents of a resultset file: command name -> stored entry.
///
/// Kept as raw JSON so entries this crate did not write survive a rewrite.
pub type Resultset = serde_json::Map<String, Value>;

/// On-disk form of one command's snapshot
#[derive(Debug, Serialize, Deserialize)]
struct ResultsetEntry {
    /// Line hits per source file
    coverage: CoverageMap,
    /// Capture time, unix seconds
    timestamp: i64,
}

/// Coverage captured by one test invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageSnapshot {
    command_name: String,
    created_at: DateTime<Utc>,
    coverage: CoverageMap,
}

impl CoverageSnapshot {
    /// Create a snapshot captured now.
    ///
    /// The timestamp is truncated to whole seconds, the resolution it is
    /// stored with.
    pub fn new(command_name: impl Into<String>, coverage: CoverageMap) -> Self {
        Self {
            command_name: command_name.into(),
            created_at: Utc::now().trunc_subsecs(0),
            coverage,
        }
    }

    /// Replace the capture time
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Replace the command name
    pub fn with_command_name(mut self, command_name: impl Into<String>) -> Self {
        self.command_name = command_name.into();
        self
    }

    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coverage(&self) -> &CoverageMap {
        &self.coverage
    }

    /// Serialize to the value stored under the command name in a resultset
    pub fn to_entry(&self) -> Result<Value> {
        let entry = ResultsetEntry {
            coverage: self.coverage.clone(),
            timestamp: self.created_at.timestamp(),
        };
        serde_json::to_value(entry).map_err(|e| CovmergeError::Serialize(e.to_string()))
    }

    /// Serialize to a single-entry resultset `{command_name: entry}`
    pub fn to_resultset(&self) -> Result<Resultset> {
        let mut set = Resultset::new();
        set.insert(self.command_name.clone(), self.to_entry()?);
        Ok(set)
    }

    /// Rebuild a snapshot from one resultset entry
    pub fn from_entry(command_name: &str, entry: &Value) -> std::result::Result<Self, String> {
        let entry = ResultsetEntry::deserialize(entry).map_err(|e| e.to_string())?;
        let created_at = DateTime::from_timestamp(entry.timestamp, 0)
            .ok_or_else(|| format!("timestamp {} out of range", entry.timestamp))?;

        Ok(Self {
            command_name: command_name.to_string(),
            created_at,
            coverage: entry.coverage,
        })
    }

    /// Rebuild a snapshot from the first entry of a resultset
    pub fn from_resultset(set: &Resultset) -> std::result::Result<Self, String> {
        let (command_name, entry) = set
            .iter()
            .next()
            .ok_or_else(|| "resultset has no entries".to_string())?;
        Self::from_entry(command_name, entry)
    }

    /// Line statistics for every file, in path order
    pub fn file_stats(&self) -> impl Iterator<Item = (&str, FileStats)> + '_ {
        self.coverage
            .iter()
            .map(|(path, hits)| (path.as_str(), FileStats::from_hits(hits)))
    }

    /// Line statistics summed over all files
    pub fn total_stats(&self) -> FileStats {
        self.file_stats()
            .fold(FileStats::default(), |acc, (_, stats)| FileStats {
                relevant_lines: acc.relevant_lines + stats.relevant_lines,
                covered_lines: acc.covered_lines + stats.covered_lines,
            })
    }
}

/// Executable and covered line counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Lines that can be executed
    pub relevant_lines: usize,
    /// Executable lines hit at least once
    pub covered_lines: usize,
}

impl FileStats {
    pub fn from_hits(hits: &LineHits) -> Self {
        let relevant_lines = hits.iter().filter(|h| h.is_some()).count();
        let covered_lines = hits.iter().filter(|h| matches!(h, Some(n) if *n > 0)).count();
        Self {
            relevant_lines,
            covered_lines,
        }
    }

    pub fn missed_lines(&self) -> usize {
        self.relevant_lines - self.covered_lines
    }

    /// Percentage of executable lines covered; 100 when nothing is executable
    pub fn covered_percent(&self) -> f64 {
        if self.relevant_lines == 0 {
            100.0
        } else {
            (self.covered_lines as f64 / self.relevant_lines as f64) * 100.0
        }
    }
}
