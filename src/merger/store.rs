//! Resultset file storage
//!
//! One file per command name: `<coverage_dir>/.<command>.resultset.json`.
//! Reads never fail; a missing, short, unreadable or unparseable file reads
//! as an empty resultset. Writes report every failure.

use crate::config::Config;
use crate::coverage::{CoverageSnapshot, Resultset};
use crate::error::{CovmergeError, Result};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name prefix shared by all resultset files
const RESULTSET_PREFIX: &str = ".";

/// File name suffix shared by all resultset files
const RESULTSET_SUFFIX: &str = ".resultset.json";

/// Shortest content that can hold a JSON object (`{}`)
const MIN_DATA_CHARS: usize = 2;

/// Outcome of reading one resultset file
#[derive(Debug)]
pub enum CacheRead {
    /// Missing, unreadable, or shorter than two characters
    Absent,
    /// Long enough but not a JSON object
    Corrupt(String),
    /// Parsed resultset
    Valid(Resultset),
}

impl CacheRead {
    /// The parsed resultset, or an empty one for absent and corrupt files
    pub fn into_resultset(self) -> Resultset {
        match self {
            CacheRead::Valid(set) => set,
            CacheRead::Absent | CacheRead::Corrupt(_) => Resultset::new(),
        }
    }
}

/// Path of the resultset file for `command_name`.
///
/// Characters that would leave the coverage directory or confuse the
/// mapping are percent-encoded, so distinct names never share a file.
pub fn resultset_path(config: &Config, command_name: &str) -> PathBuf {
    config.coverage_dir.join(format!(
        "{}{}{}",
        RESULTSET_PREFIX,
        encode_command_name(command_name),
        RESULTSET_SUFFIX
    ))
}

fn encode_command_name(command_name: &str) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '/' | '\\' | '%' | ':') || c.is_control();
    if !command_name.chars().any(needs_escape) {
        return Cow::Borrowed(command_name);
    }

    let mut encoded = String::with_capacity(command_name.len() + 8);
    for c in command_name.chars() {
        if needs_escape(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(encoded, "%{:02X}", byte);
            }
        } else {
            encoded.push(c);
        }
    }
    Cow::Owned(encoded)
}

/// Whether a file name follows the `.<command>.resultset.json` pattern
fn is_resultset_file_name(name: &str) -> bool {
    name.len() >= RESULTSET_PREFIX.len() + RESULTSET_SUFFIX.len()
        && name.starts_with(RESULTSET_PREFIX)
        && name.ends_with(RESULTSET_SUFFIX)
}

/// Read a file, keeping its contents only when they are at least two characters long
fn read_valid_data(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(data) if data.chars().take(MIN_DATA_CHARS).count() >= MIN_DATA_CHARS => Some(data),
        Ok(_) => {
            debug!(path = %path.display(), "resultset too short, treating as absent");
            None
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read resultset, treating as absent");
            None
        }
    }
}

/// Read and parse one resultset file
pub fn load_resultset_file(path: &Path) -> CacheRead {
    let Some(data) = read_valid_data(path) else {
        return CacheRead::Absent;
    };

    match serde_json::from_str::<Resultset>(&data) {
        Ok(set) => CacheRead::Valid(set),
        Err(e) => CacheRead::Corrupt(e.to_string()),
    }
}

/// Raw contents of the resultset file for `command_name`, if usable
pub fn stored_data(config: &Config, command_name: &str) -> Option<String> {
    read_valid_data(&resultset_path(config, command_name))
}

/// Parsed resultset for `command_name`; empty when absent or corrupt
pub fn resultset(config: &Config, command_name: &str) -> Resultset {
    let path = resultset_path(config, command_name);
    match load_resultset_file(&path) {
        CacheRead::Corrupt(reason) => {
            debug!(path = %path.display(), %reason, "corrupt resultset, treating as absent");
            Resultset::new()
        }
        read => read.into_resultset(),
    }
}

/// Every resultset file in the coverage directory, sorted by path.
///
/// An unreadable or missing directory yields no files.
pub fn resultset_files(config: &Config) -> Vec<PathBuf> {
    let entries = match fs::read_dir(&config.coverage_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(
                dir = %config.coverage_dir.display(),
                error = %e,
                "cannot list coverage directory"
            );
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, is_resultset_file_name)
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

/// Store `snapshot` in the resultset file of its command.
///
/// Entries for other commands already in the file are kept. The
/// read-modify-write is not atomic: a concurrent writer for the same
/// command can overwrite this update.
pub fn store_result(config: &Config, snapshot: &CoverageSnapshot) -> Result<()> {
    let command_name = snapshot.command_name();
    let path = resultset_path(config, command_name);

    let mut set = resultset(config, command_name);
    set.insert(command_name.to_string(), snapshot.to_entry()?);

    let mut json =
        serde_json::to_string(&set).map_err(|e| CovmergeError::Serialize(e.to_string()))?;
    json.push('\n');

    fs::create_dir_all(&config.coverage_dir).map_err(|e| CovmergeError::StoreFailed {
        path: path.display().to_string(),
        reason: format!(
            "cannot create coverage directory '{}': {}",
            config.coverage_dir.display(),
            e
        ),
    })?;

    fs::write(&path, json).map_err(|e| CovmergeError::StoreFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    info!(command = command_name, path = %path.display(), "stored resultset");
    Ok(())
}

/// Remove every resultset file from the coverage directory.
///
/// Returns how many files were removed.
pub fn clear_results(config: &Config) -> Result<usize> {
    let dir = &config.coverage_dir;
    if !dir.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(|e| {
        CovmergeError::ClearFailed(format!(
            "Failed to read coverage directory '{}': {}",
            dir.display(),
            e
        ))
    })? {
        let entry = entry.map_err(|e| {
            CovmergeError::ClearFailed(format!("Failed to read directory entry: {}", e))
        })?;

        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .map_or(false, is_resultset_file_name);
        if matches && path.is_file() {
            fs::remove_file(&path).map_err(|e| {
                CovmergeError::ClearFailed(format!(
                    "Failed to remove resultset '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            removed += 1;
        }
    }

    info!(dir = %dir.display(), removed, "cleared resultsets");
    Ok(removed)
}
