//! Merging cached snapshots into one

use crate::config::Config;
use crate::coverage::{merge_coverage, CoverageMap, CoverageSnapshot, LineCombiner, SumCombiner};
use crate::merger::store::{load_resultset_file, resultset_files, CacheRead};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// All cached snapshots younger than the merge timeout
pub fn all_results(config: &Config) -> Vec<CoverageSnapshot> {
    all_results_at(config, Utc::now())
}

/// All cached snapshots whose age at `now` is below the merge timeout.
///
/// Each resultset file contributes the first entry it holds. Files that are
/// absent, corrupt, or hold no usable entry are skipped.
pub fn all_results_at(config: &Config, now: DateTime<Utc>) -> Vec<CoverageSnapshot> {
    let timeout = config.merge_timeout_chrono();

    resultset_files(config)
        .into_iter()
        .filter_map(|path| {
            let set = match load_resultset_file(&path) {
                CacheRead::Valid(set) => set,
                CacheRead::Absent => return None,
                CacheRead::Corrupt(reason) => {
                    debug!(path = %path.display(), %reason, "skipping corrupt resultset");
                    return None;
                }
            };

            let snapshot = match CoverageSnapshot::from_resultset(&set) {
                Ok(snapshot) => snapshot,
                Err(reason) => {
                    debug!(path = %path.display(), %reason, "skipping unusable resultset");
                    return None;
                }
            };

            if now.signed_duration_since(snapshot.created_at()) < timeout {
                Some(snapshot)
            } else {
                debug!(
                    path = %path.display(),
                    command = snapshot.command_name(),
                    created_at = %snapshot.created_at(),
                    "skipping stale resultset"
                );
                None
            }
        })
        .collect()
}

/// Merge all fresh cached snapshots, adding hit counts line by line
pub fn merged_result(config: &Config) -> CoverageSnapshot {
    merged_result_with(config, &SumCombiner)
}

/// Merge all fresh cached snapshots with a custom per-line rule
pub fn merged_result_with<C: LineCombiner + ?Sized>(
    config: &Config,
    combiner: &C,
) -> CoverageSnapshot {
    let snapshots = all_results(config);
    let merged = merge_snapshots(&snapshots, combiner);
    info!(
        snapshots = snapshots.len(),
        files = merged.coverage().len(),
        command = merged.command_name(),
        "merged resultsets"
    );
    merged
}

/// Fold snapshots into one.
///
/// The fold runs in a fixed order (command name, then capture time) so the
/// outcome does not depend on the order the snapshots were found in. The
/// merged command name is the sorted list of contributing names joined with
/// `", "`; repeated names are kept.
pub fn merge_snapshots<C: LineCombiner + ?Sized>(
    snapshots: &[CoverageSnapshot],
    combiner: &C,
) -> CoverageSnapshot {
    let mut ordered: Vec<&CoverageSnapshot> = snapshots.iter().collect();
    ordered.sort_by(|a, b| {
        a.command_name()
            .cmp(b.command_name())
            .then_with(|| a.created_at().cmp(&b.created_at()))
    });

    let coverage = ordered.iter().fold(CoverageMap::new(), |merged, snapshot| {
        merge_coverage(snapshot.coverage(), &merged, combiner)
    });

    let command_name = ordered
        .iter()
        .map(|snapshot| snapshot.command_name())
        .collect::<Vec<_>>()
        .join(", ");

    CoverageSnapshot::new(String::new(), coverage).with_command_name(command_name)
}
