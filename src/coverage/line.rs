//! Per-line coverage data and the rules for combining it

use std::collections::BTreeMap;

/// Hit counts for each line of one source file.
///
/// `None` marks a line that is not executable (comments, blank lines),
/// `Some(n)` an executable line that ran `n` times.
pub type LineHits = Vec<Option<u64>>;

/// Coverage for a set of source files, keyed by path
pub type CoverageMap = BTreeMap<String, LineHits>;

/// Combines the line data two snapshots recorded for the same file.
///
/// Implementations must be commutative and associative; the merge result
/// only depends on the set of snapshots if they are.
pub trait LineCombiner {
    fn combine(&self, left: &LineHits, right: &LineHits) -> LineHits;
}

/// Adds hit counts line by line.
///
/// A line stays non-executable only if it is non-executable on both sides;
/// otherwise a missing count is taken as zero. The shorter array is padded
/// with non-executable lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumCombiner;

impl LineCombiner for SumCombiner {
    fn combine(&self, left: &LineHits, right: &LineHits) -> LineHits {
        let len = left.len().max(right.len());
        (0..len)
            .map(|i| {
                let l = left.get(i).copied().flatten();
                let r = right.get(i).copied().flatten();
                match (l, r) {
                    (None, None) => None,
                    (l, r) => Some(l.unwrap_or(0).saturating_add(r.unwrap_or(0))),
                }
            })
            .collect()
    }
}

/// Union of two coverage maps.
///
/// Files present on one side are copied as they are, files present on both
/// sides go through `combiner`.
pub fn merge_coverage<C: LineCombiner + ?Sized>(
    left: &CoverageMap,
    right: &CoverageMap,
    combiner: &C,
) -> CoverageMap {
    let mut merged = right.clone();
    for (path, hits) in left {
        let combined = match right.get(path) {
            Some(other) => combiner.combine(hits, other),
            None => hits.clone(),
        };
        merged.insert(path.clone(), combined);
    }
    merged
}
