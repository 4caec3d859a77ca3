//! Coverage data model
//!
//! A [`CoverageSnapshot`] is the coverage captured by one test invocation.
//! Per-line data from two snapshots is combined through a [`LineCombiner`],
//! which keeps the merge fold independent of any particular counting rule.

pub mod line;
pub mod snapshot;

pub use line::{merge_coverage, CoverageMap, LineCombiner, LineHits, SumCombiner};
pub use snapshot::{CoverageSnapshot, FileStats, Resultset};
