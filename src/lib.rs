//! covmerge - Coverage resultset cache and merger
//!
//! Test processes running in parallel, or one after another under different
//! command names, each store their coverage in a per-command resultset file.
//! covmerge reads those files back, drops stale and damaged ones, and folds
//! the rest into a single coverage snapshot.

pub mod cli;
pub mod config;
pub mod coverage;
pub mod error;
pub mod export;
pub mod merger;

pub use config::{Config, OutputFormat};
pub use coverage::{CoverageMap, CoverageSnapshot, LineCombiner, LineHits, SumCombiner};
pub use error::{CovmergeError, Result};
pub use merger::{all_results, merged_result, resultset, resultset_path, store_result, stored_data};
