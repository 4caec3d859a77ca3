//! Resultset cache and merging
//!
//! Every test invocation stores its snapshot in its own resultset file in the
//! coverage directory. The store module reads and writes those files one
//! command at a time; the merge module enumerates all of them and folds the
//! fresh ones into a single snapshot.
//!
//! Nothing here holds state between calls. Writers for different commands
//! never touch the same file. Two writers for the same command race and the
//! last one to write wins; no file locking is applied.

mod merge;
mod store;

pub use merge::{all_results, all_results_at, merge_snapshots, merged_result, merged_result_with};
pub use store::{
    clear_results, load_resultset_file, resultset, resultset_files, resultset_path, store_result,
    stored_data, CacheRead,
};
