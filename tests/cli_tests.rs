//! CLI integration tests for covmerge

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Get the path to the built binary
fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_covmerge"))
}

/// Run the binary against a coverage directory
fn run(coverage_dir: &Path, args: &[&str]) -> Output {
    Command::new(binary_path())
        .arg("--coverage-dir")
        .arg(coverage_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("COVMERGE_DIR")
        .env_remove("COVMERGE_MERGE_TIMEOUT")
        .output()
        .expect("Failed to run binary")
}

/// Write a raw coverage map and return its path
fn write_coverage(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write coverage file");
    path
}

mod cli_behavior {
    use super::*;

    #[test]
    fn test_help_flag() {
        let output = Command::new(binary_path())
            .arg("--help")
            .output()
            .expect("Failed to run binary");

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Cache and merge coverage results"));
        assert!(stdout.contains("store"));
        assert!(stdout.contains("merge"));
    }

    #[test]
    fn test_path_command() {
        let temp = TempDir::new().unwrap();
        let output = run(temp.path(), &["path", "unit"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(
            stdout.trim(),
            temp.path().join(".unit.resultset.json").display().to_string()
        );
    }

    #[test]
    fn test_store_rejects_invalid_coverage() {
        let temp = TempDir::new().unwrap();
        let input = write_coverage(temp.path(), "bad.json", "not json");
        let cov_dir = temp.path().join("coverage");

        let output = run(&cov_dir, &["store", "unit", input.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid coverage data"), "stderr: {}", stderr);
        assert!(!cov_dir.join(".unit.resultset.json").exists());
    }

    #[test]
    fn test_store_fails_on_unwritable_dir() {
        let temp = TempDir::new().unwrap();
        let input = write_coverage(temp.path(), "cov.json", r#"{"a.rb": [1]}"#);
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let output = run(&blocker, &["store", "unit", input.to_str().unwrap()]);

        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Cannot store resultset"), "stderr: {}", stderr);
    }
}

mod store_and_merge {
    use super::*;

    #[test]
    fn test_store_then_merge_json() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let unit = write_coverage(temp.path(), "unit.json", r#"{"a.rb": [1, null, 0]}"#);
        let integration =
            write_coverage(temp.path(), "integration.json", r#"{"a.rb": [0, null, 2]}"#);

        let out1 = run(&cov_dir, &["store", "unit", unit.to_str().unwrap()]);
        assert!(out1.status.success());
        let out2 = run(
            &cov_dir,
            &["store", "integration", integration.to_str().unwrap()],
        );
        assert!(out2.status.success());

        assert!(cov_dir.join(".unit.resultset.json").exists());
        assert!(cov_dir.join(".integration.resultset.json").exists());

        let output = run(&cov_dir, &["merge", "--json"]);
        assert!(output.status.success());

        let stdout = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value =
            serde_json::from_str(&stdout).expect("Output should be valid JSON");
        assert_eq!(json["command_name"], "integration, unit");
        assert_eq!(json["files"][0]["path"], "a.rb");
        assert_eq!(json["files"][0]["lines"], serde_json::json!([1, null, 2]));
        assert_eq!(json["summary"]["covered_lines"], 2);
    }

    #[test]
    fn test_merge_console_output() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let input = write_coverage(temp.path(), "cov.json", r#"{"lib/x.rb": [1, 0]}"#);

        run(&cov_dir, &["store", "rspec", input.to_str().unwrap()]);
        let output = run(&cov_dir, &["merge"]);

        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Coverage for rspec"));
        assert!(stdout.contains("lib/x.rb"));
        assert!(stdout.contains("Coverage: 50.00%"));
    }

    #[test]
    fn test_merge_to_output_file() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let input = write_coverage(temp.path(), "cov.json", r#"{"a.rb": [3]}"#);
        let report = temp.path().join("report.json");

        run(&cov_dir, &["store", "unit", input.to_str().unwrap()]);
        let output = run(
            &cov_dir,
            &["merge", "--json", "-o", report.to_str().unwrap()],
        );

        assert!(output.status.success());
        let content = fs::read_to_string(&report).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["command_name"], "unit");
    }

    #[test]
    fn test_merge_with_no_results() {
        let temp = TempDir::new().unwrap();
        let output = run(&temp.path().join("empty"), &["merge", "--json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
        assert_eq!(json["command_name"], "");
        assert_eq!(json["summary"]["files"], 0);
    }

    #[test]
    fn test_stale_result_is_listed_out() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let input = write_coverage(temp.path(), "cov.json", r#"{"a.rb": [1]}"#);

        run(
            &cov_dir,
            &["store", "old", input.to_str().unwrap(), "--timestamp", "1000"],
        );
        run(&cov_dir, &["store", "new", input.to_str().unwrap()]);

        let output = run(&cov_dir, &["list"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("new\t"));
        assert!(!stdout.contains("old\t"));

        let verbose = run(&cov_dir, &["merge", "-v"]);
        let stderr = String::from_utf8_lossy(&verbose.stderr);
        assert!(stderr.contains("skipping stale resultset"), "stderr: {}", stderr);
    }

    #[test]
    fn test_show_and_clean() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let input = write_coverage(temp.path(), "cov.json", r#"{"a.rb": [1]}"#);

        run(&cov_dir, &["store", "unit", input.to_str().unwrap()]);

        let shown = run(&cov_dir, &["show", "unit"]);
        assert!(shown.status.success());
        let json: serde_json::Value =
            serde_json::from_str(&String::from_utf8_lossy(&shown.stdout)).unwrap();
        assert_eq!(json["unit"]["coverage"]["a.rb"], serde_json::json!([1]));

        let cleaned = run(&cov_dir, &["clean"]);
        assert!(cleaned.status.success());
        assert!(!cov_dir.join(".unit.resultset.json").exists());

        let empty = run(&cov_dir, &["show", "unit"]);
        assert_eq!(String::from_utf8_lossy(&empty.stdout).trim(), "{}");
    }

    #[test]
    fn test_truncated_resultset_does_not_break_merge() {
        let temp = TempDir::new().unwrap();
        let cov_dir = temp.path().join("coverage");
        let input = write_coverage(temp.path(), "cov.json", r#"{"a.rb": [1]}"#);

        run(&cov_dir, &["store", "unit", input.to_str().unwrap()]);
        fs::write(cov_dir.join(".x.resultset.json"), "{").unwrap();
        fs::write(cov_dir.join(".y.resultset.json"), "{\"y\": {\"cov").unwrap();

        let output = run(&cov_dir, &["merge", "--json"]);

        assert!(output.status.success());
        let json: serde_json::Value =
            serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
        assert_eq!(json["command_name"], "unit");
    }
}
