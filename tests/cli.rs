//! Integration tests for CLI commands.
use std::fs;
use tempfile::tempdir;

mod common;
use common::{assert_elci_fails, assert_elci_runs, get_elci_stdout, write_model};

/// Test the `run` command
#[test]
fn check_run_command() {
    let model_dir = tempdir().unwrap();
    write_model(model_dir.path());

    // Save results to non-existent directory to check that directory creation works
    let tempdir = tempdir().unwrap();
    let output_dir = tempdir.path().join("results");
    assert_elci_runs(&[
        "run",
        &model_dir.path().to_string_lossy(),
        "--output-dir",
        &output_dir.to_string_lossy(),
        "--flow-lists",
    ]);

    let archives = fs::read_dir(&output_dir)
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .unwrap()
                .path()
                .extension()
                .is_some_and(|ext| ext == "zip")
        })
        .count();
    assert_eq!(archives, 1);
    assert!(output_dir.join("flowmapping_lists_upstream.txt").exists());
    assert!(output_dir.join("elci_info.log").exists());
}

/// Running into a non-empty output folder needs `--overwrite`
#[test]
fn check_run_command_overwrite() {
    let model_dir = tempdir().unwrap();
    write_model(model_dir.path());
    let output_dir = tempdir().unwrap();
    fs::write(output_dir.path().join("old.txt"), "old results").unwrap();
    let model_path = model_dir.path().to_string_lossy().into_owned();
    let output_path = output_dir.path().to_string_lossy().into_owned();
    let mut args = vec!["run", model_path.as_str(), "--output-dir", output_path.as_str()];

    assert_elci_fails(&args);
    args.push("--overwrite");
    assert_elci_runs(&args);
    assert!(!output_dir.path().join("old.txt").exists());
}

/// Test the `validate` command
#[test]
fn check_validate_command() {
    let model_dir = tempdir().unwrap();
    write_model(model_dir.path());
    assert_elci_runs(&["validate", &model_dir.path().to_string_lossy()]);
}

#[test]
fn check_validate_command_missing_file() {
    let model_dir = tempdir().unwrap();
    write_model(model_dir.path());
    fs::remove_file(model_dir.path().join("flow_mapping.csv")).unwrap();
    assert_elci_fails(&["validate", &model_dir.path().to_string_lossy()]);
}

/// Test the `settings show-default` command
#[test]
fn check_settings_show_default_command() {
    let stdout = get_elci_stdout(&["settings", "show-default"]);
    assert!(stdout.contains("# log_level = \"info\""));
    assert!(stdout.contains("# write_flow_lists = false"));
}

/// Test the `settings show-path` command
#[test]
fn check_settings_show_path_command() {
    let stdout = get_elci_stdout(&["settings", "show-path"]);
    assert!(stdout.trim_end().ends_with("settings.toml"));
}
