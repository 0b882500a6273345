//! End-to-end tests for the `cmgen` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_cmgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cmgen"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run cmgen")
}

fn output_text(output: &Output) -> String {
    format!(
        "{}\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

fn create_project(root: &Path) {
    fs::create_dir_all(root.join("Hello")).unwrap();
    fs::write(
        root.join("project.toml"),
        "name = \"Hello\"\n\n[modules]\npublic = [\"Hello\"]\n",
    )
    .unwrap();
    fs::write(
        root.join("Hello/module.toml"),
        "kind = \"executable\"\n\n[sources]\nprivate = [\"main.cpp\"]\n",
    )
    .unwrap();
    fs::write(root.join("Hello/main.cpp"), "int main() { return 0; }\n").unwrap();
}

#[test]
fn test_generate_then_clean() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path());

    let output = run_cmgen(dir.path(), &["generate", "."]);
    assert!(output.status.success(), "{}", output_text(&output));
    assert!(dir.path().join("CMakeLists.txt").exists());
    assert!(dir.path().join("CMakePresets.json").exists());

    let output = run_cmgen(dir.path(), &["clean", "."]);
    assert!(output.status.success(), "{}", output_text(&output));
    assert!(output_text(&output).contains("Clean complete."));
    assert!(!dir.path().join("CMakeLists.txt").exists());
    assert!(dir.path().join("project.toml").exists());
}

#[test]
fn test_info_lists_modules() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path());

    let output = run_cmgen(dir.path(), &["info"]);
    assert!(output.status.success(), "{}", output_text(&output));
    let text = output_text(&output);
    assert!(text.contains("Hello"));
    assert!(text.contains("Executable"));
}

#[test]
fn test_unknown_command_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path());

    let output = run_cmgen(dir.path(), &["frobnicate", "."]);
    assert!(!output.status.success());
    assert!(!dir.path().join("CMakeLists.txt").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_missing_definition_reports_error() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cmgen(dir.path(), &["generate", "."]);
    assert!(!output.status.success());
    assert!(output_text(&output).contains("Failed to load project"));
}
