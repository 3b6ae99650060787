use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_markdown(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn dry_run_prints_block_json() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "notes.md", "# Notes\n\nHello **world**!\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path()).arg(&input).arg("--dry");

    let output_pred = predicate::str::contains("\"heading_1\"")
        .and(predicate::str::contains("\"paragraph\""))
        .and(predicate::str::contains("\"bold\": true"));

    cmd.assert().success().stdout(output_pred);
}

#[test]
fn dry_run_output_is_valid_json() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "list.md", "1. one\n2. two\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    let output = cmd.current_dir(dir.path()).arg(&input).arg("--dry").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let blocks = value.as_array().unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1]["type"], "numbered_list_item");
}

#[test]
fn unsupported_constructs_are_summarised_on_stderr() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "button.md", "::: button Buy\n:::\n\ntext\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path()).arg(&input).arg("--dry");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"paragraph\""))
        .stderr(predicate::str::contains("`button` blocks are not supported"));
}

#[test]
fn upload_requires_parent_id() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "notes.md", "text\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path()).arg(&input).arg("--token").arg("secret");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--parent-id is required"));
}

#[test]
fn upload_requires_token() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "notes.md", "text\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path())
        .env_remove("NOTION_TOKEN")
        .arg(&input)
        .arg("--parent-id")
        .arg("abc123");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no API token configured"));
}

#[test]
fn invalid_settings_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let input = write_markdown(&dir, "notes.md", "text\n");
    let config = write_markdown(&dir, "bad.toml", "strict = \"sometimes\"\n");

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path())
        .arg(&input)
        .arg("--dry")
        .arg("--config")
        .arg(&config);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid settings file"));
}

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("mdnotion");
    cmd.current_dir(dir.path()).arg("absent.md").arg("--dry");

    cmd.assert().failure().stderr(predicate::str::contains("cannot read"));
}
