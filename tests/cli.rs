use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const TABLE: &str = "+---------+---------+\n| This is | a table |\n";

#[test]
fn test_converts_a_file_to_html() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("doc.md");
    std::fs::write(&path, TABLE).unwrap();

    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg(&path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<table>"))
        .stdout(predicate::str::contains("<td>This is</td>"))
        .stdout(predicate::str::contains("<col style=\"width:50%\" />"));
}

#[test]
fn test_reads_stdin_when_no_path_given() {
    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.write_stdin(TABLE);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<td>a table</td>"));
}

#[test]
fn test_dash_reads_stdin() {
    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("-").write_stdin("# Hi\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<h1>Hi</h1>"));
}

#[test]
fn test_no_grid_tables_flag() {
    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("--no-grid-tables").write_stdin(TABLE);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<table>").not())
        .stdout(predicate::str::contains("<p>"));
}

#[test]
fn test_config_file_disables_tables() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("gridmark.toml");
    std::fs::write(&config, "grid-tables = false\n").unwrap();

    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("--config").arg(&config).write_stdin(TABLE);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("<table>").not());
}

#[test]
fn test_ast_output() {
    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("--ast").write_stdin(TABLE);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"document\""))
        .stdout(predicate::str::contains("\"kind\": \"table\""))
        .stdout(predicate::str::contains("\"colspan\""));
}

#[test]
fn test_missing_file_fails() {
    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("definitely-not-around.md");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Error: failed to read"));
}

#[test]
fn test_unreadable_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("broken.toml");
    std::fs::write(&config, "grid-tables = \"maybe\"\n").unwrap();

    let mut cmd = Command::cargo_bin("gridmark").unwrap();
    cmd.arg("--config").arg(&config).write_stdin(TABLE);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}
