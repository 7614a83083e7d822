//! Command-line tests: each subcommand run against schema documents in a
//! temporary directory.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, TempDir};

const USERS: &str = r#"{
  "tables": [
    {
      "name": "users",
      "columns": [
        { "name": "id", "logical_type": "Integer", "autoincrement": true },
        { "name": "email", "logical_type": { "String": { "length": 100 } } }
      ],
      "indexes": [{ "name": "primary", "columns": ["id"], "primary": true }]
    }
  ]
}"#;

const USERS_WITH_NICKNAME: &str = r#"{
  "tables": [
    {
      "name": "users",
      "columns": [
        { "name": "id", "logical_type": "Integer", "autoincrement": true },
        { "name": "email", "logical_type": { "String": { "length": 100 } } },
        { "name": "nickname", "logical_type": { "String": { "length": 50 } }, "nullable": true }
      ],
      "indexes": [{ "name": "primary", "columns": ["id"], "primary": true }]
    }
  ]
}"#;

fn sqlsynth_cmd() -> Command {
    let mut cmd = Command::cargo_bin("sqlsynth").expect("Binary not found");
    cmd.env_remove("SQLSYNTH_PLATFORM");
    cmd
}

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

#[test]
fn help_lists_subcommands() {
    sqlsynth_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("drop"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("query"))
        .stdout(predicate::str::contains("platforms"));
}

#[test]
fn platforms_lists_aliases() {
    sqlsynth_cmd()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("sqlserver"))
        .stdout(predicate::str::contains("mssql"))
        .stdout(predicate::str::contains("db2"));
}

#[test]
fn create_prints_statements() {
    let dir = tempdir().expect("Failed to create temp directory");
    let schema = write_file(&dir, "schema.json", USERS);

    sqlsynth_cmd()
        .args(["--platform", "sqlite", "create"])
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATE TABLE users ("))
        .stdout(predicate::str::contains("email VARCHAR(100) NOT NULL"));
}

#[test]
fn platform_is_read_from_the_environment() {
    let dir = tempdir().expect("Failed to create temp directory");
    let schema = write_file(&dir, "schema.json", USERS);

    sqlsynth_cmd()
        .env("SQLSYNTH_PLATFORM", "mysql")
        .arg("create")
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("id INT AUTO_INCREMENT NOT NULL"));
}

#[test]
fn quote_all_quotes_every_identifier() {
    let dir = tempdir().expect("Failed to create temp directory");
    let schema = write_file(&dir, "schema.json", USERS);

    sqlsynth_cmd()
        .args(["--platform", "postgres", "--quote-all", "drop"])
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("DROP TABLE \"users\";"));
}

#[test]
fn diff_prints_the_migration() {
    let dir = tempdir().expect("Failed to create temp directory");
    let from = write_file(&dir, "from.json", USERS);
    let to = write_file(&dir, "to.json", USERS_WITH_NICKNAME);

    sqlsynth_cmd()
        .args(["--platform", "sqlite", "diff", "--from"])
        .arg(&from)
        .arg("--to")
        .arg(&to)
        .assert()
        .success()
        .stdout(predicate::str::diff(
            "ALTER TABLE users ADD COLUMN nickname VARCHAR(50) DEFAULT NULL;\n",
        ));
}

#[test]
fn identical_schemas_print_nothing() {
    let dir = tempdir().expect("Failed to create temp directory");
    let schema = write_file(&dir, "schema.json", USERS);

    sqlsynth_cmd()
        .args(["diff", "--from"])
        .arg(&schema)
        .arg("--to")
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn json_output_carries_diagnostics() {
    let dir = tempdir().expect("Failed to create temp directory");
    let schema = write_file(
        &dir,
        "schema.json",
        r#"{"tables": [{"name": "posts", "columns": [
            {"name": "body", "logical_type": {"String": {"length": 100000}}}
        ]}]}"#,
    );

    sqlsynth_cmd()
        .args(["--platform", "mysql", "--json", "create"])
        .arg(&schema)
        .assert()
        .success()
        .stdout(predicate::str::contains("MEDIUMTEXT"))
        .stdout(predicate::str::contains("ValueRange"));
}

#[test]
fn query_renders_paging() {
    let dir = tempdir().expect("Failed to create temp directory");
    let parts = write_file(
        &dir,
        "query.json",
        r#"{"select": ["id"], "from": [{"table": "users"}], "limit": 10, "offset": 20}"#,
    );

    sqlsynth_cmd()
        .args(["--platform", "mssql", "query"])
        .arg(&parts)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SELECT id FROM users ORDER BY (SELECT 0) OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY;",
        ));
}

#[test]
fn query_inlines_parameters() {
    let dir = tempdir().expect("Failed to create temp directory");
    let parts = write_file(
        &dir,
        "query.json",
        r#"{
            "select": ["id"],
            "from": [{"table": "users"}],
            "where_clause": {"raw": "email = ? AND active = ?"},
            "parameters": [
                {"value": {"text": "o'neil@example.com"}},
                {"value": {"bool": true}}
            ]
        }"#,
    );

    sqlsynth_cmd()
        .args(["--platform", "mysql", "query", "--inline"])
        .arg(&parts)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SELECT id FROM users WHERE email = 'o''neil@example.com' AND active = 1;",
        ));
}

#[test]
fn unknown_platform_is_rejected() {
    sqlsynth_cmd()
        .args(["--platform", "informix", "platforms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown platform 'informix'"));
}

#[test]
fn missing_file_fails() {
    let dir = tempdir().expect("Failed to create temp directory");

    sqlsynth_cmd()
        .arg("create")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}
