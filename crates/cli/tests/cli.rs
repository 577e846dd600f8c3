use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir) -> PathBuf {
    let db_path = dir.path().join("state.sqlite");
    let content = format!(
        "[general]\nstate_db_path = \"{}\"\n",
        db_path.display().to_string().replace('\\', "/")
    );
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    path
}

#[test]
fn config_init_writes_example_file() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = dir.path().join("config.toml");

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .success();

    let content = fs::read_to_string(&config_path).expect("read config");
    assert!(content.contains("alert_feeds"));
    assert!(content.contains("dry_run = true"));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.args(["config", "init", "--path"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn keywords_add_normalizes_and_lists() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["keywords", "add", "--user", "111", "GMK", "Olivia"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added **gmk olivia** to your keywords."));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["keywords", "add", "--user", "111", "gmk olivia"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already in your keywords"));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["keywords", "list", "--user", "111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your keywords are **gmk olivia**."));
}

#[test]
fn forbidden_words_are_kept_per_user() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["forbidden", "add", "--user", "111", "Artisan"])
        .assert()
        .success();

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["forbidden", "list", "--user", "222"])
        .assert()
        .success()
        .stdout(predicate::str::contains("You have no forbidden words yet."));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["forbidden", "remove", "--user", "222", "artisan"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Couldn't find **artisan**"));
}

#[test]
fn chat_command_aliases_reach_the_same_store() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["command", "--user", "111", "!ak", "GMK", "Olivia"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added **gmk olivia** to your keywords."));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["keywords", "list", "--user", "111"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Your keywords are **gmk olivia**."));

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["command", "--user", "111", "!remove_keyword gmk olivia"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed **gmk olivia**"));
}

#[test]
fn chat_command_rejects_unknown_message() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["command", "--user", "111", "hello", "there"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a recognized command"));
}

#[test]
fn users_register_succeeds_twice() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    for _ in 0..2 {
        let mut cmd = cargo_bin_cmd!("keyword-watch");
        cmd.current_dir(dir.path())
            .arg("--config")
            .arg(&config)
            .args(["users", "register", "--user", "333"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Registered user 333"));
    }
}

#[test]
fn ledger_list_outputs_valid_json() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    let output = cmd
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["ledger", "list", "--json"])
        .output()
        .expect("run ledger list");

    assert!(output.status.success());

    let value: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(value.as_array().map(Vec::len), Some(0));
}

#[test]
fn run_refuses_zero_poll_interval() {
    let dir = TempDir::new().expect("temp dir");
    let config = write_config(&dir);
    let mut content = fs::read_to_string(&config).expect("read config");
    content.push_str("\n[watch]\npoll_interval_secs = 0\n");
    fs::write(&config, content).expect("write config");

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["run", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll_interval_secs must be at least 1"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().expect("temp dir");

    let mut cmd = cargo_bin_cmd!("keyword-watch");
    cmd.current_dir(dir.path())
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["ledger", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
