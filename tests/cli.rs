use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PASSPHRASE: &str = "open sesame";

fn keycask(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("keycask").unwrap();
    cmd.env("KEYCASK_DATA_DIR", data_dir)
        .env_remove("KEYCASK_FILE")
        .env_remove("KEYCASK_PASSPHRASE")
        .env_remove("KEYCASK_NEW_PASSPHRASE")
        .env_remove("RUST_LOG");
    cmd
}

fn unlocked(data_dir: &Path) -> Command {
    let mut cmd = keycask(data_dir);
    cmd.env("KEYCASK_PASSPHRASE", PASSPHRASE);
    cmd
}

fn init_with_duff_beer(data_dir: &Path) {
    unlocked(data_dir).arg("init").assert().success();
    unlocked(data_dir)
        .args([
            "add",
            "Duff Beer Webshop",
            "--url",
            "http://duffbeer.com",
            "--user",
            "homer",
            "--notes",
            "Don't tell Marge",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry: Duff Beer Webshop"));
}

#[test]
fn generate_prints_password_of_requested_length() {
    let dir = TempDir::new().unwrap();
    let output = keycask(dir.path())
        .args(["generate", "--length", "20"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let password = String::from_utf8(output).unwrap();
    let password = password.trim_end();
    assert_eq!(password.chars().count(), 20);
    assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn generate_rejects_out_of_range_length() {
    let dir = TempDir::new().unwrap();
    keycask(dir.path())
        .args(["generate", "--length", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Password length"));
}

#[test]
fn config_shows_paths() {
    let dir = TempDir::new().unwrap();
    keycask(dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("vault.kcask"))
        .stdout(predicate::str::contains("Compression level: 6"));
}

#[test]
fn missing_document_suggests_init() {
    let dir = TempDir::new().unwrap();
    unlocked(dir.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("keycask init"));
}

#[test]
fn init_add_list_show() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());
    assert!(dir.path().join("vault.kcask").exists());

    unlocked(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duff Beer Webshop"))
        .stdout(predicate::str::contains("homer"));

    unlocked(dir.path())
        .args(["list", "--search", "kwik"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries found."));

    unlocked(dir.path())
        .args(["show", "duff beer webshop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Don't tell Marge"))
        .stdout(predicate::str::contains("http://duffbeer.com"));
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    unlocked(dir.path()).arg("init").assert().success();
    unlocked(dir.path()).arg("init").assert().failure();
}

#[test]
fn init_rejects_short_passphrase() {
    let dir = TempDir::new().unwrap();
    keycask(dir.path())
        .env("KEYCASK_PASSPHRASE", "doh")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8 characters"));
}

#[test]
fn wrong_passphrase_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());

    keycask(dir.path())
        .env("KEYCASK_PASSPHRASE", "open sesame!")
        .arg("list")
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("Incorrect password")
                .or(predicate::str::contains("Could not process document")),
        );
}

#[test]
fn edit_generate_and_reveal() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());

    unlocked(dir.path())
        .args(["edit", "Duff Beer Webshop", "--generate", "--user", "bart"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated password:"));

    unlocked(dir.path())
        .args(["show", "Duff Beer Webshop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bart"))
        .stdout(predicate::str::contains("********"));

    unlocked(dir.path())
        .args(["show", "Duff Beer Webshop", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("********").not());
}

#[test]
fn duplicate_and_delete() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());

    unlocked(dir.path())
        .args(["duplicate", "Duff Beer Webshop", "Duff Beer Outlet"])
        .assert()
        .success();
    unlocked(dir.path())
        .args(["delete", "Duff Beer Webshop"])
        .assert()
        .success();

    unlocked(dir.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duff Beer Outlet"))
        .stdout(predicate::str::contains("Duff Beer Webshop").not());
}

#[test]
fn passwd_changes_passphrase() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());

    unlocked(dir.path())
        .env("KEYCASK_NEW_PASSPHRASE", "correct horse")
        .arg("passwd")
        .assert()
        .success();

    unlocked(dir.path()).arg("list").assert().failure();
    keycask(dir.path())
        .env("KEYCASK_PASSPHRASE", "correct horse")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duff Beer Webshop"));
}

#[test]
fn export_then_import_into_new_document() {
    let dir = TempDir::new().unwrap();
    init_with_duff_beer(dir.path());
    let export = dir.path().join("export.json.gz");
    let other = dir.path().join("other.kcask");

    unlocked(dir.path())
        .arg("export")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT encrypted"));

    unlocked(dir.path())
        .arg("--file")
        .arg(&other)
        .arg("init")
        .assert()
        .success();
    unlocked(dir.path())
        .arg("--file")
        .arg(&other)
        .arg("import")
        .arg(&export)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 entries"));

    unlocked(dir.path())
        .arg("--file")
        .arg(&other)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Duff Beer Webshop"));
}

#[test]
fn passphrase_is_not_accepted_as_argument() {
    let dir = TempDir::new().unwrap();
    unlocked(dir.path()).arg("init").assert().success();

    keycask(dir.path())
        .args(["--passphrase", PASSPHRASE, "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
    keycask(dir.path())
        .args(["--new-passphrase", "correct horse", "passwd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}
