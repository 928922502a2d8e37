//! Integration tests for the refstore CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("refstore-cli").unwrap()
}

#[test]
fn test_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--master"))
        .stdout(predicate::str::contains("--source"))
        .stdout(predicate::str::contains("--bib"))
        .stdout(predicate::str::contains("--org"))
        .stdout(predicate::str::contains("--also-repeated"))
        .stdout(predicate::str::contains("--kindle"))
        .stdout(predicate::str::contains("--dedrm"));
}

#[test]
fn test_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("refstore"));
}

#[test]
fn test_master_is_required() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--master"));
}

#[test]
fn test_invalid_doctype() {
    let temp_dir = TempDir::new().unwrap();
    cmd()
        .args([
            "--master",
            temp_dir.path().to_str().unwrap(),
            "--doctype",
            "thesis",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown document type"));
}

#[test]
fn test_batch_over_empty_source_directory() {
    let temp_dir = TempDir::new().unwrap();
    let master = temp_dir.path().join("master");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();

    cmd()
        .args([
            "--master",
            master.to_str().unwrap(),
            "--source",
            source.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No importable books found"));
}

#[test]
fn test_batch_skips_unsupported_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let master = temp_dir.path().join("master");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("notes.txt"), "not a book").unwrap();
    fs::write(source.join("cover.jpg"), "not a book either").unwrap();

    cmd()
        .args([
            "--master",
            master.to_str().unwrap(),
            "--source",
            source.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("No importable books found"));
}

#[test]
fn test_nonexistent_source_directory_fails() {
    let temp_dir = TempDir::new().unwrap();
    cmd()
        .args([
            "--master",
            temp_dir.path().to_str().unwrap(),
            "--source",
            "/no/such/directory",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to list"));
}

#[test]
fn test_nonexistent_book_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let master = temp_dir.path().join("master");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();

    cmd()
        .args([
            "--master",
            master.to_str().unwrap(),
            "--source",
            source.to_str().unwrap(),
            "/no/such/book.epub",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));
}

#[test]
fn test_azw_without_decryptor_options_fails() {
    let temp_dir = TempDir::new().unwrap();
    let master = temp_dir.path().join("master");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("locked.azw"), b"drm bytes").unwrap();

    cmd()
        .args([
            "--master",
            master.to_str().unwrap(),
            "--source",
            source.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to import"));
}

#[test]
fn test_verbose_flag() {
    let temp_dir = TempDir::new().unwrap();
    let master = temp_dir.path().join("master");
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();

    cmd()
        .args([
            "--verbose",
            "--master",
            master.to_str().unwrap(),
            "--source",
            source.to_str().unwrap(),
        ])
        .assert()
        .success();
}
