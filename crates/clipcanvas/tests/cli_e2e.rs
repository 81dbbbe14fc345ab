#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn clipcanvas(data: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("clipcanvas"));
    cmd.env("CLIPCANVAS_DATA", data.as_os_str())
        .env_remove("RUST_LOG");
    cmd
}

fn collection_with(temp: &TempDir, files: &[(&str, &str)]) -> std::path::PathBuf {
    let dir = temp.path().join("clips");
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in files {
        fs::write(dir.join(name), content).unwrap();
    }
    dir
}

#[test]
fn test_paste_text_into_default_collection() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");

    clipcanvas(&data)
        .args(["paste", "--text", "hello from the terminal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pasted"));

    let default = data.join("Default Collection");
    let files: Vec<_> = fs::read_dir(&default).unwrap().collect();
    assert_eq!(files.len(), 1);

    clipcanvas(&data)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello from the terminal"));

    clipcanvas(&data)
        .args(["list", "--output", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"content_type\": \"text\""));
}

#[test]
fn test_position_survives_between_runs() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let clips = collection_with(&temp, &[("a.txt", "alpha"), ("b.txt", "beta")]);
    let clips = clips.to_str().unwrap();

    clipcanvas(&data)
        .args(["-c", clips, "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beta"));

    clipcanvas(&data)
        .args(["-c", clips, "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"));

    clipcanvas(&data)
        .args(["-c", clips, "back"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    clipcanvas(&data)
        .args(["-c", clips, "first"])
        .assert()
        .success()
        .stdout(predicate::str::contains("New canvas (2 saved)"));
}

#[test]
fn test_item_removed_between_runs_is_skipped() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let clips = collection_with(&temp, &[("a.txt", "alpha"), ("b.txt", "beta")]);
    fs::remove_file(clips.join("b.txt")).unwrap();

    clipcanvas(&data)
        .args(["-c", clips.to_str().unwrap(), "back"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"));
}

#[test]
fn test_missing_collection_folder() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let missing = temp.path().join("nowhere");

    clipcanvas(&data)
        .args(["-c", missing.to_str().unwrap(), "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was not found"));
    assert!(!missing.exists());
}

#[test]
fn test_paste_file_and_classify() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let clips = collection_with(&temp, &[]);
    let picture = temp.path().join("cat.png");
    fs::write(&picture, [1u8, 2, 3]).unwrap();

    clipcanvas(&data)
        .args(["-c", clips.to_str().unwrap()])
        .args(["paste", "--file", picture.to_str().unwrap()])
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(&clips)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with(".ccref"));

    clipcanvas(&data)
        .args(["classify", picture.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains(": image"));
}

#[test]
fn test_delete_by_index() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    let clips = collection_with(&temp, &[("a.txt", "alpha"), ("b.txt", "beta")]);

    clipcanvas(&data)
        .args(["-c", clips.to_str().unwrap(), "delete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted canvas 1"));

    assert!(!clips.join("a.txt").exists());
    assert!(clips.join("b.txt").exists());
}

#[test]
fn test_config_reads_data_dir_file() {
    let temp = TempDir::new().unwrap();
    let data = temp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("clipcanvas.toml"), "paste_files_as_reference = false\n").unwrap();

    clipcanvas(&data)
        .args(["config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("paste_files_as_reference = false"));
}
