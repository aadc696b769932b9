use redharvest::{existing_window_ends, plan, write_window, LoadMode};
use serde_json::json;
use std::fs::{self, File};
use std::path::Path;
use time::macros::datetime;

fn touch(folder: &Path, name: &str) {
    File::create(folder.join(name)).unwrap();
}

#[test]
fn empty_folder_means_historical_from_configured_start() {
    let dir = tempfile::tempdir().unwrap();
    let load = plan(
        dir.path(),
        datetime!(2024-01-01 00:00:00),
        datetime!(2024-01-05 12:00:00),
        true,
    )
    .unwrap();

    assert_eq!(load.mode, LoadMode::Historical);
    assert_eq!(load.from, datetime!(2024-01-01 00:00:00));
    assert_eq!(load.to, datetime!(2024-01-05 12:00:00));
}

#[test]
fn missing_folder_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("never_created");
    let load = plan(
        &missing,
        datetime!(2024-01-01 00:00:00),
        datetime!(2024-01-02 00:00:00),
        true,
    )
    .unwrap();
    assert_eq!(load.mode, LoadMode::Historical);
}

/// Three archived windows ending T1 < T2 < T3 resume from T3.
#[test]
fn existing_archives_resume_from_newest_end() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "reddits_corgi_2024-01-01T00:00:00_2024-01-02T00:00:00.json");
    touch(dir.path(), "reddits_corgi_2024-01-02T00:00:00_2024-01-03T00:00:00.json");
    touch(dir.path(), "reddits_corgi_2024-01-03T00:00:00_2024-01-04T00:00:00.json");

    let load = plan(
        dir.path(),
        datetime!(2023-06-01 00:00:00),
        datetime!(2024-01-10 09:00:00),
        true,
    )
    .unwrap();

    assert_eq!(load.mode, LoadMode::Incremental);
    assert_eq!(load.from, datetime!(2024-01-04 00:00:00));
}

#[test]
fn non_conforming_names_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "reddits_corgi.json");
    touch(dir.path(), "reddits_corgi_2024-01-01T00:00:00_2024-01-02T00:00:00.json");

    let ends = existing_window_ends(dir.path());
    assert_eq!(ends, vec![datetime!(2024-01-02 00:00:00)]);
}

#[test]
fn excluding_today_caps_at_last_second_of_yesterday() {
    let dir = tempfile::tempdir().unwrap();
    let load = plan(
        dir.path(),
        datetime!(2024-01-01 00:00:00),
        datetime!(2024-01-05 12:34:56),
        false,
    )
    .unwrap();
    assert_eq!(load.to, datetime!(2024-01-04 23:59:59));
}

/// A resume point past the end bound is a hard error, not a clamped fetch.
#[test]
fn inverted_interval_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "reddits_corgi_2024-02-01T00:00:00_2024-02-02T00:00:00.json");

    let err = plan(
        dir.path(),
        datetime!(2023-06-01 00:00:00),
        datetime!(2024-01-10 00:00:00),
        true,
    )
    .unwrap_err();
    assert!(err.to_string().contains("nothing to download"));
}

/// A snapshot that cannot be written to disk is a hard error, never a
/// silently reported success. `/dev/full` rejects every buffered write at
/// flush time.
#[cfg(target_os = "linux")]
#[test]
fn write_window_surfaces_device_write_errors() {
    let records = vec![json!({ "id": "p1" })];
    let result = write_window(&records, Path::new("/dev"), "full");
    assert!(result.is_err());
}

#[test]
fn write_window_reports_the_written_path() {
    let dir = tempfile::tempdir().unwrap();
    let records = vec![json!({ "id": "p1" })];
    let path = write_window(&records, dir.path(), "snap.json").unwrap();
    assert_eq!(path, dir.path().join("snap.json"));
    let body: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(body, records);
}

#[test]
fn configured_start_after_now_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(plan(
        dir.path(),
        datetime!(2025-01-01 00:00:00),
        datetime!(2024-01-01 00:00:00),
        true,
    )
    .is_err());
}
