//! Rotating alert log behaviour.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::sync::Arc;
use std::thread;

use quakewatch_receiver::ingest::RotatingFile;

fn record(i: usize) -> String {
    format!("record {i:04} {}\n", "x".repeat(37))
}

#[test]
fn appends_without_rotation_below_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 1_000_000, 5).unwrap();

    log.append(b"one\n").unwrap();
    log.append(b"two\n").unwrap();

    assert_eq!(fs::read_to_string(log.path()).unwrap(), "one\ntwo\n");
    assert!(!log.backup_path(1).exists());
}

#[test]
fn rotation_preserves_previous_file_in_first_backup() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 200, 3).unwrap();

    // 50 bytes each: three fit (150), the fourth would reach 200.
    for i in 0..3 {
        log.append(record(i).as_bytes()).unwrap();
    }
    let before = fs::read(log.path()).unwrap();
    assert_eq!(before.len(), 150);

    log.append(record(3).as_bytes()).unwrap();

    assert_eq!(fs::read(log.backup_path(1)).unwrap(), before);
    assert_eq!(fs::read_to_string(log.path()).unwrap(), record(3));
}

#[test]
fn generations_are_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 101, 2).unwrap();

    // Two records per file; 10 records -> 5 generations written, 3 kept.
    for i in 0..10 {
        log.append(record(i).as_bytes()).unwrap();
    }

    assert!(log.backup_path(1).exists());
    assert!(log.backup_path(2).exists());
    assert!(!log.backup_path(3).exists());

    assert_eq!(fs::read_to_string(log.path()).unwrap(), record(8) + &record(9));
    assert_eq!(fs::read_to_string(log.backup_path(1)).unwrap(), record(6) + &record(7));
    assert_eq!(fs::read_to_string(log.backup_path(2)).unwrap(), record(4) + &record(5));

    let files = fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(files, 3);
}

#[test]
fn oversized_record_goes_into_an_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 10, 2).unwrap();

    log.append(record(0).as_bytes()).unwrap();
    assert!(!log.backup_path(1).exists());

    log.append(record(1).as_bytes()).unwrap();
    assert_eq!(fs::read_to_string(log.backup_path(1)).unwrap(), record(0));
    assert_eq!(fs::read_to_string(log.path()).unwrap(), record(1));
}

#[test]
fn reopen_continues_existing_file_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    fs::write(&path, record(0) + &record(1) + &record(2)).unwrap();

    let log = RotatingFile::open(&path, 200, 1).unwrap();
    log.append(record(3).as_bytes()).unwrap();

    assert!(log.backup_path(1).exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), record(3));
}

#[test]
fn zero_backups_disables_rotation() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 60, 0).unwrap();

    for i in 0..5 {
        log.append(record(i).as_bytes()).unwrap();
    }
    assert!(!log.backup_path(1).exists());
    assert_eq!(fs::read(log.path()).unwrap().len(), 250);
}

#[test]
fn rotation_recovers_when_active_file_was_removed() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("alerts.log"), 100, 2).unwrap();

    log.append(record(0).as_bytes()).unwrap();
    fs::remove_file(log.path()).unwrap();

    for i in 1..6 {
        log.append(record(i).as_bytes()).unwrap();
    }

    assert!(log.path().exists());
    assert_eq!(fs::read_to_string(log.path()).unwrap(), record(5));
    assert_eq!(fs::read_to_string(log.backup_path(1)).unwrap(), record(4));
    assert_eq!(fs::read_to_string(log.backup_path(2)).unwrap(), record(3));
}

#[test]
fn creates_missing_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let log = RotatingFile::open(dir.path().join("nested/logs/alerts.log"), 100, 1).unwrap();
    log.append(b"ok\n").unwrap();
    assert!(log.path().exists());
}

#[test]
fn concurrent_appends_never_interleave_or_drop() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(RotatingFile::open(dir.path().join("alerts.log"), 1_000, 50).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for i in 0..50 {
                    log.append(record(t * 100 + i).as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let mut lines = Vec::new();
    let mut paths = vec![log.path().to_path_buf()];
    paths.extend((1..=50).map(|n| log.backup_path(n)));
    for p in paths.iter().filter(|p| p.exists()) {
        let content = fs::read_to_string(p).unwrap();
        assert!(content.len() < 1_000);
        lines.extend(content.lines().map(str::to_string));
    }

    assert_eq!(lines.len(), 200);
    for line in &lines {
        assert_eq!(line.len(), 49, "torn line: {line:?}");
    }
    lines.sort();
    lines.dedup();
    assert_eq!(lines.len(), 200);
}
