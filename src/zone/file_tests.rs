// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `file.rs`

use super::*;
use tempfile::TempDir;

#[test]
fn test_default_data_derives_names_from_apex() {
    let data = ZoneFileData::new("example.com.");
    assert_eq!(data.zone, "example.com.");
    assert_eq!(data.primary_ns, "ns1.example.com.");
    assert_eq!(data.admin, "hostmaster.example.com.");
    assert_eq!(data.ttl, 3600);
    assert_eq!(data.ns_records, vec!["@ IN NS ns1.example.com."]);
}

#[test]
fn test_default_serial_is_today_with_two_trailing_zeros() {
    let data = ZoneFileData::new("example.com.");
    assert_eq!(data.serial % 100, 0);
    assert_eq!(data.serial, today_serial());
    // sanity: a post-2024 date in YYYYMMDDNN form
    assert!(data.serial > 2_024_000_000);
}

#[test]
fn test_render_contains_soa_fields() {
    let mut data = ZoneFileData::new("example.com.");
    data.serial = 2_025_010_100;
    let text = render_zone_file(&data);

    assert!(text.starts_with("$ORIGIN example.com.\n"));
    assert!(text.contains("$TTL 3600"));
    assert!(text.contains("@ IN SOA ns1.example.com. hostmaster.example.com. ("));
    assert!(text.contains("2025010100 ; serial"));
    assert!(text.contains("3600 ; refresh"));
    assert!(text.contains("600 ; retry"));
    assert!(text.contains("86400 ; expire"));
    assert!(text.contains("3600 ; minimum"));
    assert!(text.contains("@ IN NS ns1.example.com."));
    assert!(text.contains("@ IN CAA 0 issue \"letsencrypt.org\""));
}

#[test]
fn test_write_creates_final_file_and_removes_temp() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.com.zone");
    let data = ZoneFileData::new("example.com.");

    write_zone_file(&path, &data, "bind", "bind").unwrap();

    assert!(path.exists());
    assert!(!dir.path().join("example.com.zone.tmp").exists());

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("$ORIGIN example.com."));
}

#[test]
fn test_write_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.com.zone");
    fs::write(&path, "stale contents").unwrap();

    let data = ZoneFileData::new("example.com.");
    write_zone_file(&path, &data, "bind", "bind").unwrap();

    let contents = fs::read_to_string(&path).unwrap();
    assert!(!contents.contains("stale contents"));
    assert!(contents.contains("SOA"));
}

#[test]
fn test_write_into_missing_directory_fails_cleanly() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing/example.com.zone");
    let data = ZoneFileData::new("example.com.");

    let err = write_zone_file(&path, &data, "bind", "bind").unwrap_err();
    assert!(matches!(err, ZoneFileError::Write { .. }));
}

#[test]
fn test_remove_zone_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.com.zone");
    fs::write(&path, "x").unwrap();

    remove_zone_file(&path).unwrap();
    assert!(!path.exists());

    // absence is not an error
    remove_zone_file(&path).unwrap();
}

#[test]
fn test_zone_file_exists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("example.com.zone");
    assert!(!zone_file_exists(&path));
    fs::write(&path, "x").unwrap();
    assert!(zone_file_exists(&path));
}

#[test]
fn test_bump_serial_is_strictly_monotone() {
    let today = today_serial();

    // behind the calendar: jump to today
    assert_eq!(bump_serial(2_020_010_100), today);

    // at or past today: increment
    assert_eq!(bump_serial(today), today + 1);
    assert_eq!(bump_serial(today + 5), today + 6);

    for current in [0, 2_020_010_100, today, today + 99] {
        assert!(bump_serial(current) > current);
        assert!(bump_serial(current) >= today);
    }
}
