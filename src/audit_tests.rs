// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `audit.rs`

use super::*;
use crate::errors::{CtlError, PolicyError};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_result_success_shape() {
    let mut result = OpResult::new("zone_create", "req-1");
    result.zone = Some("example.com.".to_string());
    result.add_change("zone_file_created");
    result.add_change("zone_added");
    result.add_change("catalog_updated");

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["op"], "zone_create");
    assert_eq!(json["request_id"], "req-1");
    assert_eq!(json["zone"], "example.com.");
    assert_eq!(
        json["changes"],
        serde_json::json!(["zone_file_created", "zone_added", "catalog_updated"])
    );
    assert!(json.get("error").is_none());
}

#[test]
fn test_result_failure_shape() {
    let mut result = OpResult::new("rrset_upsert", "req-2");
    result.fail(&CtlError::from(PolicyError::ApexCname));

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["code"], 5);
    assert_eq!(json["error"]["kind"], "conflict");
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("CNAME at zone apex"));
    assert_eq!(result.exit_code(), 5);
}

#[test]
fn test_exit_code_success_is_zero() {
    let result = OpResult::new("doctor", "req-3");
    assert_eq!(result.exit_code(), 0);
}

#[test]
fn test_request_ids_are_unique_uuids() {
    let a = new_request_id();
    let b = new_request_id();
    assert_ne!(a, b);
    assert_eq!(a.len(), 36);
}

#[test]
fn test_rfc3339_now_is_utc() {
    let stamp = rfc3339_now();
    assert!(stamp.ends_with('Z'), "expected UTC stamp, got {stamp}");
}

#[test]
fn test_audit_writer_appends_jsonl() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("audit.jsonl");

    let mut writer = AuditWriter::open(Some(&path));

    let mut first = OpResult::new("zone_create", "req-a");
    first.zone = Some("example.com.".to_string());
    first.add_change("zone_added");
    writer.write(&first, Some("alice"), Some(42));

    let second = OpResult::new("doctor", "req-b");
    writer.write(&second, None, None);

    let contents = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);

    let entry: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(entry["request_id"], "req-a");
    assert_eq!(entry["op"], "zone_create");
    assert_eq!(entry["actor"], "alice");
    assert_eq!(entry["duration_ms"], 42);
    assert_eq!(entry["ok"], true);

    let entry: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(entry["request_id"], "req-b");
    assert!(entry.get("actor").is_none());
}

#[test]
fn test_audit_writer_without_path_is_inert() {
    let mut writer = AuditWriter::open(None);
    let result = OpResult::new("doctor", "req-c");
    writer.write(&result, None, None);
}

#[test]
fn test_audit_writer_tolerates_unopenable_path() {
    let mut writer = AuditWriter::open(Some(Path::new("/nonexistent-dir/audit.jsonl")));
    let result = OpResult::new("doctor", "req-d");
    writer.write(&result, None, None);
}
