// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `delete.rs`

use super::*;
use crate::config::Config;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.catalog.zone = "catalog.internal.".to_string();
    config.tsig.name = "bindctl-key".to_string();
    config.tsig.secret = "c2VjcmV0".to_string();
    config.locking.dir = dir.path().join("locks");
    config.zones.dir = dir.path().join("zones");
    config
}

#[test]
fn test_delete_rejects_invalid_zone_before_side_effects() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let deleter = ZoneDeleter::new(&config).unwrap();
    let mut result = crate::audit::OpResult::new("zone_delete", "req");

    let err = deleter.delete("..", &mut result).unwrap_err();
    assert_eq!(err.exit_code(), crate::errors::EXIT_VALIDATION);
    assert!(result.changes.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_delete_normalizes_zone_into_result() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let deleter = ZoneDeleter::new(&config).unwrap();
    let mut result = crate::audit::OpResult::new("zone_delete", "req");

    // fails later at the network step, but normalization has already
    // populated the canonical apex
    let _ = deleter.delete("EXAMPLE.COM", &mut result);
    assert_eq!(result.zone.as_deref(), Some("example.com."));
}
