// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `create.rs`

use super::*;
use crate::config::Config;

fn test_config() -> Config {
    let mut config = Config::default();
    config.catalog.zone = "catalog.internal.".to_string();
    config.tsig.name = "bindctl-key".to_string();
    config.tsig.secret = "c2VjcmV0".to_string();
    config.zones.tsig_key_name = "bindctl-key".to_string();
    config
}

#[test]
fn test_zone_config_allow_update_mode() {
    let config = test_config();
    let creator = ZoneCreator::new(&config).unwrap();
    let stanza = creator.build_zone_config("/var/lib/bindctl/zones/example.com.zone");

    assert!(stanza.contains("type primary;"));
    assert!(stanza.contains("file \"/var/lib/bindctl/zones/example.com.zone\";"));
    assert!(stanza.contains("notify yes;"));
    assert!(stanza.contains("dnssec-policy default;"));
    assert!(stanza.contains("inline-signing yes;"));
    assert!(stanza.contains("allow-update { key \"bindctl-key\"; };"));
    assert!(!stanza.contains("update-policy"));
}

#[test]
fn test_zone_config_update_policy_mode() {
    let mut config = test_config();
    config.zones.update_mode = "update-policy".to_string();
    config.zones.update_policy_grant = "zonesub ANY".to_string();

    let creator = ZoneCreator::new(&config).unwrap();
    let stanza = creator.build_zone_config("/tmp/z.zone");

    assert!(stanza.contains("update-policy { grant bindctl-key zonesub ANY; };"));
    assert!(!stanza.contains("allow-update"));
}

#[test]
fn test_zone_config_notify_disabled() {
    let mut config = test_config();
    config.zones.default_notify = false;

    let creator = ZoneCreator::new(&config).unwrap();
    let stanza = creator.build_zone_config("/tmp/z.zone");
    assert!(stanza.contains("notify no;"));
}

#[test]
fn test_create_rejects_invalid_zone_before_side_effects() {
    let config = test_config();
    let creator = ZoneCreator::new(&config).unwrap();
    let mut result = crate::audit::OpResult::new("zone_create", "req");

    let err = creator.create("not a zone!", &mut result).unwrap_err();
    assert_eq!(err.exit_code(), crate::errors::EXIT_VALIDATION);
    assert!(result.changes.is_empty());
}
