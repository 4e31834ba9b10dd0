// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ssh.rs`

use super::*;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

#[test]
fn test_allowed_verbs_pass() {
    for verb in ["doctor", "version", "zone", "rrset", "acme"] {
        assert!(
            validate_command(&argv(&[verb])).is_ok(),
            "verb {verb} should pass"
        );
    }
}

#[test]
fn test_unknown_verb_is_rejected() {
    let err = validate_command(&argv(&["shutdown", "now"])).unwrap_err();
    assert!(matches!(err, SshError::VerbNotAllowed { .. }));
    assert!(err.to_string().contains("shutdown"));
}

#[test]
fn test_empty_command_is_rejected() {
    assert!(matches!(
        validate_command(&[]),
        Err(SshError::MissingCommand)
    ));
}

#[test]
fn test_zone_create_with_positional_args() {
    assert!(validate_command(&argv(&["zone", "create", "example.com"])).is_ok());
}

#[test]
fn test_allowed_flags_pass() {
    assert!(validate_command(&argv(&["zone", "list", "--limit", "10"])).is_ok());
    assert!(validate_command(&argv(&["rrset", "upsert", "z", "o", "A", "192.0.2.1", "--ttl", "300"])).is_ok());
    assert!(validate_command(&argv(&["acme", "present", "z", "f", "v", "--ttl=60"])).is_ok());
}

#[test]
fn test_foreign_flag_is_rejected() {
    let err = validate_command(&argv(&["zone", "create", "example.com", "--force"])).unwrap_err();
    assert!(matches!(err, SshError::FlagNotAllowed { .. }));
    assert!(err.to_string().contains("force"));
}

#[test]
fn test_flags_are_rejected_for_flagless_verbs() {
    let err = validate_command(&argv(&["doctor", "--verbose"])).unwrap_err();
    assert!(matches!(err, SshError::FlagNotAllowed { .. }));
}

#[test]
fn test_short_flag_spelling_is_checked_too() {
    let err = validate_command(&argv(&["rrset", "get", "z", "o", "A", "-x"])).unwrap_err();
    assert!(matches!(err, SshError::FlagNotAllowed { .. }));
}
