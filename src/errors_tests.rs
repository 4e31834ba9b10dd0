// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

use super::*;

#[test]
fn test_validation_errors_exit_2() {
    let err = CtlError::from(NameError::Empty);
    assert_eq!(err.exit_code(), EXIT_VALIDATION);
    assert_eq!(err.kind(), "validation");

    let err = CtlError::from(ValidationError::TtlOutOfRange {
        ttl: 1,
        min: 30,
        max: 86400,
    });
    assert_eq!(err.exit_code(), EXIT_VALIDATION);
}

#[test]
fn test_precondition_errors_exit_3() {
    let err = CtlError::from(ConfigError::Invalid {
        reason: "catalog.zone is required".to_string(),
    });
    assert_eq!(err.exit_code(), EXIT_PRECONDITION);
    assert_eq!(err.kind(), "precondition");

    let err = CtlError::from(RndcError::BinaryNotFound {
        path: "/usr/sbin/rndc".into(),
    });
    assert_eq!(err.exit_code(), EXIT_PRECONDITION);
}

#[test]
fn test_runtime_errors_exit_4() {
    let err = CtlError::from(RndcError::Timeout {
        command: "rndc zonestatus example.com.".to_string(),
        seconds: 30,
    });
    assert_eq!(err.exit_code(), EXIT_RUNTIME);

    let err = CtlError::from(UpdateError::Refused {
        server: "127.0.0.1:53".to_string(),
        rcode: "REFUSED".to_string(),
    });
    assert_eq!(err.exit_code(), EXIT_RUNTIME);
    assert_eq!(err.kind(), "runtime");
}

#[test]
fn test_conflict_errors_exit_5() {
    let err = CtlError::from(PolicyError::ApexCname);
    assert_eq!(err.exit_code(), EXIT_CONFLICT);
    assert_eq!(err.kind(), "conflict");

    let err = CtlError::from(LockError::Contended {
        path: "/run/bindctl/locks/zone--example.com.lock".into(),
    });
    assert_eq!(err.exit_code(), EXIT_CONFLICT);
}

#[test]
fn test_internal_errors_exit_6() {
    let err = CtlError::Internal("unreachable state".to_string());
    assert_eq!(err.exit_code(), EXIT_INTERNAL);
    assert_eq!(err.kind(), "internal");

    let err = CtlError::from(LockError::Reentry {
        path: "/run/bindctl/locks/zone--example.com.lock".into(),
    });
    assert_eq!(err.exit_code(), EXIT_INTERNAL);
}

#[test]
fn test_apex_cname_message_names_the_violation() {
    let err = CtlError::from(PolicyError::ApexCname);
    assert!(err.to_string().contains("CNAME at zone apex"));
}

#[test]
fn test_transparent_messages_pass_through() {
    let err = CtlError::from(RndcError::ZoneAlreadyExists {
        zone: "example.com.".to_string(),
    });
    assert_eq!(err.to_string(), "zone 'example.com.' already exists");
}
