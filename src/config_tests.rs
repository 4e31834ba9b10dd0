// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

use super::*;
use std::io::Write;
use tempfile::TempDir;

fn write_secret(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tsig.secret");
    let mut file = fs::File::create(&path).unwrap();
    writeln!(file, "c2VjcmV0LXNlY3JldC1zZWNyZXQ=").unwrap();
    path
}

fn minimal_config(dir: &TempDir) -> String {
    let secret = write_secret(dir);
    format!(
        r#"
[catalog]
zone = "catalog.internal."

[tsig]
name = "bindctl-key"
secret_file = "{}"

[zones]
tsig_key_name = "bindctl-key"
"#,
        secret.display()
    )
}

fn load_from_str(dir: &TempDir, contents: &str) -> Result<Config, ConfigError> {
    let path = dir.path().join("bindctl.toml");
    fs::write(&path, contents).unwrap();
    Config::load(&path)
}

#[test]
fn test_minimal_config_gets_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();

    assert_eq!(config.bind.rndc_path, PathBuf::from("/usr/sbin/rndc"));
    assert_eq!(config.bind.dns_addr, "127.0.0.1");
    assert_eq!(config.bind.dns_port, 53);
    assert!(config.bind.tcp_updates);
    assert_eq!(config.catalog.schema_version, 2);
    assert_eq!(config.catalog.label_algorithm, "sha1-wire");
    assert_eq!(config.catalog.member_ttl, 60);
    assert_eq!(config.zones.file_extension, "zone");
    assert_eq!(config.zones.update_mode, "allow-update");
    assert_eq!(config.policy.min_ttl, 30);
    assert_eq!(config.policy.max_ttl, 86400);
    assert!(config.policy.disallow_apex_cname);
    assert!(config.policy.disallow_ns_updates);
    assert_eq!(config.tsig.secret, "c2VjcmV0LXNlY3JldC1zZWNyZXQ=");
}

#[test]
fn test_missing_file_is_a_read_error() {
    let err = Config::load(Path::new("/nonexistent/bindctl.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn test_unknown_field_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let err = load_from_str(&dir, "[bind]\nbogus_field = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_catalog_zone_is_required() {
    let dir = TempDir::new().unwrap();
    let secret = write_secret(&dir);
    let contents = format!(
        "[tsig]\nname = \"k\"\nsecret_file = \"{}\"\n",
        secret.display()
    );
    let err = load_from_str(&dir, &contents).unwrap_err();
    assert!(err.to_string().contains("catalog.zone"));
}

#[test]
fn test_catalog_zone_needs_trailing_dot() {
    let dir = TempDir::new().unwrap();
    let contents = minimal_config(&dir).replace("catalog.internal.", "catalog.internal");
    let err = load_from_str(&dir, &contents).unwrap_err();
    assert!(err.to_string().contains("trailing dot"));
}

#[test]
fn test_label_algorithm_is_pinned() {
    let dir = TempDir::new().unwrap();
    let contents = minimal_config(&dir).replace(
        "zone = \"catalog.internal.\"",
        "zone = \"catalog.internal.\"\nlabel_algorithm = \"md5-wire\"",
    );
    let err = load_from_str(&dir, &contents).unwrap_err();
    assert!(err.to_string().contains("sha1-wire"));
}

#[test]
fn test_update_mode_is_constrained() {
    let dir = TempDir::new().unwrap();
    let contents = minimal_config(&dir).replace(
        "tsig_key_name = \"bindctl-key\"",
        "tsig_key_name = \"bindctl-key\"\nupdate_mode = \"freestyle\"",
    );
    let err = load_from_str(&dir, &contents).unwrap_err();
    assert!(err.to_string().contains("update_mode"));
}

#[test]
fn test_ttl_bounds_ordering() {
    let dir = TempDir::new().unwrap();
    let mut contents = minimal_config(&dir);
    contents.push_str("\n[policy]\nmin_ttl = 100\nmax_ttl = 10\n");
    let err = load_from_str(&dir, &contents).unwrap_err();
    assert!(err.to_string().contains("max_ttl"));
}

#[test]
fn test_missing_secret_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let contents = r#"
[catalog]
zone = "catalog.internal."

[tsig]
name = "bindctl-key"
secret_file = "/nonexistent/tsig.secret"
"#;
    let err = load_from_str(&dir, contents).unwrap_err();
    assert!(matches!(err, ConfigError::SecretFile { .. }));
}

#[test]
fn test_zone_file_path() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();
    assert_eq!(
        config.zone_file_path("example.com."),
        PathBuf::from("/var/lib/bindctl/zones/example.com.zone")
    );
}

#[test]
fn test_lock_file_path() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();
    assert_eq!(
        config.lock_file_path("example.com."),
        PathBuf::from("/run/bindctl/locks/zone--example.com.lock")
    );
}

#[test]
fn test_allowed_rrtype_is_case_insensitive() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();
    assert!(config.is_allowed_rrtype("A"));
    assert!(config.is_allowed_rrtype("a"));
    assert!(config.is_allowed_rrtype("Txt"));
    assert!(!config.is_allowed_rrtype("NS"));
    assert!(!config.is_allowed_rrtype("SOA"));
}

#[test]
fn test_validate_ttl() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();
    assert!(config.validate_ttl(30).is_ok());
    assert!(config.validate_ttl(3600).is_ok());
    assert!(config.validate_ttl(86400).is_ok());
    assert!(config.validate_ttl(29).is_err());
    assert!(config.validate_ttl(86401).is_err());
}

#[test]
fn test_dns_endpoint() {
    let dir = TempDir::new().unwrap();
    let config = load_from_str(&dir, &minimal_config(&dir)).unwrap();
    assert_eq!(config.dns_endpoint(), "127.0.0.1:53");
}

#[test]
fn test_ensure_dirs_creates_directories() {
    let dir = TempDir::new().unwrap();
    let zones_dir = dir.path().join("zones");
    let locks_dir = dir.path().join("locks");
    let secret = write_secret(&dir);
    let contents = format!(
        r#"
[catalog]
zone = "catalog.internal."

[tsig]
name = "bindctl-key"
secret_file = "{}"

[zones]
dir = "{}"

[locking]
dir = "{}"
"#,
        secret.display(),
        zones_dir.display(),
        locks_dir.display()
    );
    let config = load_from_str(&dir, &contents).unwrap();
    config.ensure_dirs().unwrap();
    assert!(zones_dir.is_dir());
    assert!(locks_dir.is_dir());
}
