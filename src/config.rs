// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Configuration loading and validation.
//!
//! bindctl reads a single TOML file (default `/etc/bindctl/bindctl.toml`)
//! describing the BIND control channel, the catalog zone, zone-file layout,
//! TSIG credentials, record policy, locking and logging. Every field has a
//! sensible default so a minimal config only names the catalog zone and the
//! TSIG key.
//!
//! The TSIG secret itself never lives in the config file; it is read from
//! `tsig.secret_file` at load time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{
    CATALOG_LABEL_ALGORITHM, DEFAULT_CATALOG_TTL_SECS, DEFAULT_LOCK_DIR, DEFAULT_RNDC_CONF,
    DEFAULT_RNDC_PATH, DEFAULT_ZONES_DIR, DNS_PORT,
};
use crate::errors::{ConfigError, ValidationError};
use crate::lock::zone_lock_path;

/// Top-level bindctl configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// BIND server and control-channel settings
    #[serde(default)]
    pub bind: BindConfig,
    /// Catalog zone settings
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Zone-file layout and addzone stanza settings
    #[serde(default)]
    pub zones: ZonesConfig,
    /// TSIG credentials for dynamic updates
    #[serde(default)]
    pub tsig: TsigConfig,
    /// Record policy enforcement
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Per-zone lock settings
    #[serde(default)]
    pub locking: LockingConfig,
    /// Logging and audit settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// BIND-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindConfig {
    /// Path to the rndc binary
    #[serde(default = "default_rndc_path")]
    pub rndc_path: PathBuf,
    /// Path to rndc.conf
    #[serde(default = "default_rndc_conf")]
    pub rndc_conf: PathBuf,
    /// BIND view to operate in; empty means the default view
    #[serde(default)]
    pub view: String,
    /// DNS server address for updates and queries
    #[serde(default = "default_dns_addr")]
    pub dns_addr: String,
    /// DNS server port
    #[serde(default = "default_dns_port")]
    pub dns_port: u16,
    /// Prefer TCP for dynamic updates
    #[serde(default = "default_true")]
    pub tcp_updates: bool,
}

/// Catalog zone configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Catalog zone apex, FQDN with trailing dot
    #[serde(default)]
    pub zone: String,
    /// Catalog schema version (1 or 2)
    #[serde(default = "default_schema_version")]
    pub schema_version: u8,
    /// Member-label algorithm; only `sha1-wire` is supported
    #[serde(default = "default_label_algorithm")]
    pub label_algorithm: String,
    /// TTL for member PTR records
    #[serde(default = "default_catalog_ttl")]
    pub member_ttl: u32,
}

/// Zone-file layout and addzone stanza configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZonesConfig {
    /// Directory holding the zone files
    #[serde(default = "default_zones_dir")]
    pub dir: PathBuf,
    /// Zone file extension, without the dot
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    /// Zone file owner (used by the ownership hook)
    #[serde(default = "default_bind_user")]
    pub file_owner: String,
    /// Zone file group (used by the ownership hook)
    #[serde(default = "default_bind_user")]
    pub file_group: String,
    /// `notify` setting for new zones
    #[serde(default = "default_true")]
    pub default_notify: bool,
    /// `dnssec-policy` name for new zones
    #[serde(default = "default_dnssec_policy")]
    pub dnssec_policy: String,
    /// `allow-update` or `update-policy`
    #[serde(default = "default_update_mode")]
    pub update_mode: String,
    /// TSIG key name as known to BIND, granted update rights on new zones
    #[serde(default)]
    pub tsig_key_name: String,
    /// Grant clause for `update-policy` mode
    #[serde(default = "default_update_policy_grant")]
    pub update_policy_grant: String,
}

/// TSIG credentials for dynamic updates.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TsigConfig {
    /// TSIG key name
    #[serde(default)]
    pub name: String,
    /// TSIG algorithm, e.g. `hmac-sha256`
    #[serde(default = "default_tsig_algorithm")]
    pub algorithm: String,
    /// Path to a file holding the base64 secret
    #[serde(default)]
    pub secret_file: Option<PathBuf>,
    /// The loaded secret; populated from `secret_file`, never from TOML
    #[serde(skip)]
    pub secret: String,
}

/// Record policy enforcement.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// RR types accepted for mutation
    #[serde(default = "default_allowed_rrtypes")]
    pub allowed_rrtypes: Vec<String>,
    /// Reject CNAME records at the zone apex
    #[serde(default = "default_true")]
    pub disallow_apex_cname: bool,
    /// Reject all NS record mutations
    #[serde(default = "default_true")]
    pub disallow_ns_updates: bool,
    /// Minimum accepted TTL
    #[serde(default = "default_min_ttl")]
    pub min_ttl: u32,
    /// Maximum accepted TTL
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,
}

/// Per-zone lock configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockingConfig {
    /// Directory holding the per-zone lock files
    #[serde(default = "default_lock_dir")]
    pub dir: PathBuf,
}

/// Logging and audit configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Optional append-only JSONL audit log path
    #[serde(default)]
    pub audit_jsonl: Option<PathBuf>,
    /// Include the resolved actor identity in logs and audit entries
    #[serde(default = "default_true")]
    pub include_actor: bool,
}

fn default_rndc_path() -> PathBuf {
    PathBuf::from(DEFAULT_RNDC_PATH)
}

fn default_rndc_conf() -> PathBuf {
    PathBuf::from(DEFAULT_RNDC_CONF)
}

fn default_dns_addr() -> String {
    "127.0.0.1".to_string()
}

fn default_dns_port() -> u16 {
    DNS_PORT
}

fn default_schema_version() -> u8 {
    2
}

fn default_label_algorithm() -> String {
    CATALOG_LABEL_ALGORITHM.to_string()
}

fn default_catalog_ttl() -> u32 {
    DEFAULT_CATALOG_TTL_SECS
}

fn default_zones_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ZONES_DIR)
}

fn default_file_extension() -> String {
    "zone".to_string()
}

fn default_bind_user() -> String {
    "bind".to_string()
}

fn default_dnssec_policy() -> String {
    "default".to_string()
}

fn default_update_mode() -> String {
    "allow-update".to_string()
}

fn default_update_policy_grant() -> String {
    "zonesub ANY".to_string()
}

fn default_tsig_algorithm() -> String {
    "hmac-sha256".to_string()
}

fn default_allowed_rrtypes() -> Vec<String> {
    ["A", "AAAA", "CNAME", "TXT", "MX", "SRV", "CAA"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn default_min_ttl() -> u32 {
    30
}

fn default_max_ttl() -> u32 {
    86400
}

fn default_lock_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOCK_DIR)
}

fn default_true() -> bool {
    true
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            rndc_path: default_rndc_path(),
            rndc_conf: default_rndc_conf(),
            view: String::new(),
            dns_addr: default_dns_addr(),
            dns_port: default_dns_port(),
            tcp_updates: true,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            zone: String::new(),
            schema_version: default_schema_version(),
            label_algorithm: default_label_algorithm(),
            member_ttl: default_catalog_ttl(),
        }
    }
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            dir: default_zones_dir(),
            file_extension: default_file_extension(),
            file_owner: default_bind_user(),
            file_group: default_bind_user(),
            default_notify: true,
            dnssec_policy: default_dnssec_policy(),
            update_mode: default_update_mode(),
            tsig_key_name: String::new(),
            update_policy_grant: default_update_policy_grant(),
        }
    }
}

impl Default for TsigConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            algorithm: default_tsig_algorithm(),
            secret_file: None,
            secret: String::new(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_rrtypes: default_allowed_rrtypes(),
            disallow_apex_cname: true,
            disallow_ns_updates: true,
            min_ttl: default_min_ttl(),
            max_ttl: default_max_ttl(),
        }
    }
}

impl Default for LockingConfig {
    fn default() -> Self {
        Self {
            dir: default_lock_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            audit_jsonl: None,
            include_actor: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: BindConfig::default(),
            catalog: CatalogConfig::default(),
            zones: ZonesConfig::default(),
            tsig: TsigConfig::default(),
            policy: PolicyConfig::default(),
            locking: LockingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load and validate the configuration from a TOML file.
    ///
    /// Reads the TSIG secret from `tsig.secret_file` when configured.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, the
    /// secret file is unreadable, or validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(secret_file) = config.tsig.secret_file.clone() {
            let secret =
                fs::read_to_string(&secret_file).map_err(|source| ConfigError::SecretFile {
                    path: secret_file,
                    source,
                })?;
            config.tsig.secret = secret.trim().to_string();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate semantic constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                reason: reason.into(),
            }
        }

        if self.bind.rndc_path.as_os_str().is_empty() {
            return Err(invalid("bind.rndc_path is required"));
        }
        if self.bind.rndc_conf.as_os_str().is_empty() {
            return Err(invalid("bind.rndc_conf is required"));
        }
        if self.bind.dns_addr.is_empty() {
            return Err(invalid("bind.dns_addr is required"));
        }
        if self.bind.dns_port == 0 {
            return Err(invalid("bind.dns_port must be between 1 and 65535"));
        }

        if self.catalog.zone.is_empty() {
            return Err(invalid("catalog.zone is required"));
        }
        if !self.catalog.zone.ends_with('.') {
            return Err(invalid("catalog.zone must end with a trailing dot"));
        }
        if !matches!(self.catalog.schema_version, 1 | 2) {
            return Err(invalid("catalog.schema_version must be 1 or 2"));
        }
        if self.catalog.label_algorithm != CATALOG_LABEL_ALGORITHM {
            return Err(invalid(format!(
                "catalog.label_algorithm must be '{CATALOG_LABEL_ALGORITHM}'"
            )));
        }

        if self.zones.dir.as_os_str().is_empty() {
            return Err(invalid("zones.dir is required"));
        }
        if self.zones.file_extension.is_empty() {
            return Err(invalid("zones.file_extension is required"));
        }
        if !matches!(self.zones.update_mode.as_str(), "allow-update" | "update-policy") {
            return Err(invalid(
                "zones.update_mode must be 'allow-update' or 'update-policy'",
            ));
        }

        if self.tsig.name.is_empty() {
            return Err(invalid("tsig.name is required"));
        }
        if self.tsig.algorithm.is_empty() {
            return Err(invalid("tsig.algorithm is required"));
        }
        if self.tsig.secret.is_empty() {
            return Err(invalid("tsig.secret is required (loaded from secret_file)"));
        }

        if self.policy.max_ttl < self.policy.min_ttl {
            return Err(invalid("policy.max_ttl must be >= policy.min_ttl"));
        }

        if self.locking.dir.as_os_str().is_empty() {
            return Err(invalid("locking.dir is required"));
        }

        Ok(())
    }

    /// Absolute path of the zone file for a canonical apex.
    #[must_use]
    pub fn zone_file_path(&self, zone: &str) -> PathBuf {
        let name = zone.strip_suffix('.').unwrap_or(zone);
        self.zones
            .dir
            .join(format!("{name}.{}", self.zones.file_extension))
    }

    /// Lock file path for a canonical apex.
    #[must_use]
    pub fn lock_file_path(&self, zone: &str) -> PathBuf {
        zone_lock_path(&self.locking.dir, zone)
    }

    /// Create the zone and lock directories if absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the directory that could not
    /// be created.
    pub fn ensure_dirs(&self) -> Result<(), ConfigError> {
        for dir in [&self.zones.dir, &self.locking.dir] {
            fs::create_dir_all(dir).map_err(|err| ConfigError::Invalid {
                reason: format!("failed to create directory {}: {err}", dir.display()),
            })?;
        }
        Ok(())
    }

    /// Check a record type against the policy allowlist, case-insensitively.
    #[must_use]
    pub fn is_allowed_rrtype(&self, rrtype: &str) -> bool {
        self.policy
            .allowed_rrtypes
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(rrtype))
    }

    /// Check a TTL against the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::TtlOutOfRange`] when out of bounds.
    pub fn validate_ttl(&self, ttl: u32) -> Result<(), ValidationError> {
        if ttl < self.policy.min_ttl || ttl > self.policy.max_ttl {
            return Err(ValidationError::TtlOutOfRange {
                ttl,
                min: self.policy.min_ttl,
                max: self.policy.max_ttl,
            });
        }
        Ok(())
    }

    /// The DNS endpoint for updates and queries, as `addr:port`.
    #[must_use]
    pub fn dns_endpoint(&self) -> String {
        format!("{}:{}", self.bind.dns_addr, self.bind.dns_port)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
