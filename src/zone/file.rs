// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone-file stub generation and atomic writes.
//!
//! New zones start from a minimal file: `$ORIGIN`, default TTL, one SOA
//! with a date-based serial, one NS pointing at the primary, and the
//! operator's default records (a CAA anchor by default). The file is
//! written to a temporary sibling, fsynced, then renamed into place so the
//! server never observes a torn file.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::{Datelike, Utc};
use tracing::debug;

use crate::constants::{
    DEFAULT_SOA_EXPIRE_SECS, DEFAULT_SOA_MINIMUM_SECS, DEFAULT_SOA_REFRESH_SECS,
    DEFAULT_SOA_RETRY_SECS, DEFAULT_ZONE_TTL_SECS,
};
use crate::errors::ZoneFileError;

/// Everything needed to render a zone-file stub.
#[derive(Debug, Clone)]
pub struct ZoneFileData {
    /// Zone apex, canonical FQDN
    pub zone: String,
    /// Default TTL for the zone
    pub ttl: u32,
    /// Primary nameserver owner name
    pub primary_ns: String,
    /// Admin mailbox in SOA form (`@` already folded to `.`)
    pub admin: String,
    /// SOA serial, YYYYMMDDNN
    pub serial: u32,
    /// SOA refresh
    pub refresh: u32,
    /// SOA retry
    pub retry: u32,
    /// SOA expire
    pub expire: u32,
    /// SOA minimum / negative-caching TTL
    pub minimum: u32,
    /// NS record lines
    pub ns_records: Vec<String>,
    /// Default record lines appended after the NS set
    pub defaults: Vec<String>,
}

impl ZoneFileData {
    /// Default stub data for a new zone: `ns1.<apex>` as primary,
    /// `hostmaster.<apex>` as admin, today's serial, and a CAA anchor.
    #[must_use]
    pub fn new(zone: &str) -> Self {
        let primary_ns = format!("ns1.{zone}");
        let admin = format!("hostmaster.{zone}");

        Self {
            zone: zone.to_string(),
            ttl: DEFAULT_ZONE_TTL_SECS,
            primary_ns: primary_ns.clone(),
            admin,
            serial: today_serial(),
            refresh: DEFAULT_SOA_REFRESH_SECS,
            retry: DEFAULT_SOA_RETRY_SECS,
            expire: DEFAULT_SOA_EXPIRE_SECS,
            minimum: DEFAULT_SOA_MINIMUM_SECS,
            ns_records: vec![format!("@ IN NS {primary_ns}")],
            defaults: vec!["@ IN CAA 0 issue \"letsencrypt.org\"".to_string()],
        }
    }
}

/// Today's date-based serial: `YYYY * 10^6 + MM * 10^4 + DD * 10^2 + 00`.
#[must_use]
pub fn today_serial() -> u32 {
    let now = Utc::now();
    serial_for(now.year() as u32, now.month(), now.day())
}

fn serial_for(year: u32, month: u32, day: u32) -> u32 {
    year * 1_000_000 + month * 10_000 + day * 100
}

/// Next serial after `current`: today's serial when the zone is behind the
/// calendar, otherwise `current + 1`. The result is always strictly greater
/// than the input.
#[must_use]
pub fn bump_serial(current: u32) -> u32 {
    let today = today_serial();
    if current >= today {
        current + 1
    } else {
        today
    }
}

/// Render the zone-file stub text.
#[must_use]
pub fn render_zone_file(data: &ZoneFileData) -> String {
    let mut out = String::new();

    out.push_str(&format!("$ORIGIN {}\n", data.zone));
    out.push_str(&format!("$TTL {}\n\n", data.ttl));

    out.push_str(&format!("@ IN SOA {} {} (\n", data.primary_ns, data.admin));
    out.push_str(&format!("\t{} ; serial\n", data.serial));
    out.push_str(&format!("\t{} ; refresh\n", data.refresh));
    out.push_str(&format!("\t{} ; retry\n", data.retry));
    out.push_str(&format!("\t{} ; expire\n", data.expire));
    out.push_str(&format!("\t{} ; minimum\n", data.minimum));
    out.push_str(")\n\n");

    for ns in &data.ns_records {
        out.push_str(ns);
        out.push('\n');
    }

    if !data.defaults.is_empty() {
        out.push('\n');
        for default in &data.defaults {
            out.push_str(default);
            out.push('\n');
        }
    }

    out
}

/// Write the zone file atomically: temp sibling, fsync, rename.
///
/// The `owner`/`group` parameters feed the ownership hook; see
/// [`apply_ownership`].
///
/// # Errors
///
/// Returns [`ZoneFileError::Write`] when any step of the write fails. A
/// failed write leaves no temporary file behind.
pub fn write_zone_file(
    path: &Path,
    data: &ZoneFileData,
    owner: &str,
    group: &str,
) -> Result<(), ZoneFileError> {
    let content = render_zone_file(data);
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);

    let write_err = |source: std::io::Error| ZoneFileError::Write {
        path: path.to_path_buf(),
        source,
    };

    let result = (|| {
        let mut file = File::create(&tmp_path).map_err(write_err)?;
        file.write_all(content.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        apply_ownership(&tmp_path, owner, group);

        fs::rename(&tmp_path, path).map_err(write_err)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    } else {
        debug!(path = %path.display(), serial = data.serial, "zone file written");
    }

    result
}

/// Ownership hook for privileged deployments.
///
/// Deliberately a no-op: bindctl normally runs as the zone-file owner.
/// Deployments that write as root should chown to `owner:group` here.
fn apply_ownership(_path: &Path, _owner: &str, _group: &str) {}

/// Remove a zone file; an already-absent file is not an error.
///
/// # Errors
///
/// Returns [`ZoneFileError::Remove`] for any failure other than absence.
pub fn remove_zone_file(path: &Path) -> Result<(), ZoneFileError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ZoneFileError::Remove {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Whether a zone file exists at the path.
#[must_use]
pub fn zone_file_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod file_tests;
