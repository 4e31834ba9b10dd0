// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Operation results and the append-only audit trail.
//!
//! Every operation emits exactly one [`OpResult`] as pretty-printed JSON on
//! stdout, whether it succeeded or not. When an audit file is configured,
//! one JSON line per completed operation is appended to it; audit logging is
//! best-effort and never fails an operation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::errors::CtlError;

/// The structured error object embedded in results.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Process exit code for this failure
    pub code: i32,
    /// Stable machine-readable category
    pub kind: String,
    /// Human-readable message
    pub message: String,
    /// Additional detail, surfaced verbatim where available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// The JSON result object printed on stdout for every operation.
#[derive(Debug, Clone, Serialize)]
pub struct OpResult {
    /// Whether the operation succeeded (idempotent no-ops count as success)
    pub ok: bool,
    /// Operation name, e.g. `zone_create`
    pub op: String,
    /// Fresh UUID identifying this invocation
    pub request_id: String,
    /// Canonical zone apex, when the operation targets one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    /// Durable state transitions performed
    pub changes: Vec<String>,
    /// Non-fatal anomalies
    pub warnings: Vec<String>,
    /// Failure description, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl OpResult {
    /// Create a successful result shell for an operation.
    #[must_use]
    pub fn new(op: &str, request_id: &str) -> Self {
        Self {
            ok: true,
            op: op.to_string(),
            request_id: request_id.to_string(),
            zone: None,
            changes: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    /// Record a durable state transition.
    pub fn add_change(&mut self, change: &str) {
        self.changes.push(change.to_string());
    }

    /// Record a non-fatal anomaly.
    pub fn add_warning(&mut self, warning: &str) {
        self.warnings.push(warning.to_string());
    }

    /// Mark this result as failed with the given error.
    pub fn fail(&mut self, error: &CtlError) {
        self.ok = false;
        self.error = Some(ErrorBody {
            code: error.exit_code(),
            kind: error.kind().to_string(),
            message: error.to_string(),
            details: None,
        });
    }

    /// The exit code this result maps to.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            Some(error) => error.code,
            None => 0,
        }
    }

    /// Pretty-print this result to stdout.
    pub fn print(&self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{json}"),
            Err(err) => warn!("failed to serialize result: {err}"),
        }
    }
}

/// Generate a fresh request ID.
#[must_use]
pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time in RFC 3339 UTC, second precision.
#[must_use]
pub fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize)]
struct AuditEntry<'a> {
    time: String,
    request_id: &'a str,
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    zone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    actor: Option<&'a str>,
    ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    changes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a ErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
}

/// Append-only JSONL audit writer.
///
/// A missing or unopenable audit file downgrades to a warning; the audit
/// trail is optional by contract.
#[derive(Debug, Default)]
pub struct AuditWriter {
    file: Option<std::fs::File>,
}

impl AuditWriter {
    /// Open the audit file for appending, if one is configured.
    #[must_use]
    pub fn open(path: Option<&Path>) -> Self {
        let file = path.and_then(|path| {
            match OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!(path = %path.display(), "failed to open audit log: {err}");
                    None
                }
            }
        });
        Self { file }
    }

    /// Append one audit line for a completed operation.
    pub fn write(&mut self, result: &OpResult, actor: Option<&str>, duration_ms: Option<u64>) {
        let Some(file) = self.file.as_mut() else {
            return;
        };

        let entry = AuditEntry {
            time: rfc3339_now(),
            request_id: &result.request_id,
            op: &result.op,
            zone: result.zone.as_deref(),
            actor,
            ok: result.ok,
            changes: result.changes.clone(),
            warnings: result.warnings.clone(),
            error: result.error.as_ref(),
            duration_ms,
        };

        match serde_json::to_string(&entry) {
            Ok(line) => {
                if let Err(err) = writeln!(file, "{line}") {
                    warn!("failed to append audit entry: {err}");
                }
            }
            Err(err) => warn!("failed to serialize audit entry: {err}"),
        }
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod audit_tests;
