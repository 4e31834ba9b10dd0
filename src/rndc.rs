// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! BIND control-channel adapter.
//!
//! Wraps the `rndc` binary as a subprocess for zone registry operations:
//! dynamic zone addition (`addzone`), removal (`delzone -clean`), status
//! probes (`zonestatus`, `showzone`) and the diagnostic pass-throughs
//! (`reload`, `reconfig`, `status`). Every invocation runs with a deadline;
//! a child that outlives it is killed and reported as a timeout.
//!
//! The well-known BIND answers "already exists" and "not found" are mapped
//! onto distinct error kinds so callers can branch on idempotent cases
//! without string matching.

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::config::BindConfig;
use crate::constants::{CHILD_POLL_INTERVAL_MS, DEFAULT_OP_TIMEOUT_SECS};
use crate::errors::RndcError;

/// Presence and load state of a zone in the server's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneState {
    /// The zone is configured on the server
    pub present: bool,
    /// The zone is configured and its file loaded without errors
    pub loaded: bool,
}

/// Client for the rndc control channel.
///
/// One instance per operation; holds no connection state, only the paths and
/// the deadline.
#[derive(Debug, Clone)]
pub struct RndcClient {
    rndc_path: PathBuf,
    rndc_conf: PathBuf,
    view: Option<String>,
    timeout: Duration,
}

impl RndcClient {
    /// Create a client from the BIND section of the configuration.
    #[must_use]
    pub fn new(bind: &BindConfig) -> Self {
        let view = if bind.view.is_empty() {
            None
        } else {
            Some(bind.view.clone())
        };
        Self {
            rndc_path: bind.rndc_path.clone(),
            rndc_conf: bind.rndc_conf.clone(),
            view,
            timeout: Duration::from_secs(DEFAULT_OP_TIMEOUT_SECS),
        }
    }

    /// Override the per-invocation deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Register a primary zone with the given inline configuration stanza.
    ///
    /// # Errors
    ///
    /// [`RndcError::ZoneAlreadyExists`] when the server already has the zone;
    /// other [`RndcError`] kinds for spawn, timeout and command failures.
    pub fn add_zone(&self, zone: &str, zone_config: &str) -> Result<(), RndcError> {
        if zone_config.is_empty() {
            return Err(RndcError::CommandFailed {
                command: format!("rndc addzone {zone}"),
                stderr: "zone config cannot be empty".to_string(),
            });
        }

        let mut args = vec!["addzone".to_string()];
        args.extend(self.zone_scope(zone));
        args.push(format!("{{ {zone_config} }};"));

        match self.run(&args) {
            Ok(_) => Ok(()),
            Err(RndcError::CommandFailed { stderr, .. }) if stderr.contains("already exists") => {
                Err(RndcError::ZoneAlreadyExists {
                    zone: zone.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Deregister a zone; with `clean` the server also removes its zone file.
    ///
    /// # Errors
    ///
    /// [`RndcError::ZoneNotFound`] when the server has no such zone; other
    /// [`RndcError`] kinds for spawn, timeout and command failures.
    pub fn del_zone(&self, zone: &str, clean: bool) -> Result<(), RndcError> {
        let mut args = vec!["delzone".to_string()];
        if clean {
            args.push("-clean".to_string());
        }
        args.extend(self.zone_scope(zone));

        match self.run(&args) {
            Ok(_) => Ok(()),
            Err(RndcError::CommandFailed { stderr, .. }) if is_not_found(&stderr) => {
                Err(RndcError::ZoneNotFound {
                    zone: zone.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Probe a zone's registry state.
    ///
    /// A zone the server does not know about yields `{present: false,
    /// loaded: false}` without error.
    ///
    /// # Errors
    ///
    /// Returns [`RndcError`] for spawn, timeout and unexpected command
    /// failures.
    pub fn zone_status(&self, zone: &str) -> Result<ZoneState, RndcError> {
        let mut args = vec!["zonestatus".to_string()];
        args.extend(self.zone_scope(zone));

        let stdout = match self.run(&args) {
            Ok((stdout, _)) => stdout,
            Err(RndcError::CommandFailed { stderr, .. }) if is_not_found(&stderr) => {
                return Ok(ZoneState {
                    present: false,
                    loaded: false,
                });
            }
            Err(err) => return Err(err),
        };

        let loaded = stdout.lines().any(|line| {
            let line = line.trim();
            line.strip_prefix("status:")
                .map(|status| status.trim().eq_ignore_ascii_case("loaded"))
                .unwrap_or(false)
        });

        Ok(ZoneState {
            present: true,
            loaded,
        })
    }

    /// Fetch the raw configuration stanza of a zone.
    ///
    /// # Errors
    ///
    /// [`RndcError::ZoneNotFound`] when the server has no such zone.
    pub fn show_zone(&self, zone: &str) -> Result<String, RndcError> {
        let mut args = vec!["showzone".to_string()];
        args.extend(self.zone_scope(zone));

        match self.run(&args) {
            Ok((stdout, _)) => Ok(stdout),
            Err(RndcError::CommandFailed { stderr, .. }) if is_not_found(&stderr) => {
                Err(RndcError::ZoneNotFound {
                    zone: zone.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Whether a zone is configured as a primary.
    ///
    /// Derived from the `type` directive of the parsed `showzone` stanza;
    /// `master` is the legacy spelling of `primary`.
    ///
    /// # Errors
    ///
    /// Propagates [`show_zone`](Self::show_zone) failures.
    pub fn is_zone_primary(&self, zone: &str) -> Result<bool, RndcError> {
        let output = self.show_zone(zone)?;
        let config = parse_zone_config(&output);
        Ok(matches!(
            config.get("type").map(String::as_str),
            Some("primary") | Some("master")
        ))
    }

    /// Reload one zone.
    ///
    /// # Errors
    ///
    /// Returns [`RndcError`] for spawn, timeout and command failures.
    pub fn reload(&self, zone: &str) -> Result<(), RndcError> {
        let mut args = vec!["reload".to_string()];
        args.extend(self.zone_scope(zone));
        self.run(&args).map(|_| ())
    }

    /// Reload the server configuration and new zones.
    ///
    /// # Errors
    ///
    /// Returns [`RndcError`] for spawn, timeout and command failures.
    pub fn reconfig(&self) -> Result<(), RndcError> {
        self.run(&["reconfig".to_string()]).map(|_| ())
    }

    /// Fetch the server status text.
    ///
    /// # Errors
    ///
    /// Returns [`RndcError`] for spawn, timeout and command failures.
    pub fn status(&self) -> Result<String, RndcError> {
        self.run(&["status".to_string()]).map(|(stdout, _)| stdout)
    }

    /// The configured rndc binary path.
    #[must_use]
    pub fn rndc_path(&self) -> &PathBuf {
        &self.rndc_path
    }

    /// Zone argument plus class and view when a view is configured
    /// (`rndc <verb> <zone> [class [view]]`).
    fn zone_scope(&self, zone: &str) -> Vec<String> {
        match &self.view {
            Some(view) => vec![zone.to_string(), "IN".to_string(), view.clone()],
            None => vec![zone.to_string()],
        }
    }

    /// Run rndc with the given arguments, enforcing the deadline.
    ///
    /// Returns captured (stdout, stderr) on exit status zero.
    fn run(&self, args: &[String]) -> Result<(String, String), RndcError> {
        let command_line = format!("rndc {}", args.join(" "));
        debug!(command = %command_line, "invoking rndc");

        let mut child = Command::new(&self.rndc_path)
            .arg("-c")
            .arg(&self.rndc_conf)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    RndcError::BinaryNotFound {
                        path: self.rndc_path.clone(),
                    }
                } else {
                    RndcError::Spawn {
                        command: command_line.clone(),
                        source,
                    }
                }
            })?;

        // Drain both pipes on background threads so a chatty child cannot
        // fill a pipe buffer and wedge before exiting.
        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_pipe(stdout_pipe));
        let stderr_reader = thread::spawn(move || read_pipe(stderr_pipe));

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RndcError::Timeout {
                            command: command_line,
                            seconds: self.timeout.as_secs(),
                        });
                    }
                    thread::sleep(Duration::from_millis(CHILD_POLL_INTERVAL_MS));
                }
                Err(source) => {
                    return Err(RndcError::Spawn {
                        command: command_line,
                        source,
                    });
                }
            }
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            let detail = if stderr.trim().is_empty() {
                format!("exit status {status}")
            } else {
                stderr.trim().to_string()
            };
            return Err(RndcError::CommandFailed {
                command: command_line,
                stderr: detail,
            });
        }

        Ok((stdout, stderr))
    }
}

fn read_pipe(pipe: Option<impl Read>) -> String {
    let mut buf = String::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_string(&mut buf);
    }
    buf
}

fn is_not_found(stderr: &str) -> bool {
    stderr.contains("not found") || stderr.contains("no such zone")
}

/// Parse the directive lines of an `rndc showzone` stanza into a map of
/// single-token directives, e.g. `type primary;` becomes `type -> primary`.
#[must_use]
pub fn parse_zone_config(output: &str) -> HashMap<String, String> {
    let mut config = HashMap::new();
    let mut in_zone = false;

    for line in output.lines() {
        let line = line.trim();

        if !in_zone {
            if line.starts_with("zone ") && line.contains('{') {
                in_zone = true;
            }
            continue;
        }

        if line.starts_with('}') {
            break;
        }

        let mut parts = line.split_whitespace();
        if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
            config.insert(
                key.trim_end_matches(';').to_string(),
                value.trim_end_matches(';').to_string(),
            );
        }
    }

    config
}

#[cfg(test)]
#[path = "rndc_tests.rs"]
mod rndc_tests;
