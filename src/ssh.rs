// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! SSH forced-command gate.
//!
//! When bindctl is installed as an `authorized_keys` forced command, the
//! operator's real command line arrives in `SSH_ORIGINAL_COMMAND`. This
//! module tokenizes it, checks the verb against a fixed allowlist and the
//! flags against per-verb allowlists, and hands back a sanitized argv for
//! the normal CLI parser. Anything outside the allowlists is rejected
//! before any side effect.

use std::env;

use tracing::info;

use crate::errors::SshError;

/// Verbs reachable through the forced-command gate.
const ALLOWED_VERBS: &[&str] = &["doctor", "version", "zone", "rrset", "acme"];

/// Flags permitted per verb; everything else is refused.
const ALLOWED_FLAGS: &[(&str, &[&str])] = &[
    ("zone", &["limit"]),
    ("rrset", &["ttl"]),
    ("acme", &["ttl"]),
];

/// A validated command received over SSH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedCommand {
    /// Sanitized argv, verb first
    pub argv: Vec<String>,
    /// Actor identity resolved from the environment
    pub actor: Option<String>,
}

/// Read and validate the forced command from the SSH environment.
///
/// # Errors
///
/// Returns [`SshError`] when `SSH_ORIGINAL_COMMAND` is absent, empty or
/// fails the allowlist checks.
pub fn wrap_from_env() -> Result<WrappedCommand, SshError> {
    let original = env::var("SSH_ORIGINAL_COMMAND").unwrap_or_default();
    if original.trim().is_empty() {
        return Err(SshError::MissingCommand);
    }

    let argv: Vec<String> = original
        .split_whitespace()
        .map(ToString::to_string)
        .collect();
    validate_command(&argv)?;

    let actor = resolve_actor();
    info!(command = %original, actor = actor.as_deref().unwrap_or("-"), "accepted forced command");

    Ok(WrappedCommand { argv, actor })
}

/// Validate a tokenized command against the verb and flag allowlists.
///
/// # Errors
///
/// Returns [`SshError`] naming the rejected verb or flag.
pub fn validate_command(argv: &[String]) -> Result<(), SshError> {
    let Some(verb) = argv.first() else {
        return Err(SshError::MissingCommand);
    };

    if !ALLOWED_VERBS.contains(&verb.as_str()) {
        return Err(SshError::VerbNotAllowed { verb: verb.clone() });
    }

    let allowed_flags = ALLOWED_FLAGS
        .iter()
        .find(|(candidate, _)| candidate == verb)
        .map(|(_, flags)| *flags)
        .unwrap_or(&[]);

    for token in &argv[1..] {
        if let Some(flag) = token.strip_prefix("--").or_else(|| token.strip_prefix('-')) {
            let flag = flag.split('=').next().unwrap_or(flag);
            if !allowed_flags.contains(&flag) {
                return Err(SshError::FlagNotAllowed {
                    flag: flag.to_string(),
                    verb: verb.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Resolve the acting identity for logs and the audit trail.
///
/// Prefers an explicit `BINDCTL_ACTOR` (set per key in `authorized_keys`
/// via `environment=`), falling back to the login user.
#[must_use]
pub fn resolve_actor() -> Option<String> {
    env::var("BINDCTL_ACTOR")
        .ok()
        .filter(|actor| !actor.is_empty())
        .or_else(|| env::var("USER").ok().filter(|user| !user.is_empty()))
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod ssh_tests;
