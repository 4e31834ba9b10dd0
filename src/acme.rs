// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! ACME DNS-01 challenge helper.
//!
//! A thin facade over the RRset engine: `present` writes the challenge
//! value as a TXT RRset at `_acme-challenge.<owner>`, `cleanup` deletes it.
//! The challenge label is prepended only when the owner does not already
//! start with it, so callers may pass either the bare name or the full
//! challenge owner. Replacement semantics apply: presenting twice leaves
//! the second value only.

use crate::audit::OpResult;
use crate::config::Config;
use crate::constants::DEFAULT_ACME_TTL_SECS;
use crate::errors::CtlError;
use crate::names::{normalize_owner, normalize_zone};
use crate::rrset::{DeleteOutcome, RrsetManager, UpsertOutcome};

/// The owner-name label carrying DNS-01 challenges.
const CHALLENGE_LABEL: &str = "_acme-challenge.";

/// ACME DNS-01 operations.
#[derive(Debug)]
pub struct AcmeHandler<'a> {
    manager: RrsetManager<'a>,
}

impl<'a> AcmeHandler<'a> {
    /// Create a handler with a fresh RRset engine for one operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the DNS endpoint in the configuration does not
    /// parse.
    pub fn new(config: &'a Config) -> Result<Self, CtlError> {
        Ok(Self {
            manager: RrsetManager::new(config)?,
        })
    }

    /// Publish a challenge value at `_acme-challenge.<fqdn>` as TXT.
    ///
    /// A TTL of zero selects the default (60 seconds).
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] from the underlying upsert pipeline.
    pub fn present(
        &self,
        zone_input: &str,
        fqdn: &str,
        value: &str,
        ttl: u32,
        result: &mut OpResult,
    ) -> Result<UpsertOutcome, CtlError> {
        let zone = normalize_zone(zone_input)?;
        let owner = challenge_owner(fqdn, &zone)?;

        let ttl = if ttl == 0 { DEFAULT_ACME_TTL_SECS } else { ttl };

        self.manager
            .upsert(&zone, &owner, "TXT", ttl, &[value.to_string()], result)
    }

    /// Remove the challenge TXT RRset at `_acme-challenge.<fqdn>`.
    ///
    /// The challenge value is accepted for CLI symmetry but not needed:
    /// the whole RRset is removed.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] from the underlying delete pipeline.
    pub fn cleanup(
        &self,
        zone_input: &str,
        fqdn: &str,
        _value: &str,
        result: &mut OpResult,
    ) -> Result<DeleteOutcome, CtlError> {
        let zone = normalize_zone(zone_input)?;
        let owner = challenge_owner(fqdn, &zone)?;

        let outcome = self.manager.delete(&zone, &owner, "TXT", result)?;
        result.add_change("challenge_removed");
        Ok(outcome)
    }
}

/// Derive the canonical challenge owner for an FQDN within a zone.
///
/// Prepends `_acme-challenge.` unless the normalized owner already starts
/// with it.
fn challenge_owner(fqdn: &str, zone: &str) -> Result<String, CtlError> {
    let owner = normalize_owner(fqdn, zone)?;

    if owner.starts_with(CHALLENGE_LABEL) {
        return Ok(owner);
    }

    if owner == zone {
        return Ok(format!("{CHALLENGE_LABEL}{zone}"));
    }

    // strip the zone suffix, prepend the label, re-attach the zone
    let base = owner
        .strip_suffix(zone)
        .map(|prefix| prefix.trim_end_matches('.'))
        .unwrap_or(&owner);

    Ok(format!("{CHALLENGE_LABEL}{base}.{zone}"))
}

#[cfg(test)]
#[path = "acme_tests.rs"]
mod acme_tests;
