// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Domain-name normalization and catalog member labeling.
//!
//! Every zone and owner name entering the tool passes through this module
//! before it touches the filesystem, rndc or the wire. Normalization produces
//! a canonical form: lowercase ASCII A-labels, dot-separated, with a trailing
//! root dot. The canonical form is what lock paths, zone file names and
//! catalog member labels are derived from, so it must be deterministic for
//! every spelling of the same name.
//!
//! Catalog member labels follow the RFC 9432 `sha1-wire` convention: the
//! SHA-1 digest of the zone apex in DNS wire format (length-prefixed
//! lowercase labels, root terminator), rendered as 40 lowercase hex chars.

use sha1::{Digest, Sha1};

use crate::constants::{MAX_DOMAIN_LENGTH, MAX_LABEL_LENGTH};
use crate::errors::NameError;

/// Normalize a zone name to a canonical ASCII FQDN with a trailing dot.
///
/// Steps: trim whitespace, lowercase, map IDN input to A-labels with a
/// UTS-46 lookup profile (STD3 rules, non-transitional), append the trailing
/// dot, then validate total length and each label (1..=63 octets over
/// `[a-z0-9-]`, no hyphen at either edge). Empty input and the bare root are
/// rejected.
///
/// # Errors
///
/// Returns a [`NameError`] describing the first violated constraint.
pub fn normalize_zone(input: &str) -> Result<String, NameError> {
    let trimmed = input.trim().to_lowercase();

    // The lookup profile rejects a trailing empty label, so strip the root
    // dot before mapping and restore it afterwards.
    let bare = trimmed.strip_suffix('.').unwrap_or(&trimmed);
    if bare.is_empty() {
        return Err(NameError::Empty);
    }

    let ascii = idna::Config::default()
        .use_std3_ascii_rules(true)
        .transitional_processing(false)
        .verify_dns_length(false)
        .to_ascii(bare)
        .map_err(|errors| NameError::InvalidIdn {
            input: input.trim().to_string(),
            reason: format!("{errors:?}"),
        })?;

    let fqdn = format!("{ascii}.");
    if fqdn.len() > MAX_DOMAIN_LENGTH {
        return Err(NameError::TooLong {
            len: fqdn.len(),
            max: MAX_DOMAIN_LENGTH,
        });
    }

    let labels = labels_of(&fqdn);
    if labels.is_empty() {
        return Err(NameError::Empty);
    }

    for (position, label) in labels.into_iter().enumerate() {
        if label.is_empty() {
            return Err(NameError::EmptyLabel { position });
        }

        if label.len() > MAX_LABEL_LENGTH {
            return Err(NameError::LabelTooLong {
                label: label.to_string(),
                len: label.len(),
                max: MAX_LABEL_LENGTH,
            });
        }

        if let Some(bad) = label.chars().find(|c| !is_label_char(*c)) {
            return Err(NameError::InvalidCharacter {
                label: label.to_string(),
                character: bad,
            });
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(NameError::HyphenAtEdge {
                label: label.to_string(),
            });
        }
    }

    Ok(fqdn)
}

/// Normalize an owner name relative to a canonical zone apex.
///
/// `@` denotes the apex. An input ending with a dot is treated as absolute
/// and must have the apex as a suffix; anything else is appended to the apex
/// as a relative name. The result is lowercased but not re-run through IDNA:
/// operators supply A-labels for non-ASCII owners, and record-type
/// validation provides the semantic check on relative labels (which may
/// legitimately contain underscores, e.g. `_acme-challenge`).
///
/// # Errors
///
/// Returns [`NameError::OutsideZone`] when an absolute input does not fall
/// under the zone.
pub fn normalize_owner(input: &str, zone: &str) -> Result<String, NameError> {
    let input = input.trim();

    if input == "@" {
        return Ok(zone.to_string());
    }

    if input.ends_with('.') {
        let lower = input.to_lowercase();
        if !lower.ends_with(&zone.to_lowercase()) {
            return Err(NameError::OutsideZone {
                owner: input.to_string(),
                zone: zone.to_string(),
            });
        }
        return Ok(lower);
    }

    Ok(format!("{}.{}", input.to_lowercase(), zone))
}

/// Check whether an owner name falls under a zone, after forcing both sides
/// to lowercase trailing-root form.
#[must_use]
pub fn is_within_zone(owner: &str, zone: &str) -> bool {
    let owner = to_fqdn_lower(owner);
    let zone = to_fqdn_lower(zone);
    owner.ends_with(&zone)
}

/// Check whether an owner name is exactly the zone apex.
#[must_use]
pub fn is_apex_owner(owner: &str, zone: &str) -> bool {
    to_fqdn_lower(owner) == to_fqdn_lower(zone)
}

/// Encode a domain name in DNS wire format: each label prefixed with its
/// length byte, lowercased, terminated by the root byte. Empty labels from
/// the trailing dot are dropped, so the root name encodes as a single zero
/// byte.
#[must_use]
pub fn wire_format(name: &str) -> Vec<u8> {
    let name = name.trim();
    let mut wire = Vec::with_capacity(name.len() + 2);

    for label in name.split('.') {
        if label.is_empty() {
            continue;
        }
        wire.push(label.len() as u8);
        wire.extend(label.to_lowercase().into_bytes());
    }

    wire.push(0);
    wire
}

/// Compute the catalog member label for a zone apex: the lowercase hex SHA-1
/// digest of the apex in wire format.
///
/// The digest is case-insensitive and independent of a trailing dot, so any
/// spelling of the same apex produces the same label.
#[must_use]
pub fn member_label(zone: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(wire_format(zone));
    format!("{:x}", hasher.finalize())
}

/// Split a name into its labels, dropping the trailing root.
fn labels_of(name: &str) -> Vec<&str> {
    let name = name.trim();
    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Vec::new();
    }
    name.split('.').collect()
}

fn to_fqdn_lower(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with('.') {
        lower
    } else {
        format!("{lower}.")
    }
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod names_tests;
