// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RRset state engine: upsert, delete and read-back.
//!
//! Mutations follow one pipeline: normalize zone and owner, validate TTL,
//! type allowlist, RDATA and policy, take the per-zone lock, then ship a
//! single RFC 2136 message. An upsert replaces the whole RRset (delete
//! followed by insert inside one message), so the server state after the
//! call equals the request regardless of what was there before.
//!
//! Reads query the authoritative server directly over UDP and render every
//! answer in canonical presentation form.

pub mod validate;

use hickory_client::rr::Record;
use serde::Serialize;
use tracing::info;

use crate::audit::OpResult;
use crate::config::Config;
use crate::errors::{CtlError, ValidationError};
use crate::lock::ZoneLock;
use crate::names::{normalize_owner, normalize_zone};
use crate::update::{build_delete_rrset, build_replace_rrset, parse_name, UpdateClient};
use self::validate::{build_record, parse_rrtype, rdata_to_string, validate_policy, validate_rdata};

/// Result of a successful upsert.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    /// Always true on the success path
    pub success: bool,
    /// Canonical owner name
    pub owner: String,
    /// Record type, uppercase
    #[serde(rename = "type")]
    pub rrtype: String,
    /// TTL applied to the RRset
    pub ttl: u32,
    /// The RDATA values as sent
    pub rdata: Vec<String>,
}

/// Result of a successful delete.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteOutcome {
    /// Always true on the success path
    pub success: bool,
    /// Canonical owner name
    pub owner: String,
    /// Record type, uppercase
    #[serde(rename = "type")]
    pub rrtype: String,
}

/// Result of a read.
#[derive(Debug, Clone, Serialize)]
pub struct GetOutcome {
    /// Whether any matching answer came back
    pub found: bool,
    /// Canonical owner name
    pub owner: String,
    /// Record type, uppercase
    #[serde(rename = "type")]
    pub rrtype: String,
    /// TTL of the RRset, when found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Canonical RDATA values, empty when not found
    pub rdata: Vec<String>,
}

/// RRset operations for one configuration.
#[derive(Debug)]
pub struct RrsetManager<'a> {
    config: &'a Config,
    update: UpdateClient,
}

impl<'a> RrsetManager<'a> {
    /// Create a manager with a fresh transport for one operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the DNS endpoint in the configuration does not
    /// parse.
    pub fn new(config: &'a Config) -> Result<Self, CtlError> {
        Ok(Self {
            config,
            update: UpdateClient::new(config)?,
        })
    }

    /// Replace the RRset at (owner, type) with the given values.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] for validation failures, policy violations,
    /// lock contention and transport failures.
    pub fn upsert(
        &self,
        zone_input: &str,
        owner_input: &str,
        rrtype_input: &str,
        ttl: u32,
        rdata: &[String],
        result: &mut OpResult,
    ) -> Result<UpsertOutcome, CtlError> {
        let zone = normalize_zone(zone_input)?;
        result.zone = Some(zone.clone());
        let owner = normalize_owner(owner_input, &zone)?;

        let record_type = parse_rrtype(rrtype_input)?;
        let rrtype = record_type.to_string();

        self.config.validate_ttl(ttl)?;
        self.check_allowed(&rrtype)?;
        validate_rdata(&rrtype, rdata)?;
        validate_policy(self.config, &zone, &owner, &rrtype)?;

        let mut lock = ZoneLock::new(self.config.lock_file_path(&zone));
        lock.acquire()?;

        let owner_name = parse_name(&owner)?;
        let records: Vec<Record> = rdata
            .iter()
            .map(|value| build_record(&owner_name, record_type, ttl, value))
            .collect::<Result<_, _>>()?;

        let zone_name = parse_name(&zone)?;
        let message = build_replace_rrset(&zone_name, records)?;
        self.update.exchange(message)?;
        result.add_change("rrset_replaced");

        info!("replaced {rrtype} RRset at {owner} in {zone} (TTL {ttl})");
        Ok(UpsertOutcome {
            success: true,
            owner,
            rrtype,
            ttl,
            rdata: rdata.to_vec(),
        })
    }

    /// Delete the RRset at (owner, type).
    ///
    /// Deleting an absent RRset succeeds at the server; the operation is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] for validation failures, policy violations,
    /// lock contention and transport failures.
    pub fn delete(
        &self,
        zone_input: &str,
        owner_input: &str,
        rrtype_input: &str,
        result: &mut OpResult,
    ) -> Result<DeleteOutcome, CtlError> {
        let zone = normalize_zone(zone_input)?;
        result.zone = Some(zone.clone());
        let owner = normalize_owner(owner_input, &zone)?;

        let record_type = parse_rrtype(rrtype_input)?;
        let rrtype = record_type.to_string();

        self.check_allowed(&rrtype)?;
        validate_policy(self.config, &zone, &owner, &rrtype)?;

        let mut lock = ZoneLock::new(self.config.lock_file_path(&zone));
        lock.acquire()?;

        let zone_name = parse_name(&zone)?;
        let owner_name = parse_name(&owner)?;
        let message = build_delete_rrset(&zone_name, &owner_name, record_type);
        self.update.exchange(message)?;
        result.add_change("rrset_deleted");

        info!("deleted {rrtype} RRset at {owner} in {zone}");
        Ok(DeleteOutcome {
            success: true,
            owner,
            rrtype,
        })
    }

    /// Read the RRset at (owner, type) from the authoritative server.
    ///
    /// Answers are filtered by exact type and case-insensitive owner; an
    /// empty or non-matching answer section yields `found: false`, recorded
    /// on `result` as the `rrset_not_found` warning.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] for validation and transport failures.
    pub fn get(
        &self,
        zone_input: &str,
        owner_input: &str,
        rrtype_input: &str,
        result: &mut OpResult,
    ) -> Result<GetOutcome, CtlError> {
        let zone = normalize_zone(zone_input)?;
        result.zone = Some(zone.clone());
        let owner = normalize_owner(owner_input, &zone)?;

        let record_type = parse_rrtype(rrtype_input)?;
        let rrtype = record_type.to_string();

        let owner_name = parse_name(&owner)?;
        let response = self.update.query(&owner_name, record_type)?;

        let matching: Vec<&Record> = response
            .answers()
            .iter()
            .filter(|record| {
                record.record_type() == record_type && record.name() == &owner_name
            })
            .collect();

        if matching.is_empty() {
            result.add_warning("rrset_not_found");
            return Ok(GetOutcome {
                found: false,
                owner,
                rrtype,
                ttl: None,
                rdata: Vec::new(),
            });
        }

        result.add_change("rrset_found");

        let ttl = matching[0].ttl();
        let rdata = matching
            .iter()
            .filter_map(|record| rdata_to_string(record))
            .collect();

        Ok(GetOutcome {
            found: true,
            owner,
            rrtype,
            ttl: Some(ttl),
            rdata,
        })
    }

    fn check_allowed(&self, rrtype: &str) -> Result<(), ValidationError> {
        if !self.config.is_allowed_rrtype(rrtype) {
            return Err(ValidationError::TypeNotAllowed {
                rrtype: rrtype.to_string(),
            });
        }
        Ok(())
    }
}
