// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone creation.
//!
//! Provisioning a zone touches three resources in order: the on-disk zone
//! file, the server's zone registry and the catalog zone. The sequence runs
//! under the per-zone lock and compensates on partial failure:
//!
//! - `addzone` fails: the freshly written zone file is deleted
//! - catalog update fails: the zone is deregistered (`delzone -clean`) and
//!   the zone file deleted
//!
//! A zone that already exists in the registry is not an error; creation
//! degrades to the idempotent catalog ensure and records
//! `zone_already_exists` instead of `zone_added`.

use tracing::{info, warn};

use crate::audit::OpResult;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::errors::CtlError;
use crate::lock::ZoneLock;
use crate::names::normalize_zone;
use crate::rndc::RndcClient;
use crate::update::UpdateClient;
use crate::zone::file::{remove_zone_file, write_zone_file, ZoneFileData};

/// Orchestrates zone creation.
#[derive(Debug)]
pub struct ZoneCreator<'a> {
    config: &'a Config,
    rndc: RndcClient,
    update: UpdateClient,
}

impl<'a> ZoneCreator<'a> {
    /// Create a zone creator with fresh collaborators for one operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the DNS endpoint in the configuration does not
    /// parse.
    pub fn new(config: &'a Config) -> Result<Self, CtlError> {
        Ok(Self {
            config,
            rndc: RndcClient::new(&config.bind),
            update: UpdateClient::new(config)?,
        })
    }

    /// Create an authoritative primary zone and list it in the catalog.
    ///
    /// Returns the canonical apex; durable transitions are recorded on
    /// `result` as they happen, so a failure report still shows what was
    /// done before compensation.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] mapping onto validation, contention or
    /// runtime exit codes; compensation has already run by the time the
    /// error surfaces.
    pub fn create(&self, zone_input: &str, result: &mut OpResult) -> Result<String, CtlError> {
        let zone = normalize_zone(zone_input)?;
        result.zone = Some(zone.clone());

        let mut lock = ZoneLock::new(self.config.lock_file_path(&zone));
        lock.acquire()?;

        self.config.ensure_dirs()?;

        let zone_file_path = self.config.zone_file_path(&zone);
        let catalog = CatalogClient::new(
            &self.update,
            &self.config.catalog.zone,
            self.config.catalog.member_ttl,
        );

        // An already-registered zone degrades to the idempotent catalog
        // ensure.
        let state = self.rndc.zone_status(&zone)?;
        if state.present {
            info!("zone {zone} already present in server registry");
            result.add_change("zone_already_exists");
            catalog.ensure(&zone)?;
            result.add_change("catalog_updated");
            return Ok(zone);
        }

        let data = ZoneFileData::new(&zone);
        write_zone_file(
            &zone_file_path,
            &data,
            &self.config.zones.file_owner,
            &self.config.zones.file_group,
        )?;
        result.add_change("zone_file_created");

        let stanza = self.build_zone_config(&zone_file_path.display().to_string());
        if let Err(err) = self.rndc.add_zone(&zone, &stanza) {
            warn!("addzone failed for {zone}, removing zone file");
            let _ = remove_zone_file(&zone_file_path);
            return Err(err.into());
        }
        result.add_change("zone_added");

        if let Err(err) = catalog.ensure(&zone) {
            warn!("catalog update failed for {zone}, rolling back zone registration");
            let _ = self.rndc.del_zone(&zone, true);
            let _ = remove_zone_file(&zone_file_path);
            return Err(err.into());
        }
        result.add_change("catalog_updated");

        info!("zone {zone} created");
        Ok(zone)
    }

    /// The inline configuration stanza handed to `addzone`.
    fn build_zone_config(&self, zone_file_path: &str) -> String {
        let zones = &self.config.zones;
        let mut stanza = String::new();

        stanza.push_str("type primary; ");
        stanza.push_str(&format!("file \"{zone_file_path}\"; "));
        stanza.push_str(&format!(
            "notify {}; ",
            if zones.default_notify { "yes" } else { "no" }
        ));
        stanza.push_str(&format!("dnssec-policy {}; ", zones.dnssec_policy));
        stanza.push_str("inline-signing yes; ");

        if zones.update_mode == "allow-update" {
            stanza.push_str(&format!(
                "allow-update {{ key \"{}\"; }};",
                zones.tsig_key_name
            ));
        } else {
            stanza.push_str(&format!(
                "update-policy {{ grant {} {}; }};",
                zones.tsig_key_name, zones.update_policy_grant
            ));
        }

        stanza
    }
}

#[cfg(test)]
#[path = "create_tests.rs"]
mod create_tests;
