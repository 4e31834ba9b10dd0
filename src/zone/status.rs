// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone status reporting.
//!
//! Read-only probe across the same three resources the lifecycle mutates:
//! the server registry (present, loaded, primary), the catalog zone
//! (membership PTR) and the zone itself (SOA serial when loaded). Takes no
//! lock; the answer is a snapshot.

use hickory_client::rr::{RData, RecordType};
use serde::Serialize;

use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::errors::CtlError;
use crate::names::{member_label, normalize_zone};
use crate::rndc::RndcClient;
use crate::update::{parse_name, UpdateClient};

/// The JSON status report for one zone.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneStatusReport {
    /// Canonical zone apex
    pub zone: String,
    /// The zone is configured on the server
    pub present: bool,
    /// The zone is configured and loaded
    pub loaded: bool,
    /// The zone's registry type is primary (or legacy master)
    pub is_primary: bool,
    /// A catalog member PTR exists for the zone
    pub in_catalog: bool,
    /// The catalog member label derived from the apex
    pub catalog_label: String,
    /// Where the zone file lives on disk
    pub zone_file_path: String,
    /// SOA serial, present when the zone answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soa_serial: Option<u32>,
    /// Zones provisioned by this tool always carry a signing policy
    pub dnssec_enabled: bool,
}

/// Read-only status checker.
#[derive(Debug)]
pub struct ZoneStatusChecker<'a> {
    config: &'a Config,
    rndc: RndcClient,
    update: UpdateClient,
}

impl<'a> ZoneStatusChecker<'a> {
    /// Create a status checker with fresh collaborators for one operation.
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

    /// Probe the full status of a zone.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`] when normalization or the registry probe
    /// fails. Catalog and SOA probes degrade to negative answers rather
    /// than failing the whole report.
    pub fn status(&self, zone_input: &str) -> Result<ZoneStatusReport, CtlError> {
        let zone = normalize_zone(zone_input)?;
        let label = member_label(&zone);

        let state = self.rndc.zone_status(&zone)?;

        let is_primary = if state.present {
            self.rndc.is_zone_primary(&zone).unwrap_or(false)
        } else {
            false
        };

        let catalog = CatalogClient::new(
            &self.update,
            &self.config.catalog.zone,
            self.config.catalog.member_ttl,
        );
        let in_catalog = catalog.in_catalog(&zone).unwrap_or(false);

        let soa_serial = if state.loaded {
            self.query_soa_serial(&zone)
        } else {
            None
        };

        Ok(ZoneStatusReport {
            zone: zone.clone(),
            present: state.present,
            loaded: state.loaded,
            is_primary,
            in_catalog,
            catalog_label: label,
            zone_file_path: self.config.zone_file_path(&zone).display().to_string(),
            soa_serial,
            dnssec_enabled: true,
        })
    }

    fn query_soa_serial(&self, zone: &str) -> Option<u32> {
        let name = parse_name(zone).ok()?;
        let response = self.update.query(&name, RecordType::SOA).ok()?;
        response.answers().iter().find_map(|record| match record.data() {
            Some(RData::SOA(soa)) => Some(soa.serial()),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
