// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone deletion.
//!
//! Teardown runs in the reverse order of creation: catalog membership is
//! removed first so secondaries stop serving the zone, then the zone is
//! deregistered from the server, then the zone file is removed best-effort.
//! A failing catalog step aborts the whole operation rather than leave a
//! zombie membership pointing at a deleted zone.

use tracing::{info, warn};

use crate::audit::OpResult;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::errors::CtlError;
use crate::lock::ZoneLock;
use crate::names::normalize_zone;
use crate::rndc::RndcClient;
use crate::update::UpdateClient;
use crate::zone::file::remove_zone_file;

/// Orchestrates zone deletion.
#[derive(Debug)]
pub struct ZoneDeleter<'a> {
    config: &'a Config,
    rndc: RndcClient,
    update: UpdateClient,
}

impl<'a> ZoneDeleter<'a> {
    /// Create a zone deleter with fresh collaborators for one operation.
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

    /// Remove a zone from the catalog, the server registry and disk.
    ///
    /// Returns the canonical apex. A zone unknown to the server still has
    /// its catalog membership and zone file cleaned up.
    ///
    /// # Errors
    ///
    /// Returns a [`CtlError`]; transitions recorded on `result` before the
    /// failure stand, since they describe durable state changes that
    /// already happened.
    pub fn delete(&self, zone_input: &str, result: &mut OpResult) -> Result<String, CtlError> {
        let zone = normalize_zone(zone_input)?;
        result.zone = Some(zone.clone());

        let mut lock = ZoneLock::new(self.config.lock_file_path(&zone));
        lock.acquire()?;

        let catalog = CatalogClient::new(
            &self.update,
            &self.config.catalog.zone,
            self.config.catalog.member_ttl,
        );

        catalog.remove(&zone)?;
        result.add_change("catalog_updated");

        self.rndc.del_zone(&zone, true)?;
        result.add_change("zone_deleted");

        let zone_file_path = self.config.zone_file_path(&zone);
        match remove_zone_file(&zone_file_path) {
            Ok(()) => result.add_change("zone_file_removed"),
            Err(err) => {
                warn!("zone file cleanup failed for {zone}: {err}");
                result.add_warning("zone_file_cleanup_failed");
            }
        }

        info!("zone {zone} deleted");
        Ok(zone)
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod delete_tests;
