// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Catalog zone membership (RFC 9432).
//!
//! A member zone is listed in the catalog as a PTR record at
//! `<label>.zones.<catalog-apex>` pointing at the member apex, where the
//! label is the `sha1-wire` digest of the apex. Presence of the PTR is
//! membership; there is never more than one PTR RRset per label.
//!
//! Both `ensure` and `remove` ship single idempotent update messages, so
//! concurrent operations on different member zones may interleave freely:
//! the observable catalog state per member label is the same regardless of
//! order. There is no cross-zone catalog lock.

use hickory_client::rr::RecordType;
use tracing::info;

use crate::errors::UpdateError;
use crate::names::member_label;
use crate::update::{
    build_catalog_ptr_delete, build_catalog_ptr_upsert, catalog_member_owner, parse_name,
    UpdateClient,
};

/// Catalog membership operations against one catalog zone.
#[derive(Debug)]
pub struct CatalogClient<'a> {
    update: &'a UpdateClient,
    catalog_zone: String,
    member_ttl: u32,
}

impl<'a> CatalogClient<'a> {
    /// Create a client for the given catalog apex (canonical FQDN).
    #[must_use]
    pub fn new(update: &'a UpdateClient, catalog_zone: &str, member_ttl: u32) -> Self {
        Self {
            update,
            catalog_zone: catalog_zone.to_string(),
            member_ttl,
        }
    }

    /// Ensure the member zone is listed in the catalog.
    ///
    /// Sends the delete-then-insert PTR replace; repeating the call against
    /// steady state changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] when the update cannot be built or the server
    /// rejects it.
    pub fn ensure(&self, member_zone: &str) -> Result<(), UpdateError> {
        let label = member_label(member_zone);
        let catalog = parse_name(&self.catalog_zone)?;
        let member = parse_name(member_zone)?;

        let message = build_catalog_ptr_upsert(&catalog, &member, &label, self.member_ttl)?;
        self.update.exchange(message)?;

        info!("catalog membership ensured for {member_zone} ({label})");
        Ok(())
    }

    /// Remove the member zone from the catalog.
    ///
    /// Deleting an absent member succeeds at the server, so this too is
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] when the update cannot be built or the server
    /// rejects it.
    pub fn remove(&self, member_zone: &str) -> Result<(), UpdateError> {
        let label = member_label(member_zone);
        let catalog = parse_name(&self.catalog_zone)?;

        let message = build_catalog_ptr_delete(&catalog, &label)?;
        self.update.exchange(message)?;

        info!("catalog membership removed for {member_zone} ({label})");
        Ok(())
    }

    /// Whether the member zone is currently listed, observed by querying the
    /// member owner for PTR.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] when the query fails outright.
    pub fn in_catalog(&self, member_zone: &str) -> Result<bool, UpdateError> {
        let label = member_label(member_zone);
        let owner = catalog_member_owner(&label, &self.catalog_zone)?;

        let response = self.update.query(&owner, RecordType::PTR)?;
        Ok(!response.answers().is_empty())
    }

    /// The member label for a zone apex, exposed for status reporting.
    #[must_use]
    pub fn label_for(zone: &str) -> String {
        member_label(zone)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod catalog_tests;
