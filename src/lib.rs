// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # bindctl - control-plane CLI for a hidden-primary BIND 9
//!
//! bindctl automates the lifecycle of authoritative zones on a BIND 9
//! hidden primary: dynamic zone addition with RFC 9432 catalog membership,
//! RFC 2136 record management under TSIG, and structured JSON results with
//! deterministic exit codes. It is designed to be invoked by operators over
//! SSH, optionally behind a forced-command gate.
//!
//! ## Modules
//!
//! - [`names`] - FQDN normalization, wire-format encoding, catalog labels
//! - [`lock`] - per-zone advisory file locks
//! - [`rndc`] - subprocess adapter for the BIND control channel
//! - [`update`] - RFC 2136 message construction and TSIG transport
//! - [`catalog`] - catalog zone membership (RFC 9432)
//! - [`zone`] - zone lifecycle: create, delete, status, zone files
//! - [`rrset`] - RRset upsert, delete and read-back with validation
//! - [`acme`] - ACME DNS-01 challenge facade
//! - [`ssh`] - SSH forced-command gate
//! - [`audit`] - operation results and the JSONL audit trail
//! - [`config`] - TOML configuration
//! - [`errors`] - error catalog and exit-code mapping
//!
//! ## Example
//!
//! ```rust,no_run
//! use bindctl::audit::OpResult;
//! use bindctl::config::Config;
//! use bindctl::zone::ZoneCreator;
//!
//! # fn example() -> Result<(), bindctl::errors::CtlError> {
//! let config = Config::load(std::path::Path::new("/etc/bindctl/bindctl.toml"))?;
//! let creator = ZoneCreator::new(&config)?;
//!
//! let mut result = OpResult::new("zone_create", "4242");
//! creator.create("example.com", &mut result)?;
//! # Ok(())
//! # }
//! ```

pub mod acme;
pub mod audit;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod errors;
pub mod lock;
pub mod names;
pub mod rndc;
pub mod rrset;
pub mod ssh;
pub mod update;
pub mod zone;
