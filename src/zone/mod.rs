// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zone lifecycle management.
//!
//! Create, delete and status for authoritative primary zones, orchestrated
//! across three resources: the on-disk zone file, the server's zone
//! registry (via rndc) and the catalog zone (via dynamic update). All
//! mutations run under the per-zone lock; partial failures trigger
//! compensation so a zone is either fully provisioned or absent.

pub mod create;
pub mod delete;
pub mod file;
pub mod status;

pub use self::create::ZoneCreator;
pub use self::delete::ZoneDeleter;
pub use self::file::{bump_serial, remove_zone_file, write_zone_file, ZoneFileData};
pub use self::status::{ZoneStatusChecker, ZoneStatusReport};
