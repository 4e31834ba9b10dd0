// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for bindctl.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Paths
// ============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/bindctl/bindctl.toml";

/// Default rndc binary path
pub const DEFAULT_RNDC_PATH: &str = "/usr/sbin/rndc";

/// Default rndc configuration path
pub const DEFAULT_RNDC_CONF: &str = "/etc/bind/rndc.conf";

/// Default zone file directory
pub const DEFAULT_ZONES_DIR: &str = "/var/lib/bindctl/zones";

/// Default lock file directory
pub const DEFAULT_LOCK_DIR: &str = "/run/bindctl/locks";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS service port
pub const DNS_PORT: u16 = 53;

/// Default TTL for new zone files (1 hour)
pub const DEFAULT_ZONE_TTL_SECS: u32 = 3600;

/// Default TTL for RRset upserts (1 hour)
pub const DEFAULT_RECORD_TTL_SECS: u32 = 3600;

/// Default TTL for catalog member PTR records (1 minute)
pub const DEFAULT_CATALOG_TTL_SECS: u32 = 60;

/// Default TTL for ACME DNS-01 challenge TXT records (1 minute)
pub const DEFAULT_ACME_TTL_SECS: u32 = 60;

/// Default SOA refresh interval (1 hour)
pub const DEFAULT_SOA_REFRESH_SECS: u32 = 3600;

/// Default SOA retry interval (10 minutes)
pub const DEFAULT_SOA_RETRY_SECS: u32 = 600;

/// Default SOA expire time (1 day)
pub const DEFAULT_SOA_EXPIRE_SECS: u32 = 86400;

/// Default SOA negative-caching TTL (1 hour)
pub const DEFAULT_SOA_MINIMUM_SECS: u32 = 3600;

/// TSIG fudge time in seconds (allows for clock skew)
pub const TSIG_FUDGE_TIME_SECS: u16 = 300;

// ============================================================================
// Name Limits (RFC 1035)
// ============================================================================

/// Maximum presentation-format domain name length, trailing dot included
pub const MAX_DOMAIN_LENGTH: usize = 253;

/// Maximum single label length
pub const MAX_LABEL_LENGTH: usize = 63;

// ============================================================================
// Operation Limits
// ============================================================================

/// Timeout for rndc subprocess invocations and DNS exchanges
pub const DEFAULT_OP_TIMEOUT_SECS: u64 = 30;

/// Poll interval while waiting for a child process to exit
pub const CHILD_POLL_INTERVAL_MS: u64 = 50;

/// Default page size for `zone list`
pub const DEFAULT_ZONE_LIST_LIMIT: usize = 100;

// ============================================================================
// Catalog Zone Constants (RFC 9432)
// ============================================================================

/// Sub-label under which catalog member records live
pub const CATALOG_ZONES_LABEL: &str = "zones";

/// The only supported member-label algorithm
pub const CATALOG_LABEL_ALGORITHM: &str = "sha1-wire";
