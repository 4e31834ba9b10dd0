// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for bindctl operations.
//!
//! This module provides specialized error types for:
//! - Domain-name normalization and catalog labeling
//! - Per-zone advisory locking
//! - rndc subprocess invocations
//! - RFC 2136 dynamic updates and TSIG signing
//! - RDATA validation and policy enforcement
//! - Configuration loading
//!
//! Every error maps onto one of the documented process exit codes through
//! [`CtlError::exit_code`], so scripts driving bindctl over SSH can branch on
//! the exit status without parsing messages.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for success, including idempotent no-ops.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for validation failures (bad name, type, TTL or RDATA).
pub const EXIT_VALIDATION: i32 = 2;
/// Exit code for precondition failures (rndc or config missing).
pub const EXIT_PRECONDITION: i32 = 3;
/// Exit code for runtime failures (rndc failure, update refused, I/O error).
pub const EXIT_RUNTIME: i32 = 4;
/// Exit code for conflicts and unsafe requests (policy violation, lock contention).
pub const EXIT_CONFLICT: i32 = 5;
/// Exit code for internal errors and invariant violations.
pub const EXIT_INTERNAL: i32 = 6;

/// Errors produced while normalizing domain names.
#[derive(Error, Debug, Clone)]
pub enum NameError {
    /// The input could not be mapped to ASCII A-labels
    #[error("invalid domain name '{input}': {reason}")]
    InvalidIdn {
        /// The operator-supplied input
        input: String,
        /// Mapping failure detail
        reason: String,
    },

    /// The input was empty or reduced to the bare root
    #[error("invalid domain name: no labels")]
    Empty,

    /// A label between two dots is empty
    #[error("empty label at position {position}")]
    EmptyLabel {
        /// Zero-based index of the empty label
        position: usize,
    },

    /// The full name exceeds the RFC 1035 presentation-format limit
    #[error("domain name too long: {len} > {max}")]
    TooLong {
        /// Observed length, trailing dot included
        len: usize,
        /// The enforced maximum
        max: usize,
    },

    /// A single label exceeds 63 octets
    #[error("label '{label}' too long: {len} > {max}")]
    LabelTooLong {
        /// The offending label
        label: String,
        /// Observed label length
        len: usize,
        /// The enforced maximum
        max: usize,
    },

    /// A label contains a character outside `[a-z0-9-]`
    #[error("invalid character '{character}' in label '{label}'")]
    InvalidCharacter {
        /// The offending label
        label: String,
        /// The first rejected character
        character: char,
    },

    /// A label begins or ends with a hyphen
    #[error("label '{label}' cannot start or end with a hyphen")]
    HyphenAtEdge {
        /// The offending label
        label: String,
    },

    /// An absolute owner name does not fall under the operation's zone
    #[error("owner '{owner}' is not within zone '{zone}'")]
    OutsideZone {
        /// The owner name as supplied
        owner: String,
        /// The zone apex it was checked against
        zone: String,
    },
}

/// Errors produced by the per-zone lock manager.
#[derive(Error, Debug)]
pub enum LockError {
    /// Another process already holds the lock
    #[error("zone lock {} is held by another process", path.display())]
    Contended {
        /// Path of the contended lock file
        path: PathBuf,
    },

    /// This handle already holds the lock; acquiring twice is a programming error
    #[error("zone lock {} is already held by this handle", path.display())]
    Reentry {
        /// Path of the lock file
        path: PathBuf,
    },

    /// Creating, opening or locking the lock file failed at the OS level
    #[error("lock I/O failure on {}: {source}", path.display())]
    Io {
        /// Path of the lock file
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Errors produced by the rndc control-channel adapter.
#[derive(Error, Debug)]
pub enum RndcError {
    /// The rndc binary does not exist at the configured path
    #[error("rndc binary not found at {}", path.display())]
    BinaryNotFound {
        /// Configured rndc path
        path: PathBuf,
    },

    /// The child process could not be started
    #[error("failed to start '{command}': {source}")]
    Spawn {
        /// The command line that failed
        command: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child did not finish before the deadline and was killed
    #[error("'{command}' timed out after {seconds}s")]
    Timeout {
        /// The command line that timed out
        command: String,
        /// The deadline that expired
        seconds: u64,
    },

    /// rndc exited non-zero for a reason other than the well-known cases
    #[error("'{command}' failed: {stderr}")]
    CommandFailed {
        /// The command line that failed
        command: String,
        /// Captured stderr, surfaced as the error detail
        stderr: String,
    },

    /// `addzone` reported that the zone is already configured
    #[error("zone '{zone}' already exists")]
    ZoneAlreadyExists {
        /// The zone apex
        zone: String,
    },

    /// `delzone`/`zonestatus` reported that the zone is not configured
    #[error("zone '{zone}' not found")]
    ZoneNotFound {
        /// The zone apex
        zone: String,
    },
}

/// Errors produced by the RFC 2136 update transport.
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The configured DNS endpoint could not be parsed
    #[error("invalid DNS server endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint as configured
        endpoint: String,
        /// Parse failure detail
        reason: String,
    },

    /// A name needed for message construction failed to parse
    #[error("invalid DNS name '{name}': {reason}")]
    InvalidName {
        /// The offending name
        name: String,
        /// Parse failure detail
        reason: String,
    },

    /// TSIG key material is unusable (bad algorithm, base64 or key name)
    #[error("TSIG key error: {reason}")]
    Tsig {
        /// What is wrong with the key
        reason: String,
    },

    /// Connecting to the server failed
    #[error("failed to connect to DNS server {server}: {reason}")]
    Connect {
        /// The server endpoint
        server: String,
        /// Connection failure detail
        reason: String,
    },

    /// The exchange failed in transit or the signed response did not verify
    #[error("DNS exchange with {server} failed: {reason}")]
    Exchange {
        /// The server endpoint
        server: String,
        /// Transport failure detail
        reason: String,
    },

    /// The server returned no response at all
    #[error("no response from DNS server {server}")]
    NoResponse {
        /// The server endpoint
        server: String,
    },

    /// The server answered with a non-success RCODE
    #[error("DNS server {server} refused the request: {rcode}")]
    Refused {
        /// The server endpoint
        server: String,
        /// The response code, in presentation format
        rcode: String,
    },
}

/// Errors produced by RDATA validation.
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    /// The record type is not recognized at all
    #[error("unknown RR type: {rrtype}")]
    UnknownType {
        /// The type as supplied
        rrtype: String,
    },

    /// The record type is recognized but not in the configured allowlist
    #[error("RR type {rrtype} is not allowed")]
    TypeNotAllowed {
        /// The type as supplied
        rrtype: String,
    },

    /// No RDATA values were supplied
    #[error("no rdata provided for {rrtype} record")]
    EmptyRdata {
        /// The record type
        rrtype: String,
    },

    /// A single RDATA value is malformed for its type
    #[error("invalid {rrtype} rdata '{value}': {reason}")]
    InvalidRdata {
        /// The record type
        rrtype: String,
        /// The offending value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// The requested TTL falls outside the configured bounds
    #[error("TTL {ttl} is outside the allowed range {min}..={max}")]
    TtlOutOfRange {
        /// The requested TTL
        ttl: u32,
        /// Configured minimum
        min: u32,
        /// Configured maximum
        max: u32,
    },
}

/// Policy-gate violations; unlike validation errors these indicate a request
/// that is well-formed but unsafe under the operator's policy.
#[derive(Error, Debug, Clone)]
pub enum PolicyError {
    /// CNAME records may not coexist with the SOA/NS at the apex
    #[error("CNAME at zone apex is not allowed")]
    ApexCname,

    /// Delegation and apex NS records are managed outside this tool
    #[error("NS record updates are not allowed")]
    NsUpdate,
}

/// Rejections from the SSH forced-command gate.
#[derive(Error, Debug, Clone)]
pub enum SshError {
    /// `SSH_ORIGINAL_COMMAND` was absent or empty
    #[error("no SSH_ORIGINAL_COMMAND in environment")]
    MissingCommand,

    /// The leading verb is not on the allowlist
    #[error("subcommand '{verb}' is not allowed")]
    VerbNotAllowed {
        /// The rejected verb
        verb: String,
    },

    /// A flag is not on the verb's allowlist
    #[error("flag '{flag}' is not allowed for subcommand '{verb}'")]
    FlagNotAllowed {
        /// The rejected flag, without dashes
        flag: String,
        /// The verb it was supplied to
        verb: String,
    },
}

/// Errors produced while loading and validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// The config path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for the expected schema
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// The config path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// The TSIG secret file could not be read
    #[error("failed to read TSIG secret file {}: {source}", path.display())]
    SecretFile {
        /// The secret path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// A semantic constraint on the configuration failed
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// What is wrong
        reason: String,
    },
}

/// Errors produced by the zone-file emitter.
#[derive(Error, Debug)]
pub enum ZoneFileError {
    /// Writing or syncing the temporary file, or the final rename, failed
    #[error("failed to write zone file {}: {source}", path.display())]
    Write {
        /// The target zone file path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Removing the zone file failed for a reason other than absence
    #[error("failed to remove zone file {}: {source}", path.display())]
    Remove {
        /// The target zone file path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Composite error type for every bindctl operation.
///
/// Operation entry points return this type; the binary maps it onto a process
/// exit code and a machine-readable kind for the JSON error object.
#[derive(Error, Debug)]
pub enum CtlError {
    /// Domain-name normalization failure
    #[error(transparent)]
    Name(#[from] NameError),

    /// Per-zone lock failure
    #[error(transparent)]
    Lock(#[from] LockError),

    /// rndc adapter failure
    #[error(transparent)]
    Rndc(#[from] RndcError),

    /// Dynamic-update transport failure
    #[error(transparent)]
    Update(#[from] UpdateError),

    /// RDATA or TTL validation failure
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Policy-gate violation
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Forced-command gate rejection
    #[error(transparent)]
    Ssh(#[from] SshError),

    /// Configuration failure
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Zone-file emitter failure
    #[error(transparent)]
    ZoneFile(#[from] ZoneFileError),

    /// Invariant violation; seeing this is a bug
    #[error("internal error: {0}")]
    Internal(String),
}

impl CtlError {
    /// Map this error onto the documented process exit code.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Name(_) | Self::Validation(_) | Self::Ssh(_) => EXIT_VALIDATION,

            Self::Config(_) | Self::Rndc(RndcError::BinaryNotFound { .. }) => EXIT_PRECONDITION,

            Self::Rndc(_) | Self::Update(_) | Self::ZoneFile(_) | Self::Lock(LockError::Io { .. }) => {
                EXIT_RUNTIME
            }

            Self::Policy(_) | Self::Lock(LockError::Contended { .. }) => EXIT_CONFLICT,

            Self::Lock(LockError::Reentry { .. }) | Self::Internal(_) => EXIT_INTERNAL,
        }
    }

    /// Stable machine-readable category for the JSON error object.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.exit_code() {
            EXIT_VALIDATION => "validation",
            EXIT_PRECONDITION => "precondition",
            EXIT_RUNTIME => "runtime",
            EXIT_CONFLICT => "conflict",
            _ => "internal",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
