// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! bindctl - SSH-invoked control CLI for a hidden-primary BIND 9.
//!
//! Every operation prints one JSON document on stdout and exits with a
//! deterministic code: 0 success, 2 validation, 3 precondition, 4 runtime,
//! 5 conflict, 6 internal. Diagnostics go to stderr as JSON log lines.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use bindctl::acme::AcmeHandler;
use bindctl::audit::{new_request_id, AuditWriter, OpResult};
use bindctl::config::Config;
use bindctl::constants::{
    DEFAULT_ACME_TTL_SECS, DEFAULT_CONFIG_PATH, DEFAULT_RECORD_TTL_SECS, DEFAULT_ZONE_LIST_LIMIT,
};
use bindctl::errors::{CtlError, EXIT_VALIDATION};
use bindctl::rndc::RndcClient;
use bindctl::rrset::RrsetManager;
use bindctl::ssh;
use bindctl::zone::{ZoneCreator, ZoneDeleter, ZoneStatusChecker};

/// Control tool for a hidden-primary BIND 9: zone lifecycle via catalog
/// zones, record management via RFC 2136 with TSIG.
#[derive(Debug, Parser)]
#[command(name = "bindctl", version, about)]
struct Cli {
    /// Config file path
    #[arg(short = 'c', long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run readiness checks against the local BIND installation
    Doctor,
    /// Print version information
    Version,
    /// Zone lifecycle management
    Zone {
        #[command(subcommand)]
        command: ZoneCommand,
    },
    /// RRset management
    Rrset {
        #[command(subcommand)]
        command: RrsetCommand,
    },
    /// ACME DNS-01 challenge helpers
    Acme {
        #[command(subcommand)]
        command: AcmeCommand,
    },
    /// SSH forced-command wrapper mode
    #[command(name = "ssh-wrap", hide = true)]
    SshWrap,
}

#[derive(Debug, Subcommand)]
enum ZoneCommand {
    /// Create a new authoritative primary zone
    Create {
        /// Zone apex
        zone: String,
    },
    /// Delete a zone
    Delete {
        /// Zone apex
        zone: String,
    },
    /// Show zone status
    Status {
        /// Zone apex
        zone: String,
    },
    /// List zones known to this host
    List {
        /// Maximum number of zones to return
        #[arg(short = 'n', long, default_value_t = DEFAULT_ZONE_LIST_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
enum RrsetCommand {
    /// Create or replace an RRset
    Upsert(UpsertArgs),
    /// Delete an RRset
    Delete {
        /// Zone apex
        zone: String,
        /// Owner name (`@`, relative, or absolute)
        owner: String,
        /// Record type
        #[arg(value_name = "TYPE")]
        rrtype: String,
    },
    /// Read an RRset from the authoritative server
    Get {
        /// Zone apex
        zone: String,
        /// Owner name (`@`, relative, or absolute)
        owner: String,
        /// Record type
        #[arg(value_name = "TYPE")]
        rrtype: String,
    },
}

#[derive(Debug, Args)]
struct UpsertArgs {
    /// Zone apex
    zone: String,
    /// Owner name (`@`, relative, or absolute)
    owner: String,
    /// Record type
    #[arg(value_name = "TYPE")]
    rrtype: String,
    /// RDATA values, one argument per record
    #[arg(required = true)]
    rdata: Vec<String>,
    /// TTL for the RRset
    #[arg(short, long, default_value_t = DEFAULT_RECORD_TTL_SECS)]
    ttl: u32,
}

#[derive(Debug, Subcommand)]
enum AcmeCommand {
    /// Publish a DNS-01 challenge TXT record
    Present {
        /// Zone apex
        zone: String,
        /// FQDN the certificate is for
        fqdn: String,
        /// Challenge value
        value: String,
        /// TTL for the TXT record
        #[arg(short, long, default_value_t = DEFAULT_ACME_TTL_SECS)]
        ttl: u32,
    },
    /// Remove a DNS-01 challenge TXT record
    Cleanup {
        /// Zone apex
        zone: String,
        /// FQDN the certificate is for
        fqdn: String,
        /// Challenge value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();
    initialize_logging(cli.verbose);

    let actor = ssh::resolve_actor();
    std::process::exit(run(cli, actor));
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise defaults to INFO (DEBUG with
/// `--verbose`). `RUST_LOG_FORMAT=text` switches from the default JSON
/// lines to a compact human format. All logging goes to stderr; stdout is
/// reserved for the result document.
fn initialize_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    match log_format.to_lowercase().as_str() {
        "text" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .json()
                .init();
        }
    }
}

fn run(cli: Cli, actor: Option<String>) -> i32 {
    match cli.command {
        Command::Version => {
            println!("bindctl version {}", env!("CARGO_PKG_VERSION"));
            println!("RFC 2136 client: hickory-client");
            println!("control channel: rndc");
            0
        }

        Command::SshWrap => run_ssh_wrap(&cli.config),

        Command::Doctor => with_config(&cli.config, "doctor", actor, |config, result| {
            result.add_change("config_loaded");
            doctor_probes(config, result);
            Ok(None)
        }),

        Command::Zone { command } => match command {
            ZoneCommand::Create { zone } => {
                with_config(&cli.config, "zone_create", actor, |config, result| {
                    let creator = ZoneCreator::new(config)?;
                    creator.create(&zone, result)?;
                    Ok(None)
                })
            }
            ZoneCommand::Delete { zone } => {
                with_config(&cli.config, "zone_delete", actor, |config, result| {
                    let deleter = ZoneDeleter::new(config)?;
                    deleter.delete(&zone, result)?;
                    Ok(None)
                })
            }
            ZoneCommand::Status { zone } => {
                with_config(&cli.config, "zone_status", actor, |config, result| {
                    let checker = ZoneStatusChecker::new(config)?;
                    let report = checker.status(&zone)?;
                    result.zone = Some(report.zone.clone());
                    if report.present {
                        result.add_change("zone_exists");
                    }
                    if report.in_catalog {
                        result.add_change("in_catalog");
                    }
                    Ok(Some(pretty(&report)?))
                })
            }
            ZoneCommand::List { limit } => {
                with_config(&cli.config, "zone_list", actor, move |config, _result| {
                    let listing = list_zones(config, limit);
                    Ok(Some(pretty(&listing)?))
                })
            }
        },

        Command::Rrset { command } => match command {
            RrsetCommand::Upsert(args) => {
                with_config(&cli.config, "rrset_upsert", actor, move |config, result| {
                    let manager = RrsetManager::new(config)?;
                    manager.upsert(
                        &args.zone,
                        &args.owner,
                        &args.rrtype,
                        args.ttl,
                        &args.rdata,
                        result,
                    )?;
                    Ok(None)
                })
            }
            RrsetCommand::Delete { zone, owner, rrtype } => {
                with_config(&cli.config, "rrset_delete", actor, move |config, result| {
                    let manager = RrsetManager::new(config)?;
                    manager.delete(&zone, &owner, &rrtype, result)?;
                    Ok(None)
                })
            }
            RrsetCommand::Get { zone, owner, rrtype } => {
                with_config(&cli.config, "rrset_get", actor, move |config, result| {
                    let manager = RrsetManager::new(config)?;
                    manager.get(&zone, &owner, &rrtype, result)?;
                    Ok(None)
                })
            }
        },

        Command::Acme { command } => match command {
            AcmeCommand::Present {
                zone,
                fqdn,
                value,
                ttl,
            } => with_config(&cli.config, "acme_present", actor, move |config, result| {
                let handler = AcmeHandler::new(config)?;
                let outcome = handler.present(&zone, &fqdn, &value, ttl, result)?;
                Ok(Some(pretty(&outcome)?))
            }),
            AcmeCommand::Cleanup { zone, fqdn, value } => {
                with_config(&cli.config, "acme_cleanup", actor, move |config, result| {
                    let handler = AcmeHandler::new(config)?;
                    handler.cleanup(&zone, &fqdn, &value, result)?;
                    Ok(None)
                })
            }
        },
    }
}

/// Load the configuration and run one operation inside its span, printing
/// either the operation's own JSON document or the default result object,
/// writing the audit entry either way.
fn with_config<F>(config_path: &Path, op: &str, actor: Option<String>, f: F) -> i32
where
    F: FnOnce(&Config, &mut OpResult) -> Result<Option<String>, CtlError>,
{
    let request_id = new_request_id();
    let span = tracing::info_span!(
        "operation",
        request_id = %request_id,
        op = %op,
        actor = actor.as_deref().unwrap_or("-")
    );
    let _guard = span.enter();

    let mut result = OpResult::new(op, &request_id);

    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(err) => {
            let err = CtlError::from(err);
            error!("{err}");
            result.fail(&err);
            result.print();
            return err.exit_code();
        }
    };

    let actor_for_audit = if config.logging.include_actor {
        actor.as_deref()
    } else {
        None
    };
    let mut audit = AuditWriter::open(config.logging.audit_jsonl.as_deref());
    let started = Instant::now();

    let exit_code = match f(&config, &mut result) {
        Ok(Some(document)) => {
            println!("{document}");
            0
        }
        Ok(None) => {
            result.print();
            0
        }
        Err(err) => {
            error!("{err}");
            result.fail(&err);
            result.print();
            err.exit_code()
        }
    };

    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    audit.write(&result, actor_for_audit, Some(duration_ms));

    exit_code
}

/// Validate and re-dispatch the command received over SSH.
fn run_ssh_wrap(config_path: &Path) -> i32 {
    let wrapped = match ssh::wrap_from_env() {
        Ok(wrapped) => wrapped,
        Err(err) => {
            let err = CtlError::from(err);
            error!("{err}");
            let mut result = OpResult::new("ssh_wrap", &new_request_id());
            result.fail(&err);
            result.print();
            return err.exit_code();
        }
    };

    let mut argv = vec![
        "bindctl".to_string(),
        "--config".to_string(),
        config_path.display().to_string(),
    ];
    argv.extend(wrapped.argv.iter().cloned());

    match Cli::try_parse_from(argv) {
        Ok(inner) => run(inner, wrapped.actor),
        Err(err) => {
            error!("rejected forced command: {err}");
            let mut result = OpResult::new("ssh_wrap", &new_request_id());
            result.fail(&CtlError::Internal(format!(
                "forced command did not parse: {}",
                wrapped.argv.join(" ")
            )));
            result.print();
            EXIT_VALIDATION
        }
    }
}

/// The doctor's readiness probes: adapter paths, then a live control-channel
/// round trip. Probes degrade to warnings so operators get the whole
/// picture in one run.
fn doctor_probes(config: &Config, result: &mut OpResult) {
    if config.bind.rndc_path.exists() {
        result.add_change("rndc_found");
    } else {
        result.add_warning(&format!(
            "rndc not found: {}",
            config.bind.rndc_path.display()
        ));
    }

    if config.bind.rndc_conf.exists() {
        result.add_change("rndc_conf_found");
    } else {
        result.add_warning(&format!(
            "rndc.conf not found: {}",
            config.bind.rndc_conf.display()
        ));
    }

    if config.zones.dir.is_dir() {
        result.add_change("zones_dir_found");
    } else {
        result.add_warning(&format!(
            "zones directory missing: {}",
            config.zones.dir.display()
        ));
    }

    let rndc = RndcClient::new(&config.bind);
    match rndc.status() {
        Ok(_) => {
            result.add_change("bind_reachable");
            info!("BIND control channel is reachable");
        }
        Err(err) => result.add_warning(&format!("BIND control channel unreachable: {err}")),
    }
}

#[derive(Debug, serde::Serialize)]
struct ZoneListing {
    zones: Vec<ZoneListEntry>,
    count: usize,
}

#[derive(Debug, serde::Serialize)]
struct ZoneListEntry {
    zone: String,
    file: String,
}

/// Best-effort enumeration of the zone files on disk.
fn list_zones(config: &Config, limit: usize) -> ZoneListing {
    let suffix = format!(".{}", config.zones.file_extension);
    let mut zones: Vec<ZoneListEntry> = Vec::new();

    if let Ok(entries) = std::fs::read_dir(&config.zones.dir) {
        for entry in entries.flatten() {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = file_name.strip_suffix(&suffix) {
                zones.push(ZoneListEntry {
                    zone: format!("{stem}."),
                    file: entry.path().display().to_string(),
                });
            }
        }
    }

    zones.sort_by(|a, b| a.zone.cmp(&b.zone));
    zones.truncate(limit);

    let count = zones.len();
    ZoneListing { zones, count }
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, CtlError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CtlError::Internal(format!("failed to serialize result: {err}")))
}
