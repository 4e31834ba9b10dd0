// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RDATA validation, policy gates and record construction.
//!
//! Validation happens on the operator's text input before any lock or
//! network traffic: per-type well-formedness, the configured type
//! allowlist, the apex-CNAME and NS-update bans, and the TTL range.
//! [`build_record`] then turns each validated value into a wire-ready
//! record; [`rdata_to_string`] is its inverse for query results, rendering
//! every type in its canonical space-separated presentation form.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use hickory_client::rr::rdata::caa::{Property, Value};
use hickory_client::rr::rdata::{CAA, CNAME, MX, NS, PTR, SRV, TXT};
use hickory_client::rr::{DNSClass, Name, RData, Record, RecordType};
use url::Url;

use crate::config::Config;
use crate::errors::{PolicyError, ValidationError};
use crate::names::is_apex_owner;

/// Parse a record type from operator input, case-insensitively.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownType`] for unrecognized input.
pub fn parse_rrtype(input: &str) -> Result<RecordType, ValidationError> {
    let upper = input.to_ascii_uppercase();
    match RecordType::from_str(&upper) {
        Ok(RecordType::Unknown(_)) | Err(_) => Err(ValidationError::UnknownType {
            rrtype: input.to_string(),
        }),
        Ok(record_type) => Ok(record_type),
    }
}

/// Validate a full RDATA list for a record type.
///
/// Every type rejects an empty list; the per-value rules follow the
/// record's presentation format.
///
/// # Errors
///
/// Returns a [`ValidationError`] identifying the offending value.
pub fn validate_rdata(rrtype: &str, rdata: &[String]) -> Result<(), ValidationError> {
    let upper = rrtype.to_ascii_uppercase();

    if rdata.is_empty() {
        return Err(ValidationError::EmptyRdata { rrtype: upper });
    }

    match upper.as_str() {
        "A" => {
            for value in rdata {
                if value.parse::<Ipv4Addr>().is_err() || value.contains(':') {
                    return Err(invalid(&upper, value, "not an IPv4 address"));
                }
            }
        }
        "AAAA" => {
            for value in rdata {
                if value.parse::<Ipv6Addr>().is_err() || !value.contains(':') {
                    return Err(invalid(&upper, value, "not an IPv6 address"));
                }
            }
        }
        "CNAME" => {
            let target = rdata[0].trim();
            if target.is_empty() {
                return Err(invalid(&upper, &rdata[0], "target cannot be empty"));
            }
        }
        "TXT" => {
            // any non-empty list is accepted; the 255-octet per-string
            // limit is enforced at wire encoding
        }
        "MX" => {
            for value in rdata {
                let parts: Vec<&str> = value.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(invalid(&upper, value, "expected: <preference> <host>"));
                }
                if parts[0].parse::<u16>().is_err() {
                    return Err(invalid(&upper, value, "preference must be a 16-bit integer"));
                }
                if parts[1].is_empty() {
                    return Err(invalid(&upper, value, "host cannot be empty"));
                }
            }
        }
        "SRV" => {
            for value in rdata {
                let parts: Vec<&str> = value.split_whitespace().collect();
                if parts.len() != 4 {
                    return Err(invalid(
                        &upper,
                        value,
                        "expected: <priority> <weight> <port> <target>",
                    ));
                }
                for (index, field) in ["priority", "weight", "port"].iter().enumerate() {
                    if parts[index].parse::<u16>().is_err() {
                        return Err(invalid(
                            &upper,
                            value,
                            &format!("{field} must be a 16-bit integer"),
                        ));
                    }
                }
                if parts[3].is_empty() {
                    return Err(invalid(&upper, value, "target cannot be empty"));
                }
            }
        }
        "CAA" => {
            for value in rdata {
                let parts: Vec<&str> = value.split_whitespace().collect();
                if parts.len() < 3 {
                    return Err(invalid(&upper, value, "expected: <flags> <tag> <value>"));
                }
                if !matches!(parts[0], "0" | "1") {
                    return Err(invalid(&upper, value, "flags must be 0 or 1"));
                }
                if !matches!(parts[1], "issue" | "issuewild" | "iodef") {
                    return Err(invalid(
                        &upper,
                        value,
                        "tag must be issue, issuewild, or iodef",
                    ));
                }
            }
        }
        "NS" => {
            for value in rdata {
                if value.trim().is_empty() {
                    return Err(invalid(&upper, value, "nameserver cannot be empty"));
                }
            }
        }
        _ => {
            // recognized but unhandled types only need a non-empty list,
            // which was checked above
        }
    }

    Ok(())
}

/// Enforce the configured policy gates for a mutation.
///
/// # Errors
///
/// Returns [`PolicyError`] when the apex-CNAME or NS-update ban applies.
pub fn validate_policy(
    config: &Config,
    zone: &str,
    owner: &str,
    rrtype: &str,
) -> Result<(), PolicyError> {
    let upper = rrtype.to_ascii_uppercase();

    if config.policy.disallow_apex_cname && upper == "CNAME" && is_apex_owner(owner, zone) {
        return Err(PolicyError::ApexCname);
    }

    if config.policy.disallow_ns_updates && upper == "NS" {
        return Err(PolicyError::NsUpdate);
    }

    Ok(())
}

/// Build a wire-ready record from one validated RDATA value.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the value does not convert; with
/// [`validate_rdata`] run first this only fires for malformed embedded
/// names.
pub fn build_record(
    owner: &Name,
    record_type: RecordType,
    ttl: u32,
    value: &str,
) -> Result<Record, ValidationError> {
    let rrtype = record_type.to_string();

    let rdata = match record_type {
        RecordType::A => {
            let addr = value
                .parse::<Ipv4Addr>()
                .map_err(|_| invalid(&rrtype, value, "not an IPv4 address"))?;
            RData::A(addr.into())
        }
        RecordType::AAAA => {
            let addr = value
                .parse::<Ipv6Addr>()
                .map_err(|_| invalid(&rrtype, value, "not an IPv6 address"))?;
            RData::AAAA(addr.into())
        }
        RecordType::CNAME => RData::CNAME(CNAME(parse_target(&rrtype, value.trim())?)),
        RecordType::TXT => RData::TXT(TXT::new(vec![value.to_string()])),
        RecordType::MX => {
            let parts: Vec<&str> = value.split_whitespace().collect();
            if parts.len() != 2 {
                return Err(invalid(&rrtype, value, "expected: <preference> <host>"));
            }
            let preference = parts[0]
                .parse::<u16>()
                .map_err(|_| invalid(&rrtype, value, "preference must be a 16-bit integer"))?;
            RData::MX(MX::new(preference, parse_target(&rrtype, parts[1])?))
        }
        RecordType::SRV => {
            let parts: Vec<&str> = value.split_whitespace().collect();
            if parts.len() != 4 {
                return Err(invalid(
                    &rrtype,
                    value,
                    "expected: <priority> <weight> <port> <target>",
                ));
            }
            let priority = parse_u16(&rrtype, value, parts[0])?;
            let weight = parse_u16(&rrtype, value, parts[1])?;
            let port = parse_u16(&rrtype, value, parts[2])?;
            RData::SRV(SRV::new(
                priority,
                weight,
                port,
                parse_target(&rrtype, parts[3])?,
            ))
        }
        RecordType::CAA => build_caa(&rrtype, value)?,
        RecordType::NS => RData::NS(NS(parse_target(&rrtype, value.trim())?)),
        RecordType::PTR => RData::PTR(PTR(parse_target(&rrtype, value.trim())?)),
        other => {
            return Err(ValidationError::UnknownType {
                rrtype: other.to_string(),
            });
        }
    };

    let mut record = Record::from_rdata(owner.clone(), ttl, rdata);
    record.set_dns_class(DNSClass::IN);
    Ok(record)
}

/// Render a record's RDATA in canonical presentation form.
///
/// Addresses render canonically; MX, SRV and CAA as their space-separated
/// fields; TXT strings joined by a single space. Returns `None` for types
/// this tool does not manage.
#[must_use]
pub fn rdata_to_string(record: &Record) -> Option<String> {
    match record.data() {
        Some(RData::A(addr)) => Some(addr.to_string()),
        Some(RData::AAAA(addr)) => Some(addr.to_string()),
        Some(RData::CNAME(cname)) => Some(cname.to_string()),
        Some(RData::TXT(txt)) => Some(
            txt.txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Some(RData::MX(mx)) => Some(format!("{} {}", mx.preference(), mx.exchange())),
        Some(RData::SRV(srv)) => Some(format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target()
        )),
        Some(RData::CAA(caa)) => Some(format_caa(caa)),
        Some(RData::NS(ns)) => Some(ns.to_string()),
        Some(RData::PTR(ptr)) => Some(ptr.to_string()),
        _ => None,
    }
}

fn build_caa(rrtype: &str, value: &str) -> Result<RData, ValidationError> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(invalid(rrtype, value, "expected: <flags> <tag> <value>"));
    }

    let critical = match parts[0] {
        "0" => false,
        "1" => true,
        _ => return Err(invalid(rrtype, value, "flags must be 0 or 1")),
    };

    let tag_value = parts[2..].join(" ");
    let tag_value = tag_value.trim_matches('"');

    let caa = match parts[1] {
        "issue" | "issuewild" => {
            let issuer = if tag_value == ";" {
                None
            } else {
                Some(parse_target(rrtype, tag_value)?)
            };
            if parts[1] == "issue" {
                CAA::new_issue(critical, issuer, Vec::new())
            } else {
                CAA::new_issuewild(critical, issuer, Vec::new())
            }
        }
        "iodef" => {
            let url = Url::parse(tag_value)
                .map_err(|_| invalid(rrtype, value, "iodef value must be a URL"))?;
            CAA::new_iodef(critical, url)
        }
        _ => {
            return Err(invalid(
                rrtype,
                value,
                "tag must be issue, issuewild, or iodef",
            ));
        }
    };

    Ok(RData::CAA(caa))
}

fn format_caa(caa: &CAA) -> String {
    let flags = u8::from(caa.issuer_critical());
    let tag = match caa.tag() {
        Property::Issue => "issue",
        Property::IssueWild => "issuewild",
        Property::Iodef => "iodef",
        Property::Unknown(tag) => tag.as_str(),
    };
    let value = match caa.value() {
        Value::Issuer(Some(name), _) => name.to_string(),
        Value::Issuer(None, _) => ";".to_string(),
        Value::Url(url) => url.to_string(),
        Value::Unknown(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    };
    format!("{flags} {tag} {value}")
}

fn parse_target(rrtype: &str, value: &str) -> Result<Name, ValidationError> {
    Name::from_str(value).map_err(|err| invalid(rrtype, value, &err.to_string()))
}

fn parse_u16(rrtype: &str, value: &str, field: &str) -> Result<u16, ValidationError> {
    field
        .parse::<u16>()
        .map_err(|_| invalid(rrtype, value, "expected a 16-bit integer"))
}

fn invalid(rrtype: &str, value: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidRdata {
        rrtype: rrtype.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod validate_tests;
