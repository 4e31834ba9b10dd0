// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `validate.rs`

use super::*;
use crate::config::Config;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn policy_config() -> Config {
    Config::default()
}

#[test]
fn test_parse_rrtype() {
    assert_eq!(parse_rrtype("A").unwrap(), RecordType::A);
    assert_eq!(parse_rrtype("a").unwrap(), RecordType::A);
    assert_eq!(parse_rrtype("aaaa").unwrap(), RecordType::AAAA);
    assert_eq!(parse_rrtype("TxT").unwrap(), RecordType::TXT);
    assert!(parse_rrtype("BOGUS").is_err());
    assert!(parse_rrtype("").is_err());
}

#[test]
fn test_empty_rdata_rejected_for_every_type() {
    for rrtype in ["A", "AAAA", "CNAME", "TXT", "MX", "SRV", "CAA", "NS"] {
        assert!(matches!(
            validate_rdata(rrtype, &[]),
            Err(ValidationError::EmptyRdata { .. })
        ));
    }
}

#[test]
fn test_a_rdata() {
    assert!(validate_rdata("A", &strings(&["192.0.2.1"])).is_ok());
    assert!(validate_rdata("A", &strings(&["192.0.2.1", "192.0.2.2"])).is_ok());
    assert!(validate_rdata("A", &strings(&["not-an-ip"])).is_err());
    assert!(validate_rdata("A", &strings(&["2001:db8::1"])).is_err());
    assert!(validate_rdata("A", &strings(&["192.0.2.1", "bad"])).is_err());
    assert!(validate_rdata("A", &strings(&["192.0.2.256"])).is_err());
}

#[test]
fn test_aaaa_rdata() {
    assert!(validate_rdata("AAAA", &strings(&["2001:db8::1"])).is_ok());
    assert!(validate_rdata("AAAA", &strings(&["::1"])).is_ok());
    assert!(validate_rdata("AAAA", &strings(&["192.0.2.1"])).is_err());
    assert!(validate_rdata("AAAA", &strings(&["nope"])).is_err());
}

#[test]
fn test_cname_rdata() {
    assert!(validate_rdata("CNAME", &strings(&["target.example.com."])).is_ok());
    assert!(validate_rdata("CNAME", &strings(&["   "])).is_err());
}

#[test]
fn test_txt_rdata() {
    assert!(validate_rdata("TXT", &strings(&["hello world"])).is_ok());
    assert!(validate_rdata("TXT", &strings(&["v=spf1 -all", "second"])).is_ok());
}

#[test]
fn test_mx_rdata() {
    assert!(validate_rdata("MX", &strings(&["10 mail.example.com."])).is_ok());
    assert!(validate_rdata("MX", &strings(&["mail.example.com."])).is_err());
    assert!(validate_rdata("MX", &strings(&["70000 mail.example.com."])).is_err());
    assert!(validate_rdata("MX", &strings(&["ten mail.example.com."])).is_err());
    assert!(validate_rdata("MX", &strings(&["10 mail.example.com. extra"])).is_err());
}

#[test]
fn test_srv_rdata() {
    assert!(validate_rdata("SRV", &strings(&["10 20 5060 sip.example.com."])).is_ok());
    assert!(validate_rdata("SRV", &strings(&["10 20 sip.example.com."])).is_err());
    assert!(validate_rdata("SRV", &strings(&["10 20 70000 sip.example.com."])).is_err());
    assert!(validate_rdata("SRV", &strings(&["a b c d"])).is_err());
}

#[test]
fn test_caa_rdata() {
    assert!(validate_rdata("CAA", &strings(&["0 issue letsencrypt.org"])).is_ok());
    assert!(validate_rdata("CAA", &strings(&["1 issuewild example.com"])).is_ok());
    assert!(validate_rdata("CAA", &strings(&["0 iodef mailto:sec@example.com"])).is_ok());
    assert!(validate_rdata("CAA", &strings(&["2 issue letsencrypt.org"])).is_err());
    assert!(validate_rdata("CAA", &strings(&["0 badtag value"])).is_err());
    assert!(validate_rdata("CAA", &strings(&["0 issue"])).is_err());
}

#[test]
fn test_ns_rdata() {
    assert!(validate_rdata("NS", &strings(&["ns1.example.com."])).is_ok());
    assert!(validate_rdata("NS", &strings(&["  "])).is_err());
}

#[test]
fn test_apex_cname_ban() {
    let config = policy_config();
    let err = validate_policy(&config, "example.com.", "example.com.", "CNAME").unwrap_err();
    assert!(matches!(err, PolicyError::ApexCname));
    assert!(err.to_string().contains("CNAME at zone apex"));

    // below the apex is fine
    assert!(validate_policy(&config, "example.com.", "www.example.com.", "CNAME").is_ok());
}

#[test]
fn test_apex_cname_allowed_when_gate_disabled() {
    let mut config = policy_config();
    config.policy.disallow_apex_cname = false;
    assert!(validate_policy(&config, "example.com.", "example.com.", "CNAME").is_ok());
}

#[test]
fn test_ns_update_ban() {
    let config = policy_config();
    assert!(matches!(
        validate_policy(&config, "example.com.", "sub.example.com.", "NS"),
        Err(PolicyError::NsUpdate)
    ));

    let mut relaxed = policy_config();
    relaxed.policy.disallow_ns_updates = false;
    assert!(validate_policy(&relaxed, "example.com.", "sub.example.com.", "NS").is_ok());
}

#[test]
fn test_policy_ignores_other_types() {
    let config = policy_config();
    assert!(validate_policy(&config, "example.com.", "example.com.", "A").is_ok());
    assert!(validate_policy(&config, "example.com.", "example.com.", "TXT").is_ok());
}

fn owner() -> Name {
    Name::from_ascii("www.example.com.").unwrap()
}

#[test]
fn test_build_a_record() {
    let record = build_record(&owner(), RecordType::A, 300, "192.0.2.1").unwrap();
    assert_eq!(record.record_type(), RecordType::A);
    assert_eq!(record.ttl(), 300);
    assert_eq!(record.dns_class(), DNSClass::IN);
    assert_eq!(rdata_to_string(&record).unwrap(), "192.0.2.1");
}

#[test]
fn test_build_aaaa_record_renders_canonically() {
    let record = build_record(&owner(), RecordType::AAAA, 300, "2001:DB8:0:0:0:0:0:1").unwrap();
    assert_eq!(rdata_to_string(&record).unwrap(), "2001:db8::1");
}

#[test]
fn test_build_cname_record() {
    let record = build_record(&owner(), RecordType::CNAME, 300, "target.example.com.").unwrap();
    assert_eq!(rdata_to_string(&record).unwrap(), "target.example.com.");
}

#[test]
fn test_build_txt_record_roundtrip() {
    let record = build_record(&owner(), RecordType::TXT, 60, "v=spf1 -all").unwrap();
    assert_eq!(rdata_to_string(&record).unwrap(), "v=spf1 -all");
}

#[test]
fn test_build_mx_record_roundtrip() {
    let record = build_record(&owner(), RecordType::MX, 300, "10 mail.example.com.").unwrap();
    assert_eq!(rdata_to_string(&record).unwrap(), "10 mail.example.com.");
}

#[test]
fn test_build_srv_record_roundtrip() {
    let record =
        build_record(&owner(), RecordType::SRV, 300, "10 20 5060 sip.example.com.").unwrap();
    assert_eq!(rdata_to_string(&record).unwrap(), "10 20 5060 sip.example.com.");
}

#[test]
fn test_build_caa_issue_roundtrip() {
    let record = build_record(&owner(), RecordType::CAA, 300, "0 issue letsencrypt.org").unwrap();
    let rendered = rdata_to_string(&record).unwrap();
    assert!(rendered.starts_with("0 issue "));
    assert!(rendered.contains("letsencrypt.org"));
}

#[test]
fn test_build_caa_iodef() {
    let record = build_record(
        &owner(),
        RecordType::CAA,
        300,
        "0 iodef mailto:security@example.com",
    )
    .unwrap();
    let rendered = rdata_to_string(&record).unwrap();
    assert!(rendered.starts_with("0 iodef mailto:"));
}

#[test]
fn test_build_record_bad_values() {
    assert!(build_record(&owner(), RecordType::A, 300, "bogus").is_err());
    assert!(build_record(&owner(), RecordType::MX, 300, "10").is_err());
    assert!(build_record(&owner(), RecordType::SRV, 300, "1 2 3").is_err());
    assert!(build_record(&owner(), RecordType::CAA, 300, "0 iodef not-a-url").is_err());
}
