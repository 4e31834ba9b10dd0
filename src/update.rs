// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! RFC 2136 dynamic-update transport with TSIG authentication.
//!
//! Message construction is kept separate from the wire: the `build_*`
//! functions return fully formed update messages (zone section plus update
//! section) that the tests can inspect without a server, and
//! [`UpdateClient::exchange`] signs and ships them.
//!
//! Replacement semantics follow the delete-then-insert pattern inside a
//! single update message: a delete-RRset record (class ANY, TTL 0, empty
//! RDATA) for the shared (owner, type) followed by the inserts (class IN).
//! The server applies one update message atomically, which is what makes
//! repeated catalog upserts idempotent.
//!
//! Updates travel over TCP and carry TSIG; queries travel over UDP with
//! RD=0 and are unsigned.

use std::net::SocketAddr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hickory_client::client::{Client, SyncClient};
use hickory_client::op::ResponseCode;
use hickory_client::rr::rdata::tsig::TsigAlgorithm;
use hickory_client::rr::{DNSClass, Name, RData, Record, RecordType};
use hickory_client::tcp::TcpClientConnection;
use hickory_client::udp::UdpClientConnection;
use hickory_proto::op::update_message::UpdateMessage;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::dnssec::tsig::TSigner;
use hickory_proto::rr::rdata::PTR;
use hickory_proto::xfer::{DnsRequest, DnsRequestOptions, DnsResponse};
use std::str::FromStr;
use tracing::debug;

use crate::config::{Config, TsigConfig};
use crate::constants::{CATALOG_ZONES_LABEL, DEFAULT_OP_TIMEOUT_SECS, TSIG_FUDGE_TIME_SECS};
use crate::errors::UpdateError;

/// TSIG key material for signing updates.
#[derive(Debug, Clone)]
pub struct TsigKeyData {
    /// Key name as known to the server
    pub name: String,
    /// HMAC algorithm (e.g., "hmac-sha256", "hmac-sha512")
    pub algorithm: String,
    /// Base64-encoded secret
    pub secret: String,
}

impl From<&TsigConfig> for TsigKeyData {
    fn from(tsig: &TsigConfig) -> Self {
        Self {
            name: tsig.name.clone(),
            algorithm: tsig.algorithm.clone(),
            secret: tsig.secret.clone(),
        }
    }
}

/// Create a TSIG signer from key material.
///
/// The signer stamps each message with the current UNIX time and the
/// standard 300 second fudge.
///
/// # Errors
///
/// Returns [`UpdateError::Tsig`] if the algorithm is unsupported, the secret
/// is not valid base64, or the key name does not parse.
pub fn create_tsig_signer(key_data: &TsigKeyData) -> Result<TSigner, UpdateError> {
    let algorithm = match key_data.algorithm.to_ascii_lowercase().as_str() {
        "hmac-md5" => TsigAlgorithm::HmacMd5,
        "hmac-sha1" => TsigAlgorithm::HmacSha1,
        "hmac-sha224" => TsigAlgorithm::HmacSha224,
        "hmac-sha256" => TsigAlgorithm::HmacSha256,
        "hmac-sha384" => TsigAlgorithm::HmacSha384,
        "hmac-sha512" => TsigAlgorithm::HmacSha512,
        other => {
            return Err(UpdateError::Tsig {
                reason: format!(
                    "unsupported TSIG algorithm '{other}'; supported: hmac-md5, hmac-sha1, hmac-sha224, hmac-sha256, hmac-sha384, hmac-sha512"
                ),
            });
        }
    };

    let key_bytes = BASE64
        .decode(&key_data.secret)
        .map_err(|err| UpdateError::Tsig {
            reason: format!("failed to decode TSIG secret: {err}"),
        })?;

    let signer_name = Name::from_ascii(&key_data.name).map_err(|err| UpdateError::Tsig {
        reason: format!("invalid TSIG key name '{}': {err}", key_data.name),
    })?;

    TSigner::new(key_bytes, algorithm, signer_name, TSIG_FUDGE_TIME_SECS).map_err(|err| {
        UpdateError::Tsig {
            reason: format!("failed to create TSIG signer: {err}"),
        }
    })
}

/// Parse a canonical name into a [`Name`], forcing the trailing dot.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] when the name does not parse.
pub fn parse_name(name: &str) -> Result<Name, UpdateError> {
    let fqdn = if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{name}.")
    };
    Name::from_str(&fqdn).map_err(|err| UpdateError::InvalidName {
        name: name.to_string(),
        reason: err.to_string(),
    })
}

/// The catalog member owner name: `<label>.zones.<catalog-apex>`.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] when the composed name does not
/// parse.
pub fn catalog_member_owner(label: &str, catalog_zone: &str) -> Result<Name, UpdateError> {
    parse_name(&format!("{label}.{CATALOG_ZONES_LABEL}.{catalog_zone}"))
}

/// Empty skeleton of an RFC 2136 update message for a zone.
fn update_skeleton(zone: &Name) -> Message {
    let mut zone_query = Query::new();
    zone_query
        .set_name(zone.clone())
        .set_query_class(DNSClass::IN)
        .set_query_type(RecordType::SOA);

    let mut message = Message::new();
    message
        .set_id(rand::random())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Update)
        .set_recursion_desired(false);
    message.add_zone(zone_query);
    message
}

/// A delete-RRset update record: class ANY, TTL 0, empty RDATA.
fn delete_rrset_record(owner: &Name, record_type: RecordType) -> Record {
    let mut record = Record::new();
    record
        .set_name(owner.clone())
        .set_record_type(record_type)
        .set_dns_class(DNSClass::ANY)
        .set_ttl(0);
    record
}

/// Build a message replacing the whole RRset shared by `records`.
///
/// All records must share one (owner, type); the message deletes that RRset
/// and inserts the new members.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] when `records` is empty.
pub fn build_replace_rrset(zone: &Name, records: Vec<Record>) -> Result<Message, UpdateError> {
    let first = records.first().ok_or_else(|| UpdateError::InvalidName {
        name: zone.to_string(),
        reason: "cannot replace an RRset with no records".to_string(),
    })?;

    let mut message = update_skeleton(zone);
    message.add_update(delete_rrset_record(first.name(), first.record_type()));
    message.add_updates(records);
    Ok(message)
}

/// Build a message deleting the RRset at (owner, type).
#[must_use]
pub fn build_delete_rrset(zone: &Name, owner: &Name, record_type: RecordType) -> Message {
    let mut message = update_skeleton(zone);
    message.add_update(delete_rrset_record(owner, record_type));
    message
}

/// Build a message deleting every record at an owner name (type ANY).
#[must_use]
pub fn build_delete_all(zone: &Name, owner: &Name) -> Message {
    let mut message = update_skeleton(zone);
    message.add_update(delete_rrset_record(owner, RecordType::ANY));
    message
}

/// Build the idempotent catalog member upsert: delete the PTR RRset at
/// `<label>.zones.<catalog>` and insert PTR to the member apex.
///
/// Applying this message against steady state is a no-op, so two successive
/// upserts leave the catalog identical to one.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] when the member owner does not
/// compose into a valid name.
pub fn build_catalog_ptr_upsert(
    catalog_zone: &Name,
    member_zone: &Name,
    label: &str,
    ttl: u32,
) -> Result<Message, UpdateError> {
    let owner = catalog_member_owner(label, &catalog_zone.to_string())?;

    let mut ptr = Record::from_rdata(owner.clone(), ttl, RData::PTR(PTR(member_zone.clone())));
    ptr.set_dns_class(DNSClass::IN);

    let mut message = update_skeleton(catalog_zone);
    message.add_update(delete_rrset_record(&owner, RecordType::PTR));
    message.add_update(ptr);
    Ok(message)
}

/// Build the catalog member delete: remove the PTR RRset at
/// `<label>.zones.<catalog>`. Removing an absent member succeeds on the
/// server, so this is equally idempotent.
///
/// # Errors
///
/// Returns [`UpdateError::InvalidName`] when the member owner does not
/// compose into a valid name.
pub fn build_catalog_ptr_delete(catalog_zone: &Name, label: &str) -> Result<Message, UpdateError> {
    let owner = catalog_member_owner(label, &catalog_zone.to_string())?;
    Ok(build_delete_rrset(catalog_zone, &owner, RecordType::PTR))
}

/// Client for dynamic updates and queries against one DNS endpoint.
#[derive(Debug, Clone)]
pub struct UpdateClient {
    server: SocketAddr,
    endpoint: String,
    tsig: Option<TsigKeyData>,
    timeout: Duration,
}

impl UpdateClient {
    /// Create a client from the configuration's DNS endpoint and TSIG key.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::InvalidEndpoint`] when the endpoint does not
    /// parse as `addr:port`.
    pub fn new(config: &Config) -> Result<Self, UpdateError> {
        let endpoint = config.dns_endpoint();
        let server = endpoint
            .parse::<SocketAddr>()
            .map_err(|err| UpdateError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                reason: err.to_string(),
            })?;

        let tsig = if config.tsig.name.is_empty() || config.tsig.secret.is_empty() {
            None
        } else {
            Some(TsigKeyData::from(&config.tsig))
        };

        Ok(Self {
            server,
            endpoint,
            tsig,
            timeout: Duration::from_secs(DEFAULT_OP_TIMEOUT_SECS),
        })
    }

    /// Override the exchange deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sign and send an update message over TCP, requiring NOERROR.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] for connection failures, transport errors,
    /// missing responses, failed response verification and non-NOERROR
    /// response codes.
    pub fn exchange(&self, message: Message) -> Result<DnsResponse, UpdateError> {
        debug!(server = %self.endpoint, id = message.id(), "sending dynamic update");

        let conn = TcpClientConnection::with_timeout(self.server, self.timeout).map_err(|err| {
            UpdateError::Connect {
                server: self.endpoint.clone(),
                reason: err.to_string(),
            }
        })?;

        let request = DnsRequest::new(message, DnsRequestOptions::default());
        let responses = match &self.tsig {
            Some(key_data) => {
                let signer = create_tsig_signer(key_data)?;
                SyncClient::with_tsigner(conn, signer).send(request)
            }
            None => SyncClient::new(conn).send(request),
        };

        let response = self.first_response(responses)?;
        match response.response_code() {
            ResponseCode::NoError => Ok(response),
            rcode => Err(UpdateError::Refused {
                server: self.endpoint.clone(),
                rcode: rcode.to_string(),
            }),
        }
    }

    /// Send an unsigned UDP query with RD=0 (the peer is authoritative, not
    /// a resolver).
    ///
    /// NOERROR and NXDOMAIN both decode successfully; an empty answer
    /// section is the caller's signal for absence.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError`] for connection failures, transport errors and
    /// response codes other than NOERROR/NXDOMAIN.
    pub fn query(&self, name: &Name, record_type: RecordType) -> Result<DnsResponse, UpdateError> {
        debug!(server = %self.endpoint, %name, ?record_type, "querying");

        let conn = UdpClientConnection::with_timeout(self.server, self.timeout).map_err(|err| {
            UpdateError::Connect {
                server: self.endpoint.clone(),
                reason: err.to_string(),
            }
        })?;

        let mut query = Query::query(name.clone(), record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(rand::random())
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(false);
        message.add_query(query);

        let request = DnsRequest::new(message, DnsRequestOptions::default());
        let responses = SyncClient::new(conn).send(request);
        let response = self.first_response(responses)?;

        match response.response_code() {
            ResponseCode::NoError | ResponseCode::NXDomain => Ok(response),
            rcode => Err(UpdateError::Refused {
                server: self.endpoint.clone(),
                rcode: rcode.to_string(),
            }),
        }
    }

    /// The endpoint this client talks to, as `addr:port`.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn first_response(
        &self,
        mut responses: Vec<Result<DnsResponse, hickory_client::error::ClientError>>,
    ) -> Result<DnsResponse, UpdateError> {
        if responses.is_empty() {
            return Err(UpdateError::NoResponse {
                server: self.endpoint.clone(),
            });
        }
        responses.remove(0).map_err(|err| UpdateError::Exchange {
            server: self.endpoint.clone(),
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod update_tests;
