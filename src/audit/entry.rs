//! Audit Log Entry
//!
//! Defines the tamper-evident audit log entry, the event a collaborator
//! hands to the ledger, and the hash function that links entries together.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::database::models::AuditLogRow;

/// `previous_hash` of the first entry in a chain.
pub const GENESIS_HASH: &str = "0";

/// Actor placeholder when the caller could not resolve who acted.
pub const UNKNOWN_ACTOR: &str = "unknown";

/// A privileged action as reported by a collaborator, before it is chained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub actor_email: String,
    pub actor_role: String,
    pub action: String,
    pub target_id: Option<String>,
    pub payload: Option<Value>,
    pub source_address: Option<String>,
}

impl AuditEvent {
    pub fn new(
        actor_email: impl Into<String>,
        actor_role: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            actor_email: non_empty_or_unknown(actor_email.into()),
            actor_role: non_empty_or_unknown(actor_role.into()),
            action: action.into(),
            target_id: None,
            payload: None,
            source_address: None,
        }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn with_source_address(mut self, source_address: Option<String>) -> Self {
        self.source_address = source_address;
        self
    }
}

fn non_empty_or_unknown(value: String) -> String {
    if value.trim().is_empty() {
        UNKNOWN_ACTOR.to_string()
    } else {
        value
    }
}

/// Audit log entry with cryptographic hash chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Storage row id; `0` until persisted.
    pub id: i64,
    pub sequence_number: i64,
    /// ISO-8601, kept exactly as hashed.
    pub timestamp: String,
    pub actor_email: String,
    pub actor_role: String,
    pub action: String,
    pub target_id: Option<String>,
    pub source_address: Option<String>,
    pub payload: Option<Value>,
    pub previous_hash: String,
    pub hash: String,
}

impl AuditLogEntry {
    /// Chain `event` behind `previous_hash` at position `sequence_number`
    /// and compute its hash.
    pub fn seal(
        event: AuditEvent,
        sequence_number: i64,
        previous_hash: String,
        timestamp: String,
    ) -> Self {
        let mut entry = Self {
            id: 0,
            sequence_number,
            timestamp,
            actor_email: event.actor_email,
            actor_role: event.actor_role,
            action: event.action,
            target_id: event.target_id,
            source_address: event.source_address,
            payload: event.payload,
            previous_hash,
            hash: String::new(),
        };
        entry.hash = entry.calculate_hash();
        entry
    }

    /// Canonical serialization of every hashed field. Keys are emitted in
    /// sorted order and the source address is not covered.
    pub fn canonical_string(&self) -> String {
        json!({
            "sequenceNumber": self.sequence_number,
            "timestamp": self.timestamp,
            "actorEmail": self.actor_email,
            "actorRole": self.actor_role,
            "action": self.action,
            "targetId": self.target_id,
            "payload": self.payload,
            "previousHash": self.previous_hash,
        })
        .to_string()
    }

    /// Hex-encoded SHA-256 of the canonical string.
    pub fn calculate_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.canonical_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify_hash(&self) -> bool {
        self.hash == self.calculate_hash()
    }

    pub fn summary(&self) -> String {
        format!(
            "#{} {} by {} ({}) -> {}",
            self.sequence_number,
            self.action,
            self.actor_email,
            self.actor_role,
            self.target_id.as_deref().unwrap_or("-")
        )
    }
}

/// Timestamp in the form the ledger stores and hashes.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<AuditLogRow> for AuditLogEntry {
    /// Rows that were never chained decode with sequence `0` and empty
    /// hashes; the verifier reports them as broken.
    fn from(row: AuditLogRow) -> Self {
        let payload = row.payload.map(|raw| decode_payload(row.id, raw));

        Self {
            id: row.id,
            sequence_number: row.sequence_number.unwrap_or(0),
            timestamp: row.timestamp,
            actor_email: row.actor_email,
            actor_role: row.actor_role,
            action: row.action,
            target_id: row.target_id,
            source_address: row.source_address,
            payload,
            previous_hash: row.previous_hash.unwrap_or_default(),
            hash: row.hash.unwrap_or_default(),
        }
    }
}

/// A stored payload that is no longer valid JSON is kept as a raw string so
/// the hash comparison, not the decoder, reports it.
fn decode_payload(row_id: i64, raw: String) -> Value {
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Audit row {} has an undecodable payload: {}", row_id, e);
            Value::String(raw)
        }
    }
}
