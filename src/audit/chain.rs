//! Chain State
//!
//! Cached head of the chain: the hash and sequence number of the newest
//! persisted entry. Seeded lazily from storage, advanced after each
//! successful append, cleared by a rebuild.

use crate::audit::entry::GENESIS_HASH;
use crate::database::models::AuditLogRow;
use crate::error::{AuditError, AuditResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainHead {
    pub last_hash: String,
    pub last_sequence: i64,
}

impl ChainHead {
    pub fn genesis() -> Self {
        Self {
            last_hash: GENESIS_HASH.to_string(),
            last_sequence: 0,
        }
    }

    pub fn next_sequence(&self) -> i64 {
        self.last_sequence + 1
    }

    /// Derive the head from the newest stored row. An empty table is the
    /// genesis head; a tail row missing its chain fields is an error, never
    /// a silent restart at genesis.
    pub fn from_tail(tail: Option<&AuditLogRow>) -> AuditResult<Self> {
        let Some(row) = tail else {
            return Ok(Self::genesis());
        };

        let last_hash = match row.hash.as_deref() {
            Some(hash) if !hash.trim().is_empty() => hash.to_string(),
            _ => return Err(AuditError::corrupt_tail(row.id, "hash is missing")),
        };

        let last_sequence = match row.sequence_number {
            Some(sequence) if sequence > 0 => sequence,
            Some(sequence) => {
                return Err(AuditError::corrupt_tail(
                    row.id,
                    &format!("sequence number {} is not positive", sequence),
                ))
            }
            None => return Err(AuditError::corrupt_tail(row.id, "sequence number is missing")),
        };

        Ok(Self {
            last_hash,
            last_sequence,
        })
    }
}

/// Owned, injectable chain state. `None` means "not yet seeded".
#[derive(Debug, Default)]
pub struct ChainState {
    head: Option<ChainHead>,
}

impl ChainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a known head, skipping the storage lookup.
    pub fn seeded(head: ChainHead) -> Self {
        Self { head: Some(head) }
    }

    pub fn head(&self) -> Option<&ChainHead> {
        self.head.as_ref()
    }

    pub fn is_seeded(&self) -> bool {
        self.head.is_some()
    }

    pub fn seed(&mut self, head: ChainHead) {
        self.head = Some(head);
    }

    pub fn advance(&mut self, hash: String, sequence_number: i64) {
        self.head = Some(ChainHead {
            last_hash: hash,
            last_sequence: sequence_number,
        });
    }

    pub fn reset(&mut self) {
        self.head = None;
    }
}
