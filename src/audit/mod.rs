//! Audit Log System
//!
//! Tamper-evident ledger of privileged actions: every entry carries a
//! sequence number and the SHA-256 of its predecessor, so editing history
//! after the fact is detectable by replaying the chain.

pub mod chain;
pub mod entry;
pub mod logger;
pub mod rebuild;
pub mod status;
pub mod verify;

pub use chain::{ChainHead, ChainState};
pub use entry::{AuditEvent, AuditLogEntry, GENESIS_HASH, UNKNOWN_ACTOR};
pub use logger::AuditLogger;
pub use rebuild::RebuildResult;
pub use status::IntegrityStatus;
pub use verify::{find_tampered_entries, verify_chain, VerificationResult};
