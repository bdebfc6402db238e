//! Audit Log Verification
//!
//! Replays a chain in sequence order and checks numbering, linkage and
//! per-entry hashes. Corruption is reported entry by entry; the scan never
//! stops early.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::audit::entry::{AuditLogEntry, GENESIS_HASH};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub valid: bool,
    pub total_logs: usize,
    pub verified_logs: usize,
    pub errors: Vec<String>,
}

impl VerificationResult {
    /// Result for a scan that could not even load the chain.
    pub fn fatal(message: String) -> Self {
        Self {
            valid: false,
            total_logs: 0,
            verified_logs: 0,
            errors: vec![message],
        }
    }

    pub fn summary(&self) -> String {
        if self.valid {
            format!("Audit chain is valid ({} entries)", self.total_logs)
        } else {
            format!(
                "Audit chain is invalid: {}/{} entries verified, {} error(s)",
                self.verified_logs,
                self.total_logs,
                self.errors.len()
            )
        }
    }
}

/// Verify `entries`, which must already be ordered by sequence number.
///
/// The expected `previous_hash` of each entry is the stored hash of the
/// entry before it in this list, so a single tampered entry shows up once
/// as a hash mismatch rather than cascading down the chain.
pub fn verify_chain(entries: &[AuditLogEntry]) -> VerificationResult {
    let mut errors = Vec::new();
    let mut verified_logs = 0;

    for (i, entry) in entries.iter().enumerate() {
        let expected_sequence = i as i64 + 1;

        if entry.sequence_number != expected_sequence {
            errors.push(format!(
                "Entry at position {} (row {}): invalid sequence number (expected {}, got {})",
                expected_sequence, entry.id, expected_sequence, entry.sequence_number
            ));
            continue;
        }

        let expected_previous = if i == 0 {
            GENESIS_HASH
        } else {
            entries[i - 1].hash.as_str()
        };
        if entry.previous_hash != expected_previous {
            errors.push(format!(
                "Entry #{} (row {}): invalid previous hash (chain broken)",
                entry.sequence_number, entry.id
            ));
            continue;
        }

        if !entry.verify_hash() {
            errors.push(format!(
                "Entry #{} (row {}): hash mismatch (entry has been tampered with)",
                entry.sequence_number, entry.id
            ));
            continue;
        }

        verified_logs += 1;
    }

    let result = VerificationResult {
        valid: errors.is_empty(),
        total_logs: entries.len(),
        verified_logs,
        errors,
    };

    if result.valid {
        info!("Audit chain verified: {} entries", result.total_logs);
    } else {
        warn!("{}", result.summary());
        for error in &result.errors {
            debug!("{}", error);
        }
    }

    result
}

/// Sequence numbers of entries whose stored hash does not match their
/// content, regardless of linkage.
pub fn find_tampered_entries(entries: &[AuditLogEntry]) -> Vec<i64> {
    entries
        .iter()
        .filter(|entry| !entry.verify_hash())
        .map(|entry| entry.sequence_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::AuditEvent;

    fn build_chain(len: usize) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = Vec::with_capacity(len);
        for i in 0..len {
            let previous_hash = entries
                .last()
                .map(|e| e.hash.clone())
                .unwrap_or_else(|| GENESIS_HASH.to_string());
            let event = AuditEvent::new(
                format!("user{}@example.com", i),
                "officer",
                "UPDATE_RIDE",
            )
            .with_target(format!("RIDE-{:03}", i));

            let mut entry = AuditLogEntry::seal(
                event,
                i as i64 + 1,
                previous_hash,
                format!("2026-02-01T10:00:{:02}.000Z", i),
            );
            entry.id = i as i64 + 1;
            entries.push(entry);
        }
        entries
    }

    #[test]
    fn test_empty_chain_is_valid() {
        let result = verify_chain(&[]);
        assert_eq!(
            result,
            VerificationResult {
                valid: true,
                total_logs: 0,
                verified_logs: 0,
                errors: vec![],
            }
        );
    }

    #[test]
    fn test_valid_chain() {
        let entries = build_chain(10);
        let result = verify_chain(&entries);

        assert!(result.valid);
        assert_eq!(result.total_logs, 10);
        assert_eq!(result.verified_logs, 10);
        assert!(result.summary().contains("valid (10 entries)"));
    }

    #[test]
    fn test_tampered_field_flags_only_that_entry() {
        for n in 0..5 {
            let mut entries = build_chain(5);
            entries[n].actor_email = "mallory@example.com".to_string();

            let result = verify_chain(&entries);
            assert!(!result.valid);
            assert_eq!(result.errors.len(), 1);
            assert!(result.errors[0].contains(&format!("Entry #{} ", n + 1)));
            assert!(result.errors[0].contains("tampered"));
            assert_eq!(result.verified_logs, 4);
        }
    }

    #[test]
    fn test_resealed_entry_breaks_next_link() {
        let mut entries = build_chain(4);
        entries[1].action = "DELETE_PATIENT".to_string();
        entries[1].hash = entries[1].calculate_hash();

        let result = verify_chain(&entries);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Entry #3"));
        assert!(result.errors[0].contains("chain broken"));
    }

    #[test]
    fn test_first_entry_must_link_to_genesis() {
        let mut entries = build_chain(2);
        entries[0].previous_hash = "1".to_string();
        entries[0].hash = entries[0].calculate_hash();
        entries[1].previous_hash = entries[0].hash.clone();
        entries[1].hash = entries[1].calculate_hash();

        let result = verify_chain(&entries);
        assert_eq!(result.verified_logs, 1);
        assert!(result.errors[0].contains("Entry #1"));
    }

    #[test]
    fn test_sequence_gap_is_reported_and_scan_continues() {
        let mut entries = build_chain(5);
        entries.remove(2);

        let result = verify_chain(&entries);
        assert!(!result.valid);
        assert_eq!(result.total_logs, 4);
        assert_eq!(result.verified_logs, 2);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("expected 3, got 4"));
        assert!(result.errors[1].contains("expected 4, got 5"));
    }

    #[test]
    fn test_find_tampered_entries() {
        let mut entries = build_chain(3);
        entries[2].payload = Some(serde_json::json!({ "forged": true }));

        assert_eq!(find_tampered_entries(&entries), vec![3]);
    }

    #[test]
    fn test_fatal_result() {
        let result = VerificationResult::fatal("storage offline".to_string());
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["storage offline".to_string()]);
        assert!(result.summary().contains("0/0"));
    }
}
