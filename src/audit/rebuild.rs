//! Chain rebuild
//!
//! Rewrites `hash`, `previous_hash` and `sequence_number` of every stored
//! row in timestamp order. Meant for migrating rows written before chaining
//! existed; it replaces whatever chain history the table held.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{error, info};

use crate::audit::entry::{AuditLogEntry, GENESIS_HASH};
use crate::database::queries::Queries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RebuildResult {
    pub success: bool,
    pub rebuilt: usize,
    pub errors: Vec<String>,
}

/// Reassign chain fields to `entries` (already in rebuild order), starting
/// from genesis.
pub fn rechain(entries: Vec<AuditLogEntry>) -> Vec<AuditLogEntry> {
    let mut previous_hash = GENESIS_HASH.to_string();

    entries
        .into_iter()
        .enumerate()
        .map(|(i, mut entry)| {
            entry.sequence_number = i as i64 + 1;
            entry.previous_hash = previous_hash.clone();
            entry.hash = entry.calculate_hash();
            previous_hash = entry.hash.clone();
            entry
        })
        .collect()
}

/// Rebuild the stored chain row by row. The first failed write stops the
/// run; rows rewritten before it keep their new values.
///
/// Callers must hold the ledger's writer lock.
pub(crate) async fn rebuild_stored_chain(pool: &SqlitePool) -> RebuildResult {
    let rows = match Queries::audit_logs_by_timestamp(pool).await {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to load audit logs for rebuild: {}", e);
            return RebuildResult {
                success: false,
                rebuilt: 0,
                errors: vec![format!("Error rebuilding chain: {}", e)],
            };
        }
    };

    let entries = rechain(rows.into_iter().map(AuditLogEntry::from).collect());
    let mut rebuilt = 0;

    for entry in &entries {
        if let Err(e) = Queries::update_chain_fields(
            pool,
            entry.id,
            &entry.hash,
            &entry.previous_hash,
            entry.sequence_number,
        )
        .await
        {
            error!(
                "Chain rebuild aborted at row {} after {} rows: {}",
                entry.id, rebuilt, e
            );
            return RebuildResult {
                success: false,
                rebuilt,
                errors: vec![format!(
                    "Error rebuilding chain at row {}: {}",
                    entry.id, e
                )],
            };
        }
        rebuilt += 1;
    }

    info!("Rebuilt audit chain: {} entries", rebuilt);
    RebuildResult {
        success: true,
        rebuilt,
        errors: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::entry::AuditEvent;
    use crate::audit::verify::verify_chain;

    fn unchained(id: i64, action: &str) -> AuditLogEntry {
        let mut entry = AuditLogEntry::seal(
            AuditEvent::new("ops@example.com", "admin", action),
            0,
            String::new(),
            format!("2025-11-0{}T09:00:00.000Z", id),
        );
        entry.id = id;
        entry.hash = String::new();
        entry
    }

    #[test]
    fn test_rechain_produces_valid_chain() {
        let entries = rechain(vec![
            unchained(1, "LOGIN"),
            unchained(2, "CREATE_PATIENT"),
            unchained(3, "ASSIGN_DRIVER"),
        ]);

        assert_eq!(entries[0].previous_hash, GENESIS_HASH);
        assert_eq!(entries[1].previous_hash, entries[0].hash);
        assert_eq!(entries[2].sequence_number, 3);
        assert!(verify_chain(&entries).valid);
    }

    #[test]
    fn test_rechain_is_idempotent() {
        let first = rechain(vec![unchained(1, "LOGIN"), unchained(2, "LOGOUT")]);
        let second = rechain(first.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rechain_empty() {
        assert!(rechain(vec![]).is_empty());
    }
}
