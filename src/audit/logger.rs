//! Audit Logger
//!
//! Appends events to the hash-chained `audit_logs` table and exposes
//! verification, status and rebuild over the stored chain.
//!
//! All writers go through one async mutex that owns the [`ChainState`]. It
//! is held from seeding the head, through computing and inserting the new
//! row, to advancing the head, so concurrent appends can never claim the
//! same sequence number or link to the same predecessor. The rebuild takes
//! the same lock. Inside the lock the cached head is compared with the
//! stored tail, which catches a rebuild run by another process.

use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::audit::chain::{ChainHead, ChainState};
use crate::audit::entry::{now_timestamp, AuditEvent, AuditLogEntry};
use crate::audit::rebuild::{rebuild_stored_chain, RebuildResult};
use crate::audit::status::IntegrityStatus;
use crate::audit::verify::{verify_chain, VerificationResult};
use crate::database::queries::Queries;
use crate::error::AuditResult;

#[derive(Clone)]
pub struct AuditLogger {
    pool: SqlitePool,
    state: Arc<Mutex<ChainState>>,
}

impl AuditLogger {
    /// Logger whose chain head is seeded from storage on first append.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_chain_state(pool, ChainState::new())
    }

    pub fn with_chain_state(pool: SqlitePool, state: ChainState) -> Self {
        Self {
            pool,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record an event. Failures are logged and swallowed: auditing never
    /// breaks the operation being audited.
    pub async fn append(&self, event: AuditEvent) {
        let action = event.action.clone();
        if let Err(e) = self.try_append(event).await {
            error!("Failed to write audit log for {}: {}", action, e);
        }
    }

    /// Record an event on a background task so the caller never waits on
    /// storage.
    pub fn append_detached(&self, event: AuditEvent) -> JoinHandle<()> {
        let logger = self.clone();
        tokio::spawn(async move { logger.append(event).await })
    }

    /// Record an event and report the outcome. The chain head only moves
    /// once the row is stored, so a failed write is retried at the same
    /// sequence number by the next append.
    ///
    /// The cached head is checked against the stored tail on every append.
    /// A rebuild run from another process (the operator CLI) rewrites the
    /// tail behind this logger's back; the cache is then re-seeded instead
    /// of reusing a sequence number that already exists.
    pub async fn try_append(&self, event: AuditEvent) -> AuditResult<AuditLogEntry> {
        let mut state = self.state.lock().await;

        let tail = Queries::latest_audit_log(&self.pool).await?;
        let stored = ChainHead::from_tail(tail.as_ref())?;

        match state.head().cloned() {
            Some(cached) if cached == stored => {}
            Some(cached) => {
                warn!(
                    "Cached audit chain head (sequence {}) does not match storage (sequence {}); re-seeding",
                    cached.last_sequence, stored.last_sequence
                );
                state.seed(stored);
            }
            None => {
                debug!(
                    "Seeded audit chain head at sequence {}",
                    stored.last_sequence
                );
                state.seed(stored);
            }
        }

        let head = state.head().cloned().unwrap_or_else(ChainHead::genesis);
        let mut entry = AuditLogEntry::seal(
            event,
            head.next_sequence(),
            head.last_hash,
            now_timestamp(),
        );

        entry.id = Queries::insert_audit_log(&self.pool, &entry).await?;
        state.advance(entry.hash.clone(), entry.sequence_number);

        debug!("Appended audit entry: {}", entry.summary());
        Ok(entry)
    }

    /// Current cached head, if seeded.
    pub async fn chain_head(&self) -> Option<ChainHead> {
        self.state.lock().await.head().cloned()
    }

    /// Replay the stored chain in sequence order.
    pub async fn verify_integrity(&self) -> VerificationResult {
        match Queries::audit_logs_by_sequence(&self.pool).await {
            Ok(rows) => {
                let entries: Vec<AuditLogEntry> =
                    rows.into_iter().map(AuditLogEntry::from).collect();
                verify_chain(&entries)
            }
            Err(e) => {
                error!("Failed to load audit chain for verification: {}", e);
                VerificationResult::fatal(format!("Fatal error during verification: {}", e))
            }
        }
    }

    pub async fn integrity_status(&self) -> IntegrityStatus {
        let verification = self.verify_integrity().await;
        IntegrityStatus::from_verification(verification, Utc::now())
    }

    /// Rewrite the whole chain in timestamp order, then drop the cached
    /// head so the next append re-reads the rebuilt tail.
    pub async fn rebuild_chain(&self) -> RebuildResult {
        let mut state = self.state.lock().await;
        info!("Rebuilding audit chain");

        let result = rebuild_stored_chain(&self.pool).await;
        state.reset();
        result
    }

    /// Newest entries first.
    pub async fn recent_entries(&self, limit: i64) -> AuditResult<Vec<AuditLogEntry>> {
        let rows = Queries::recent_audit_logs(&self.pool, limit).await?;
        Ok(rows.into_iter().map(AuditLogEntry::from).collect())
    }

    pub async fn entry_count(&self) -> AuditResult<i64> {
        Ok(Queries::count_audit_logs(&self.pool).await?)
    }
}
