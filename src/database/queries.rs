use sqlx::SqlitePool;

use crate::audit::entry::AuditLogEntry;
use crate::database::models::AuditLogRow;

const AUDIT_LOG_COLUMNS: &str = "id, actor_email, actor_role, action, target_id, payload, \
     source_address, timestamp, hash, previous_hash, sequence_number";

pub struct Queries;

impl Queries {
    /// Insert a sealed entry and return its row id.
    pub async fn insert_audit_log(
        pool: &SqlitePool,
        entry: &AuditLogEntry,
    ) -> Result<i64, sqlx::Error> {
        let payload = entry.payload.as_ref().map(|value| value.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (
                actor_email, actor_role, action, target_id,
                payload, source_address, timestamp,
                hash, previous_hash, sequence_number
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.actor_email)
        .bind(&entry.actor_role)
        .bind(&entry.action)
        .bind(&entry.target_id)
        .bind(payload)
        .bind(&entry.source_address)
        .bind(&entry.timestamp)
        .bind(&entry.hash)
        .bind(&entry.previous_hash)
        .bind(entry.sequence_number)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Row with the highest sequence number. Unchained rows (NULL sequence)
    /// are only returned when no chained row exists.
    pub async fn latest_audit_log(pool: &SqlitePool) -> Result<Option<AuditLogRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogRow>(&format!(
            "SELECT {} FROM audit_logs ORDER BY sequence_number DESC, id DESC LIMIT 1",
            AUDIT_LOG_COLUMNS
        ))
        .fetch_optional(pool)
        .await
    }

    pub async fn audit_logs_by_sequence(pool: &SqlitePool) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogRow>(&format!(
            "SELECT {} FROM audit_logs ORDER BY sequence_number ASC, id ASC",
            AUDIT_LOG_COLUMNS
        ))
        .fetch_all(pool)
        .await
    }

    /// Ties on timestamp fall back to insertion order so repeated rebuilds
    /// see the same sequence.
    pub async fn audit_logs_by_timestamp(pool: &SqlitePool) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogRow>(&format!(
            "SELECT {} FROM audit_logs ORDER BY timestamp ASC, id ASC",
            AUDIT_LOG_COLUMNS
        ))
        .fetch_all(pool)
        .await
    }

    /// Newest rows by timestamp, as the dispatch service's recent-activity
    /// view lists them. After a reordering rebuild this is not sequence order.
    pub async fn recent_audit_logs(
        pool: &SqlitePool,
        limit: i64,
    ) -> Result<Vec<AuditLogRow>, sqlx::Error> {
        sqlx::query_as::<_, AuditLogRow>(&format!(
            "SELECT {} FROM audit_logs ORDER BY timestamp DESC, id DESC LIMIT ?",
            AUDIT_LOG_COLUMNS
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn count_audit_logs(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(pool)
            .await
    }

    /// Rewrite the chain columns of one row. Used only by the rebuild.
    pub async fn update_chain_fields(
        pool: &SqlitePool,
        id: i64,
        hash: &str,
        previous_hash: &str,
        sequence_number: i64,
    ) -> Result<(), sqlx::Error> {
        let result = sqlx::query(
            "UPDATE audit_logs SET hash = ?, previous_hash = ?, sequence_number = ? WHERE id = ?",
        )
        .bind(hash)
        .bind(previous_hash)
        .bind(sequence_number)
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }
}
