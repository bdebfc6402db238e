use sqlx::FromRow;

/// One `audit_logs` row as stored. The chain columns are nullable because
/// rows written before chaining existed carry none of them until rebuilt.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    pub id: i64,
    pub actor_email: String,
    pub actor_role: String,
    pub action: String,
    pub target_id: Option<String>,
    pub payload: Option<String>,
    pub source_address: Option<String>,
    pub timestamp: String,
    pub hash: Option<String>,
    pub previous_hash: Option<String>,
    pub sequence_number: Option<i64>,
}
