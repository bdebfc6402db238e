#![allow(dead_code)]

use dispatch_audit::audit::{AuditEvent, AuditLogger};
use dispatch_audit::database::Database;
use sqlx::SqlitePool;

/// Setup a logger over a fresh in-memory SQLite database
pub async fn setup_test_logger() -> AuditLogger {
    let database = Database::new_in_memory()
        .await
        .expect("Failed to create test database");
    AuditLogger::new(database.pool)
}

/// Insert a row the way the service wrote them before chaining existed
pub async fn insert_unchained_row(pool: &SqlitePool, action: &str, timestamp: &str) {
    sqlx::query(
        "INSERT INTO audit_logs (actor_email, actor_role, action, payload, timestamp) \
         VALUES ('legacy@example.com', 'admin', ?, '{\"migrated\":true}', ?)",
    )
    .bind(action)
    .bind(timestamp)
    .execute(pool)
    .await
    .expect("Failed to insert legacy row");
}

pub fn dispatch_events() -> Vec<AuditEvent> {
    vec![
        AuditEvent::new("alice@example.com", "admin", "LOGIN"),
        AuditEvent::new("bob@example.com", "officer", "CREATE_PATIENT").with_target("PAT-001"),
        AuditEvent::new("carol@example.com", "radio_center", "ASSIGN_DRIVER")
            .with_target("RIDE-118")
            .with_payload(serde_json::json!({ "driverId": "DRV-07", "vehicle": "AMB-2" })),
        AuditEvent::new("dave@example.com", "DEVELOPER", "UPDATE_PERMISSIONS")
            .with_target("USR-19")
            .with_payload(serde_json::json!({ "granted": ["reports:read"] }))
            .with_source_address(Some("10.1.4.20".to_string())),
    ]
}

pub async fn stored_hashes(pool: &SqlitePool) -> Vec<(i64, String, String)> {
    sqlx::query_as(
        "SELECT sequence_number, previous_hash, hash FROM audit_logs ORDER BY sequence_number",
    )
    .fetch_all(pool)
    .await
    .expect("Failed to read chain")
}

/// File-backed database shared by several loggers, as a running server and
/// the operator CLI would share it
pub async fn setup_file_database(dir: &std::path::Path) -> Database {
    let url = format!("sqlite://{}", dir.join("audit.db").display());
    let database = Database::new(&url)
        .await
        .expect("Failed to open file database");
    database
        .run_migrations()
        .await
        .expect("Failed to run migrations");
    database
}
