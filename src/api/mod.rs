//! Audit HTTP API
//!
//! Read and maintenance endpoints over the ledger, restricted to elevated
//! roles. Verification and rebuild are themselves recorded in the ledger.

pub mod actor;
pub mod roles;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::audit::{AuditEvent, AuditLogger};
use crate::config::AuditConfig;
use actor::{forbidden, Actor};

pub type ApiError = (StatusCode, Json<Value>);

pub fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(json!({
            "success": false,
            "error": message
        })),
    )
}

pub const ACTION_VERIFY: &str = "AUDIT_VERIFY";
pub const ACTION_CHAIN_REBUILD: &str = "AUDIT_CHAIN_REBUILD";
pub const ACTION_REBUILD_DENIED: &str = "AUDIT_REBUILD_DENIED";
const LEDGER_TARGET: &str = "AUDIT_LOG";

#[derive(Clone)]
pub struct AuditApi {
    logger: AuditLogger,
    config: AuditConfig,
}

impl AuditApi {
    pub fn new(logger: AuditLogger, config: AuditConfig) -> Self {
        Self { logger, config }
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/api/audit-logs", get(list_entries))
            .route("/api/audit-logs/integrity-status", get(integrity_status))
            .route("/api/audit-logs/verify", post(verify))
            .route("/api/audit-logs/rebuild-chain", post(rebuild_chain))
            .with_state(self)
    }
}

fn event_for(actor: &Actor, action: &str) -> AuditEvent {
    AuditEvent::new(actor.email.clone(), actor.role_name.clone(), action)
        .with_target(LEDGER_TARGET)
        .with_source_address(actor.source_address.clone())
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// Newest entries first.
pub async fn list_entries(
    State(api): State<AuditApi>,
    actor: Actor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    actor.require_elevated()?;
    let limit = api.config.clamp_limit(query.limit);

    match api.logger.recent_entries(limit).await {
        Ok(entries) => Ok(Json(json!({
            "success": true,
            "count": entries.len(),
            "data": entries
        }))),
        Err(e) => {
            error!("Failed to list audit logs: {}", e);
            Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load audit logs",
            ))
        }
    }
}

pub async fn integrity_status(
    State(api): State<AuditApi>,
    actor: Actor,
) -> Result<Json<Value>, ApiError> {
    actor.require_elevated()?;
    let status = api.logger.integrity_status().await;
    Ok(Json(json!(status)))
}

pub async fn verify(State(api): State<AuditApi>, actor: Actor) -> Result<Json<Value>, ApiError> {
    actor.require_elevated()?;

    let result = api.logger.verify_integrity().await;
    info!(
        "Audit chain verification requested by {}: {}",
        actor.email,
        result.summary()
    );

    api.logger
        .append(event_for(&actor, ACTION_VERIFY).with_payload(json!({
            "valid": result.valid,
            "totalLogs": result.total_logs,
            "verifiedLogs": result.verified_logs,
            "errorCount": result.errors.len()
        })))
        .await;

    Ok(Json(json!(result)))
}

pub async fn rebuild_chain(
    State(api): State<AuditApi>,
    actor: Actor,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !actor.is_most_privileged() {
        warn!(
            "Chain rebuild denied for {} ({})",
            actor.email, actor.role_name
        );
        api.logger
            .append(event_for(&actor, ACTION_REBUILD_DENIED))
            .await;
        return Err(forbidden(&actor.role_name));
    }

    warn!("Audit chain rebuild started by {}", actor.email);
    let result = api.logger.rebuild_chain().await;

    api.logger
        .append(event_for(&actor, ACTION_CHAIN_REBUILD).with_payload(json!({
            "success": result.success,
            "rebuilt": result.rebuilt,
            "errors": result.errors
        })))
        .await;

    let status = if result.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(json!(result))))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "dispatch-audit",
        "timestamp": chrono::Utc::now()
    }))
}
