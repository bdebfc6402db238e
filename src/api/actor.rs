//! Actor identity supplied by the upstream authentication gateway.
//!
//! The gateway authenticates the caller and forwards who they are in
//! request headers; this service trusts those headers and only applies the
//! role policy.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
    response::Json,
};
use serde_json::Value;

use super::roles::Role;
use super::{api_error, ApiError};

pub const ACTOR_EMAIL_HEADER: &str = "x-actor-email";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub email: String,
    /// Role exactly as forwarded, recorded verbatim in the ledger.
    pub role_name: String,
    pub role: Option<Role>,
    pub source_address: Option<String>,
}

impl Actor {
    pub fn is_elevated(&self) -> bool {
        self.role.map(|r| r.is_elevated()).unwrap_or(false)
    }

    pub fn is_most_privileged(&self) -> bool {
        self.role.map(|r| r.is_most_privileged()).unwrap_or(false)
    }

    pub fn require_elevated(&self) -> Result<(), ApiError> {
        if self.is_elevated() {
            Ok(())
        } else {
            Err(forbidden(&self.role_name))
        }
    }
}

pub fn forbidden(role_name: &str) -> (StatusCode, Json<Value>) {
    api_error(
        StatusCode::FORBIDDEN,
        &format!("Role '{}' is not permitted to perform this action", role_name),
    )
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// First hop of `x-forwarded-for`, the original client.
fn source_address(headers: &HeaderMap) -> Option<String> {
    header_value(headers, FORWARDED_FOR_HEADER)
        .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        let (Some(email), Some(role_name)) = (
            header_value(headers, ACTOR_EMAIL_HEADER),
            header_value(headers, ACTOR_ROLE_HEADER),
        ) else {
            return Err(api_error(
                StatusCode::UNAUTHORIZED,
                "Missing authenticated actor identity",
            ));
        };

        Ok(Actor {
            email,
            role: Role::parse(&role_name),
            role_name,
            source_address: source_address(headers),
        })
    }
}
