//! Caller identity as forwarded by the upstream auth layer.

use crate::errors::{AppError, AppResult};
use crate::models::actor::{Actor, Role};
use axum::http::HeaderMap;

pub const ACTOR_ID: &str = "x-actor-id";
pub const ACTOR_ROLE: &str = "x-actor-role";
pub const ACTOR_DOMAIN: &str = "x-actor-domain";
pub const ACTOR_TEAM: &str = "x-actor-team";

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

pub fn actor_from_headers(headers: &HeaderMap) -> AppResult<Actor> {
    let id = header(headers, ACTOR_ID)
        .ok_or_else(|| AppError::Unauthenticated(format!("missing {ACTOR_ID} header")))?;
    let role_raw = header(headers, ACTOR_ROLE)
        .ok_or_else(|| AppError::Unauthenticated(format!("missing {ACTOR_ROLE} header")))?;
    let role = Role::from_code(&role_raw)
        .ok_or_else(|| AppError::Unauthenticated(format!("unknown role '{role_raw}'")))?;

    Ok(Actor {
        id,
        role,
        domain_id: header(headers, ACTOR_DOMAIN),
        team_id: header(headers, ACTOR_TEAM),
    })
}
