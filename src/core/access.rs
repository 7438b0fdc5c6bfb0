//! Who may read whose attendance.

use crate::errors::{AppError, AppResult};
use crate::models::actor::{Actor, Role};
use crate::store::UserDirectory;

/// Resolve the user whose summaries `actor` asked for.
///
/// Administrators see everyone. Domain heads and team leads see users placed
/// in their own domain or team. Everyone else is narrowed to themselves,
/// whatever they asked for.
pub fn resolve_list_target(
    actor: &Actor,
    requested: Option<&str>,
    directory: &dyn UserDirectory,
) -> AppResult<String> {
    let target = match requested.map(str::trim) {
        None | Some("") => return Ok(actor.id.clone()),
        Some(t) if t == actor.id => return Ok(actor.id.clone()),
        Some(t) => t,
    };

    match actor.role {
        Role::SuperAdmin | Role::Admin => Ok(target.to_string()),
        Role::DomainHead => {
            let placement = directory.placement(target)?.unwrap_or_default();
            if actor.domain_id.is_some() && placement.domain_id == actor.domain_id {
                Ok(target.to_string())
            } else {
                Err(AppError::Forbidden(
                    "user is outside your domain".into(),
                ))
            }
        }
        Role::TeamLead => {
            let placement = directory.placement(target)?.unwrap_or_default();
            if actor.team_id.is_some() && placement.team_id == actor.team_id {
                Ok(target.to_string())
            } else {
                Err(AppError::Forbidden("user is outside your team".into()))
            }
        }
        _ => Ok(actor.id.clone()),
    }
}

pub fn require_admin(actor: &Actor) -> AppResult<()> {
    if actor.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "only administrators may override attendance".into(),
        ))
    }
}
