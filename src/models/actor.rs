//! Authenticated caller as handed over by the upstream auth layer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    DomainHead,
    TeamLead,
    SeniorWorker,
    Worker,
    Volunteer,
    Visitor,
}

impl Role {
    pub fn from_code(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "DOMAIN_HEAD" => Some(Role::DomainHead),
            "TEAM_LEAD" => Some(Role::TeamLead),
            "SENIOR_WORKER" => Some(Role::SeniorWorker),
            "WORKER" => Some(Role::Worker),
            "VOLUNTEER" => Some(Role::Volunteer),
            "VISITOR" => Some(Role::Visitor),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub domain_id: Option<String>,
    pub team_id: Option<String>,
}

/// Where a user sits in the organisation, as reported by the user directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placement {
    pub domain_id: Option<String>,
    pub team_id: Option<String>,
}
