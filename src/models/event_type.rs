use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CheckIn,
    CheckOut,
}

impl EventType {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            EventType::CheckIn => "CHECK_IN",
            EventType::CheckOut => "CHECK_OUT",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "CHECK_IN" => Some(EventType::CheckIn),
            "CHECK_OUT" => Some(EventType::CheckOut),
            _ => None,
        }
    }

    /// Short label used in CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            EventType::CheckIn => "Check-in",
            EventType::CheckOut => "Check-out",
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, EventType::CheckIn)
    }
}
