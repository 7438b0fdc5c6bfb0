use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    #[default]
    Mobile,
    Desktop,
}

impl DeviceType {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            DeviceType::Mobile => "MOBILE",
            DeviceType::Desktop => "DESKTOP",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "MOBILE" => Some(DeviceType::Mobile),
            "DESKTOP" => Some(DeviceType::Desktop),
            _ => None,
        }
    }

    /// Helper: convert input code from CLI (lowercase or uppercase)
    pub fn from_code(code: &str) -> Option<Self> {
        DeviceType::from_db_str(&code.to_uppercase())
    }
}
