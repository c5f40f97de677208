use std::fmt;

use serde::{Deserialize, Serialize};

/// Role shown in the UI. Authorization itself stays on the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(alias = "User")]
    User,
    #[serde(alias = "Admin")]
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT payload as far as the client cares. Every field is optional since
/// the token is only inspected for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>, // backend user ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>, // "user" | "admin"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>, // expires at (unix timestamp)
}

impl Claims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }
}
