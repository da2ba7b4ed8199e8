//! Portal roles and their fixed routing metadata.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }

    /// Conventional id prefix, e.g. `STU001`.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Self::Student => "STU",
            Self::Teacher => "TCH",
            Self::Admin => "ADM",
        }
    }

    /// Default landing page after login or on role mismatch.
    pub fn landing_route(self) -> &'static str {
        match self {
            Self::Student => "/dashboard",
            Self::Teacher => "/teacher/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// Guesses a role from the id prefix. Only a hint; authority is the
    /// collection the identity was found in.
    pub fn hinted_by_id(id: &str) -> Option<Role> {
        let upper = id.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|role| upper.starts_with(role.id_prefix()))
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_lowercase().as_str() {
            "student" => Some(Self::Student),
            "teacher" => Some(Self::Teacher),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
