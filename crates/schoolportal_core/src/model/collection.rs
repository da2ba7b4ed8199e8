//! Named collections and their storage keys.

use crate::model::role::Role;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Students,
    Teachers,
    Admins,
    Notices,
}

impl Collection {
    /// Identity collections in login lookup order.
    pub const IDENTITIES: [Collection; 3] =
        [Collection::Admins, Collection::Teachers, Collection::Students];

    pub const ALL: [Collection; 4] = [
        Collection::Students,
        Collection::Teachers,
        Collection::Admins,
        Collection::Notices,
    ];

    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Students => "students",
            Self::Teachers => "teachers",
            Self::Admins => "admins",
            Self::Notices => "notices",
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Student => Self::Students,
            Role::Teacher => Self::Teachers,
            Role::Admin => Self::Admins,
        }
    }

    /// Role whose identities live in this collection.
    pub fn role(self) -> Option<Role> {
        match self {
            Self::Students => Some(Role::Student),
            Self::Teachers => Some(Role::Teacher),
            Self::Admins => Some(Role::Admin),
            Self::Notices => None,
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.storage_key())
    }
}
