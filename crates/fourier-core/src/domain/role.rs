//! Role entity and the seeded role catalogue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A row of the `roles` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Criteria for role lookups. Unset fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleFilter {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl RoleFilter {
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Values for inserting a role. A missing id lets the store assign one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    pub id: Option<i64>,
    pub name: String,
}

/// Partial role update; `id` selects the row in bulk updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    pub id: Option<i64>,
    pub name: Option<String>,
}

/// The roles seeded by the initial migration, with hierarchical levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    /// Regular user; assigned at registration.
    #[default]
    User,
    Moderator,
    Admin,
    SuperAdmin,
}

impl RoleKind {
    /// Returns the identifier this role is seeded with.
    #[must_use]
    pub const fn id(&self) -> i64 {
        match self {
            Self::User => 1,
            Self::Moderator => 2,
            Self::Admin => 3,
            Self::SuperAdmin => 4,
        }
    }

    /// Maps a stored role identifier back to a seeded role.
    #[must_use]
    pub const fn from_id(id: i64) -> Option<Self> {
        match id {
            1 => Some(Self::User),
            2 => Some(Self::Moderator),
            3 => Some(Self::Admin),
            4 => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    /// Returns true for the roles allowed through the admin guard.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Returns all seeded roles.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::User, Self::Moderator, Self::Admin, Self::SuperAdmin]
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Moderator => write!(f, "moderator"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "superadmin"),
        }
    }
}
