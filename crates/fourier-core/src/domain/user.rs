//! User entity and its query/value objects.

use super::role::RoleKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    pub id: i64,

    pub email: String,

    /// Argon2 PHC string (never exposed via API).
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Reference into the `roles` table.
    pub role_id: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the seeded role this user holds, if the id is a known one.
    #[must_use]
    pub const fn role(&self) -> Option<RoleKind> {
        RoleKind::from_id(self.role_id)
    }
}

/// Criteria for user lookups. Unset fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

impl UserFilter {
    #[must_use]
    pub fn by_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_role(role_id: i64) -> Self {
        Self {
            role_id: Some(role_id),
            ..Self::default()
        }
    }
}

/// Values for inserting a user. A missing role falls back to the column
/// default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role_id: Option<i64>,
}

impl NewUser {
    #[must_use]
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password_hash: password_hash.into(),
            role_id: None,
        }
    }

    #[must_use]
    pub const fn with_role(mut self, role: RoleKind) -> Self {
        self.role_id = Some(role.id());
        self
    }
}

/// Partial user update; `id` selects the row in bulk updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role_id: Option<i64>,
}
