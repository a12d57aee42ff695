//! Admin role guard.

use fourier_core::{FourierError, FourierResult, RoleKind, User};
use tracing::warn;

/// Role ids allowed through [`require_admin`].
pub const ADMIN_ROLE_IDS: [i64; 2] = [RoleKind::Admin.id(), RoleKind::SuperAdmin.id()];

/// Returns true if `role_id` grants admin access.
#[must_use]
pub fn is_admin_role(role_id: i64) -> bool {
    ADMIN_ROLE_IDS.contains(&role_id)
}

/// Passes `user` through if it holds an admin role.
pub fn require_admin(user: User) -> FourierResult<User> {
    if is_admin_role(user.role_id) {
        Ok(user)
    } else {
        warn!(
            "User {} with role {} denied admin access",
            user.id, user.role_id
        );
        Err(FourierError::Forbidden)
    }
}
