//! Authentication-related DTOs.

use fourier_core::{PageRequest, User};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    /// Password, from 5 to 50 symbols.
    #[validate(length(min = 5, max = 50, message = "Password must be 5-50 characters"))]
    pub password: String,

    #[validate(
        length(min = 5, max = 50, message = "Password must be 5-50 characters"),
        must_match(other = "password", message = "Passwords are not the same")
    )]
    pub confirm_password: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 5, max = 50, message = "Password must be 5-50 characters"))]
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    pub access_token: String,
    pub message: String,
}

impl LoginResponse {
    #[must_use]
    pub fn new(access_token: String) -> Self {
        Self {
            ok: true,
            access_token,
            message: "Authorization is successful!".to_string(),
        }
    }
}

/// Public view of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub role_id: i64,
    pub role_name: String,
}

impl UserInfo {
    #[must_use]
    pub fn new(user: &User, role_name: impl Into<String>) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role_id: user.role_id,
            role_name: role_name.into(),
        }
    }
}

/// Optional paging for the user listing. Without either field the whole
/// table is returned.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// 1-indexed page number.
    pub page: Option<u32>,
    /// Page size, at most 100.
    pub size: Option<u32>,
}

impl ListUsersQuery {
    /// Returns the requested page, if paging was asked for.
    #[must_use]
    pub fn page_request(&self) -> Option<PageRequest> {
        if self.page.is_none() && self.size.is_none() {
            return None;
        }
        Some(PageRequest::new(
            self.page.unwrap_or(1),
            self.size.unwrap_or(PageRequest::DEFAULT_SIZE),
        ))
    }
}

/// Simple message response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
