//! Current-user extractors backed by the access token cookie.

use crate::{responses::AppError, state::AppState};
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use fourier_core::User;

/// Name of the HTTP-only cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "users_access_token";

/// Reads the access token cookie, if present and non-empty.
#[must_use]
pub fn access_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// The user the request's access token was issued to.
pub struct CurrentUser(pub User);

impl std::ops::Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(parts);
        let user = state.auth_service.current_user(token.as_deref()).await?;
        Ok(Self(user))
    }
}

/// Like [`CurrentUser`], but resolves to `None` instead of rejecting.
pub struct OptionalCurrentUser(pub Option<User>);

impl std::ops::Deref for OptionalCurrentUser {
    type Target = Option<User>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalCurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(parts);
        Ok(Self(
            state
                .auth_service
                .current_user_optional(token.as_deref())
                .await,
        ))
    }
}

/// A current user holding an admin role.
pub struct AdminUser(pub User);

impl std::ops::Deref for AdminUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(parts);
        let user = state
            .auth_service
            .current_admin_user(token.as_deref())
            .await?;
        Ok(Self(user))
    }
}
