//! Authentication controller.

use crate::{
    extractors::{AdminUser, CurrentUser, ValidatedJson, ACCESS_TOKEN_COOKIE},
    responses::{ok, ApiResponse, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use fourier_core::ErrorResponse;
use fourier_service::{
    ListUsersQuery, LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfo,
};
use tracing::debug;

/// Creates the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(get_me))
        .route("/all_users", get(get_all_users))
}

/// Register a new user.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = MessageResponse),
        (status = 409, description = "User already exists", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<MessageResponse> {
    debug!("Registration request");

    let response = state.auth_service.register(request).await?;
    ok(response)
}

/// Log in and receive the access token, also set as an HTTP-only cookie.
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), AppError> {
    debug!("Login request");

    let response = state.auth_service.login(request).await?;
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, response.access_token.clone()))
        .path("/")
        .http_only(true);

    Ok((jar.add(cookie), Json(ApiResponse::success(response))))
}

/// Log out by clearing the access token cookie.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<ApiResponse<MessageResponse>>) {
    debug!("Logout request");

    let jar = jar.remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"));
    (jar, Json(ApiResponse::success(state.auth_service.logout())))
}

/// Get the current user.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserInfo),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(("cookie_auth" = []))
)]
pub async fn get_me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<UserInfo> {
    debug!("Get current user: {}", user.id);

    let info = state.auth_service.user_info(&user).await?;
    ok(info)
}

/// List users. Admin only; `page`/`size` switch to a paginated response.
#[utoipa::path(
    get,
    path = "/auth/all_users",
    tag = "auth",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserInfo]),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Insufficient permissions", body = ErrorResponse)
    ),
    security(("cookie_auth" = []))
)]
pub async fn get_all_users(
    State(state): State<AppState>,
    admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Response, AppError> {
    debug!("Admin {} listing users", admin.id);

    let response = match query.page_request() {
        Some(page) => {
            let users = state.auth_service.list_users_page(page).await?;
            Json(ApiResponse::success(users)).into_response()
        }
        None => {
            let users = state.auth_service.list_users().await?;
            Json(ApiResponse::success(users)).into_response()
        }
    };
    Ok(response)
}
