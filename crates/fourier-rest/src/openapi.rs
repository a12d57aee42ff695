//! OpenAPI documentation for the REST API.

use crate::controllers::HealthResponse;
use axum::Json;
use fourier_core::{ErrorResponse, FieldError};
use fourier_service::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest, UserInfo};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI documentation for the Fourier API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fourier Auth API",
        version = "0.1.0",
        description = "Cookie-based JWT authentication backend",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::auth_controller::register,
        crate::controllers::auth_controller::login,
        crate::controllers::auth_controller::logout,
        crate::controllers::auth_controller::get_me,
        crate::controllers::auth_controller::get_all_users,
        crate::controllers::health_controller::health_check,
        crate::controllers::health_controller::readiness_check,
        crate::controllers::health_controller::liveness_check,
    ),
    components(
        schemas(
            ErrorResponse,
            FieldError,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            MessageResponse,
            UserInfo,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and current user"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Registers the access token cookie as a security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::extractors::ACCESS_TOKEN_COOKIE,
                ))),
            );
        }
    }
}

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
