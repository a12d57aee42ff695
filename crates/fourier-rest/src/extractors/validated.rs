//! Request bodies that must deserialize and pass their `validator` rules
//! before a handler runs.

use crate::responses::ApiResponse;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fourier_core::{field_errors, ErrorResponse, FourierError};
use serde::de::DeserializeOwned;
use tracing::warn;
use validator::{Validate, ValidationErrors};

/// A JSON body that has passed validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

/// Why a body was turned away.
#[derive(Debug)]
pub enum BodyRejection {
    /// Not JSON, or not the expected shape. Keeps axum's status (400/415/422).
    Malformed(JsonRejection),
    /// Well-formed but breaks a field rule. Always 422.
    Invalid(ValidationErrors),
}

impl BodyRejection {
    fn status_and_error(&self) -> (StatusCode, ErrorResponse) {
        match self {
            Self::Malformed(rejection) => (
                rejection.status(),
                ErrorResponse {
                    code: "INVALID_JSON".to_string(),
                    message: format!("Invalid JSON: {rejection}"),
                    details: None,
                },
            ),
            Self::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::from_error(&FourierError::validation("Request validation failed"))
                    .with_details(field_errors(errors)),
            ),
        }
    }
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_error();
        warn!("Rejected request body ({}): {}", status.as_u16(), error.message);
        (status, Json(ApiResponse::<()>::error(error))).into_response()
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(BodyRejection::Malformed)?;
        body.validate().map_err(BodyRejection::Invalid)?;
        Ok(Self(body))
    }
}
