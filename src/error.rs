//! Shared error handling utilities.
//!
//! Every API failure is a JSON body `{"message", "code"}` with a matching
//! status. Store failures are logged here and reach callers as a generic 500.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::store::StoreError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiError {
    #[schema(example = "Project not found")]
    pub message: String,
    #[schema(example = "NOT_FOUND")]
    pub code: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
        }
    }

    pub fn bad_request(
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_REQUEST, Json(Self::new(message, code)))
    }

    pub fn unauthorized(
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::UNAUTHORIZED, Json(Self::new(message, code)))
    }

    pub fn forbidden(
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::FORBIDDEN, Json(Self::new(message, code)))
    }

    pub fn not_found(
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::NOT_FOUND, Json(Self::new(message, code)))
    }

    pub fn conflict(message: impl Into<String>, code: impl Into<String>) -> (StatusCode, Json<Self>) {
        (StatusCode::CONFLICT, Json(Self::new(message, code)))
    }

    pub fn bad_gateway(
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> (StatusCode, Json<Self>) {
        (StatusCode::BAD_GATEWAY, Json(Self::new(message, code)))
    }

    pub fn internal(message: impl Into<String>, code: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(Self::new(message, code)),
        )
    }

    pub fn validation(errors: ValidationErrors) -> (StatusCode, Json<Self>) {
        Self::bad_request(format!("Validation error: {}", errors), "VALIDATION_ERROR")
    }

    /// Logs a store failure and converts it for the caller. Only unique
    /// constraint conflicts are reported as such; everything else is a 500.
    pub fn store(e: StoreError, context: &str) -> (StatusCode, Json<Self>) {
        match e {
            StoreError::Conflict(detail) => {
                tracing::warn!(detail = %detail, "{context}: conflict");
                Self::conflict("A record with the same unique value already exists", "CONFLICT")
            }
            other => {
                error!(error = %other, "{context}");
                Self::internal(context, "STORE_ERROR")
            }
        }
    }
}

pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Path ids that are not UUIDs cannot match a record, so they are a 404.
pub fn parse_id(raw: &str, not_found: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::not_found(not_found, "NOT_FOUND"))
}

/// `Json` extractor whose rejections use the [`ApiError`] body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(JsonRejected))]
pub struct JsonBody<T>(pub T);

#[derive(Debug)]
pub struct JsonRejected(JsonRejection);

impl From<JsonRejection> for JsonRejected {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection)
    }
}

impl IntoResponse for JsonRejected {
    fn into_response(self) -> Response {
        ApiError::bad_request(self.0.body_text(), "INVALID_JSON").into_response()
    }
}
