//! Authentication handlers.

use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::MessageResponse;
use crate::{
    auth::session::SessionUser,
    error::{ApiError, ApiResult, JsonBody},
    telemetry::{record_auth_attempt, AuthOutcome},
    AppState,
};

pub const DEFAULT_CALLBACK: &str = "/admin";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "pm@chedcom.org")]
    pub email: String,
    #[serde(default)]
    #[schema(example = "correct horse battery staple")]
    pub password: String,
    /// Where the console should go after login. Only same-site paths are honoured.
    #[schema(example = "/admin/blog")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: SessionUser,
    /// Same value as the `session` cookie, for API clients.
    pub token: String,
    #[schema(example = "/admin/blog")]
    pub callback_url: String,
}

/// Keeps post-login redirects on this site: relative paths only.
pub fn sanitize_callback(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path.to_string()
        }
        _ => DEFAULT_CALLBACK.to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; sets the `session` cookie", body = LoginResponse),
        (status = 400, description = "Missing e-mail or password", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request(
            "Email and password are required",
            "VALIDATION_ERROR",
        ));
    }
    payload.validate().map_err(ApiError::validation)?;

    let claims = state
        .credentials
        .verify(&payload.email, &payload.password)
        .map_err(|e| ApiError::store(e, "Login failed"))?;

    let Some(claims) = claims else {
        warn!(email = %payload.email, "Login failed: invalid credentials");
        record_auth_attempt("login", AuthOutcome::InvalidCredentials);
        return Err(ApiError::unauthorized(
            "Invalid email or password",
            "INVALID_CREDENTIALS",
        ));
    };

    let token = state.sessions.issue(&claims).map_err(|e| {
        error!(error = %e, "Failed to sign session token");
        ApiError::internal("Failed to create session", "SESSION_ERROR")
    })?;

    info!(user_id = %claims.id, role = %claims.role, "User logged in");
    record_auth_attempt("login", AuthOutcome::Success);

    let jar = jar.add(state.sessions.cookie(token.clone()));
    Ok((
        jar,
        Json(LoginResponse {
            user: SessionUser::from(&claims),
            token,
            callback_url: sanitize_callback(payload.callback_url.as_deref()),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(state.sessions.removal_cookie());
    (jar, Json(MessageResponse::new("Logged out")))
}

#[utoipa::path(
    get,
    path = "/api/auth/session",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current session", body = SessionUser),
        (status = 401, description = "No valid session", body = ApiError)
    ),
    security(("session_cookie" = []), ("bearer_auth" = []))
)]
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionUser>> {
    state
        .sessions
        .resolve(&headers)
        .map(|claims| Json(SessionUser::from(&claims)))
        .ok_or_else(|| ApiError::unauthorized("Not authenticated", "UNAUTHORIZED"))
}
