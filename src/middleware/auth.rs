//! Session and role gates.
//!
//! Gates resolve the caller from the signed session and fail closed: a
//! missing, expired or tampered token is the same as no session.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use tracing::{debug, warn};

use crate::{
    error::ApiError,
    telemetry::{record_auth_attempt, AuthOutcome},
    AppState,
};

pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Lets reads through and requires a session for every write. The resolved
/// claims are stored in request extensions.
pub async fn staff_write_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    if req.method().is_safe() {
        return Ok(next.run(req).await);
    }

    let claims = state.sessions.resolve(req.headers()).ok_or_else(|| {
        debug!(method = %req.method(), path = %req.uri().path(), "Write without session");
        ApiError::unauthorized("Authentication required", "UNAUTHORIZED").into_response()
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Admin-account management is limited to callers whose role can manage
/// admins. Anything else is a 403, never a redirect.
pub async fn admin_manager_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    match state.sessions.resolve(req.headers()) {
        Some(claims) if claims.can_manage_admins() => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        other => {
            warn!(
                caller = other.as_ref().map(|c| c.email.as_str()).unwrap_or("anonymous"),
                path = %req.uri().path(),
                "Admin management denied"
            );
            record_auth_attempt("admin_management", AuthOutcome::Forbidden);
            Err(ApiError::forbidden("Forbidden: Superadmins only", "FORBIDDEN").into_response())
        }
    }
}

/// Every `/admin` page except the login page itself needs a session; anonymous
/// callers are sent to the login page with the requested path as
/// `callbackUrl`.
pub async fn admin_page_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.uri().path() == ADMIN_LOGIN_PATH {
        return next.run(req).await;
    }

    match state.sessions.resolve(req.headers()) {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        None => {
            let original = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/admin");
            Redirect::temporary(&login_redirect(original)).into_response()
        }
    }
}

/// `/admin/login?callbackUrl=<percent-encoded target>`
pub fn login_redirect(callback: &str) -> String {
    match Url::parse_with_params("http://localhost/admin/login", &[("callbackUrl", callback)]) {
        Ok(url) => match url.query() {
            Some(query) => format!("{ADMIN_LOGIN_PATH}?{query}"),
            None => ADMIN_LOGIN_PATH.to_string(),
        },
        Err(_) => ADMIN_LOGIN_PATH.to_string(),
    }
}
