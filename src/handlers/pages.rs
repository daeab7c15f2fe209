//! Console pages.
//!
//! The rendered console lives in a separate front end; these routes only
//! exercise the page gate and tell the client who is signed in.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::auth::sanitize_callback;
use crate::auth::session::{SessionClaims, SessionUser};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    #[schema(example = "blog")]
    pub section: String,
    pub user: SessionUser,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPageResponse {
    #[schema(example = "login")]
    pub section: String,
    #[schema(example = "/admin/blog")]
    pub callback_url: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LoginPageParams {
    /// Page to return to after login.
    pub callback_url: Option<String>,
}

#[utoipa::path(
    get,
    path = "/admin",
    tag = "Pages",
    responses(
        (status = 200, description = "Dashboard", body = PageResponse),
        (status = 307, description = "No session; redirected to the login page")
    )
)]
pub async fn dashboard(Extension(claims): Extension<SessionClaims>) -> Json<PageResponse> {
    Json(PageResponse {
        section: "dashboard".to_string(),
        user: SessionUser::from(&claims),
    })
}

#[utoipa::path(
    get,
    path = "/admin/{section}",
    tag = "Pages",
    params(("section" = String, Path, description = "Console section, e.g. `blog` or `gallery/new`")),
    responses(
        (status = 200, description = "Console section", body = PageResponse),
        (status = 307, description = "No session; redirected to the login page")
    )
)]
pub async fn section(
    Extension(claims): Extension<SessionClaims>,
    Path(section): Path<String>,
) -> Json<PageResponse> {
    Json(PageResponse {
        section: section.trim_matches('/').to_string(),
        user: SessionUser::from(&claims),
    })
}

#[utoipa::path(
    get,
    path = "/admin/login",
    tag = "Pages",
    params(LoginPageParams),
    responses(
        (status = 200, description = "Login page, always reachable", body = LoginPageResponse)
    )
)]
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Json<LoginPageResponse> {
    Json(LoginPageResponse {
        section: "login".to_string(),
        callback_url: sanitize_callback(params.callback_url.as_deref()),
    })
}
