//! Admin account management. Every route here sits behind the admin-manager
//! gate, so callers are always superadmins.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

use super::{reject_blank, MessageResponse};
use crate::{
    auth::{password::PasswordService, session::SessionClaims},
    error::{parse_id, ApiError, ApiResult, JsonBody},
    models::{NewUser, Role, User, UserChanges},
    store::Repository,
    AppState,
};

const NOT_FOUND: &str = "Admin not found";

/// An admin account without its password hash.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: Uuid,
    #[schema(example = "Grace Achieng")]
    pub name: String,
    #[schema(example = "pm@chedcom.org")]
    pub email: String,
    pub role: Role,
    /// Derived from `role`.
    pub can_manage_admins: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<User> for AdminResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            can_manage_admins: user.role.can_manage_admins(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub name: Option<String>,
    #[schema(example = "fo@chedcom.org")]
    pub email: Option<String>,
    pub password: Option<String>,
    /// Defaults to `admin`.
    pub role: Option<Role>,
    /// Accepted and ignored; always derived from `role`.
    pub can_manage_admins: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    /// Re-hashed when present and non-empty.
    pub password: Option<String>,
    pub role: Option<Role>,
    /// Accepted and ignored; always derived from `role`.
    pub can_manage_admins: Option<bool>,
}

fn normalize_email(raw: &str) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    if !email.validate_email() {
        return Err(ApiError::bad_request("Invalid email format", "VALIDATION_ERROR"));
    }
    Ok(email)
}

fn hash(password: &str, cost: u32) -> ApiResult<String> {
    PasswordService::hash_password_with_cost(password, cost).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::internal("Failed to hash password", "HASH_ERROR")
    })
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "Admins",
    responses(
        (status = 200, description = "All admin accounts, newest first", body = Vec<AdminResponse>),
        (status = 403, description = "Caller cannot manage admins", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn list_admins(State(state): State<AppState>) -> ApiResult<Json<Vec<AdminResponse>>> {
    let users = state
        .store
        .users
        .list()
        .map_err(|e| ApiError::store(e, "Failed to fetch admins"))?;
    Ok(Json(users.into_iter().map(AdminResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/admins",
    tag = "Admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = AdminResponse),
        (status = 400, description = "Missing required fields", body = ApiError),
        (status = 403, description = "Caller cannot manage admins", body = ApiError),
        (status = 409, description = "E-mail already in use", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    JsonBody(payload): JsonBody<CreateAdminRequest>,
) -> ApiResult<(StatusCode, Json<AdminResponse>)> {
    if payload.can_manage_admins.is_some() {
        debug!("Ignoring caller-supplied canManageAdmins");
    }

    let (Some(name), Some(email), Some(password)) = (
        filled(payload.name),
        filled(payload.email),
        payload.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ApiError::bad_request(
            "Missing required fields",
            "VALIDATION_ERROR",
        ));
    };

    let new_user = NewUser {
        name: name.trim().to_string(),
        email: normalize_email(&email)?,
        password_hash: hash(&password, state.password_hash_cost)?,
        role: payload.role.unwrap_or_default(),
    };

    let user = state
        .store
        .users
        .insert(new_user)
        .map_err(|e| ApiError::store(e, "Failed to create admin"))?;

    info!(admin_id = %user.id, role = %user.role, created_by = %claims.id, "Admin created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = String, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin found", body = AdminResponse),
        (status = 403, description = "Caller cannot manage admins", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn get_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<AdminResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state
        .store
        .users
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch admin"))?
        .map(|user| Json(user.into()))
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))
}

#[utoipa::path(
    put,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = String, Path, description = "Admin ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = AdminResponse),
        (status = 400, description = "Invalid field", body = ApiError),
        (status = 403, description = "Caller cannot manage admins", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError),
        (status = 409, description = "E-mail already in use", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateAdminRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    if payload.can_manage_admins.is_some() {
        debug!("Ignoring caller-supplied canManageAdmins");
    }
    reject_blank(payload.name.as_deref(), "name")?;
    reject_blank(payload.email.as_deref(), "email")?;

    let changes = UserChanges {
        name: payload.name.map(|n| n.trim().to_string()),
        email: payload.email.as_deref().map(normalize_email).transpose()?,
        password_hash: payload
            .password
            .filter(|p| !p.is_empty())
            .map(|p| hash(&p, state.password_hash_cost))
            .transpose()?,
        role: payload.role,
    };

    let user = state
        .store
        .users
        .update(id, changes)
        .map_err(|e| ApiError::store(e, "Failed to update admin"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    info!(admin_id = %user.id, role = %user.role, "Admin updated");
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/admins/{id}",
    tag = "Admins",
    params(("id" = String, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Admin deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete own account", body = ApiError),
        (status = 403, description = "Caller cannot manage admins", body = ApiError),
        (status = 404, description = "Admin not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_admin(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    if id == claims.id {
        return Err(ApiError::bad_request(
            "You cannot delete your own account",
            "SELF_DELETE",
        ));
    }

    let deleted = state
        .store
        .users
        .delete(id)
        .map_err(|e| ApiError::store(e, "Failed to delete admin"))?;
    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND, "NOT_FOUND"));
    }

    info!(admin_id = %id, deleted_by = %claims.id, "Admin deleted");
    Ok(Json(MessageResponse::new("Admin deleted successfully")))
}
