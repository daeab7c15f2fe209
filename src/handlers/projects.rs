//! Project handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::{effective_end_date, reject_blank, MessageResponse};
use crate::{
    error::{parse_id, ApiError, ApiResult, JsonBody},
    models::{NewProject, Project, ProjectChanges},
    AppState,
};

const NOT_FOUND: &str = "Project not found";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Community health outreach")]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Short description is required"))]
    pub short_description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Full description is required"))]
    pub full_description: String,
    #[serde(default)]
    pub collaborators: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[validate(required(message = "Start date is required"))]
    #[schema(example = "2024-03-01")]
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: bool,
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "Projects",
    responses(
        (status = 200, description = "All projects, newest first", body = Vec<Project>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = state
        .store
        .projects
        .list()
        .map_err(|e| ApiError::store(e, "Failed to fetch projects"))?;
    Ok(Json(projects))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "Projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Missing required field or invalid dates", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_project(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateProjectRequest>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    payload.validate().map_err(ApiError::validation)?;
    reject_blank(Some(&payload.title), "title")?;

    let Some(start_date) = payload.start_date else {
        return Err(ApiError::bad_request("Start date is required", "VALIDATION_ERROR"));
    };
    let end_date = effective_end_date(start_date, payload.end_date, payload.is_ongoing)?;

    let project = state
        .store
        .projects
        .insert(NewProject {
            title: payload.title.trim().to_string(),
            short_description: payload.short_description,
            full_description: payload.full_description,
            collaborators: payload.collaborators,
            image_urls: payload.image_urls,
            start_date,
            end_date,
            is_ongoing: payload.is_ongoing,
        })
        .map_err(|e| ApiError::store(e, "Failed to create project"))?;

    info!(project_id = %project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project found", body = Project),
        (status = 404, description = "Project not found", body = ApiError)
    )
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Project>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state
        .store
        .projects
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch project"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    request_body = ProjectChanges,
    responses(
        (status = 200, description = "Project updated", body = Project),
        (status = 400, description = "Invalid field or dates", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Project not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(mut changes): JsonBody<ProjectChanges>,
) -> ApiResult<Json<Project>> {
    let id = parse_id(&id, NOT_FOUND)?;
    reject_blank(changes.title.as_deref(), "title")?;
    reject_blank(changes.short_description.as_deref(), "shortDescription")?;
    reject_blank(changes.full_description.as_deref(), "fullDescription")?;

    let existing = state
        .store
        .projects
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch project"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    let end_date = effective_end_date(
        changes.start_date.unwrap_or(existing.start_date),
        changes.end_date.unwrap_or(existing.end_date),
        changes.is_ongoing.unwrap_or(existing.is_ongoing),
    )?;
    changes.end_date = Some(end_date);

    let project = state
        .store
        .projects
        .update(id, changes)
        .map_err(|e| ApiError::store(e, "Failed to update project"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    info!(project_id = %project.id, "Project updated");
    Ok(Json(project))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "Projects",
    params(("id" = String, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Project not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .store
        .projects
        .delete(id)
        .map_err(|e| ApiError::store(e, "Failed to delete project"))?;

    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND, "NOT_FOUND"));
    }

    info!(project_id = %id, "Project deleted");
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
