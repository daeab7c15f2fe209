//! Training handlers.

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
    models::{NewTraining, Training, TrainingChanges, TrainingMode},
    AppState,
};

const NOT_FOUND: &str = "Training not found";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "First aid for volunteers")]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Short description is required"))]
    pub short_description: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Full description is required"))]
    pub full_description: String,
    #[serde(default)]
    pub facilitators: Vec<String>,
    pub target_audience: Option<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub certificate_issued: bool,
    #[serde(default)]
    pub mode: TrainingMode,
    #[validate(required(message = "Start date is required"))]
    #[schema(example = "2024-05-13")]
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: bool,
}

#[utoipa::path(
    get,
    path = "/api/trainings",
    tag = "Trainings",
    responses(
        (status = 200, description = "All trainings, newest first", body = Vec<Training>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_trainings(State(state): State<AppState>) -> ApiResult<Json<Vec<Training>>> {
    let trainings = state
        .store
        .trainings
        .list()
        .map_err(|e| ApiError::store(e, "Failed to fetch trainings"))?;
    Ok(Json(trainings))
}

#[utoipa::path(
    post,
    path = "/api/trainings",
    tag = "Trainings",
    request_body = CreateTrainingRequest,
    responses(
        (status = 201, description = "Training created", body = Training),
        (status = 400, description = "Missing required field or invalid dates", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_training(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateTrainingRequest>,
) -> ApiResult<(StatusCode, Json<Training>)> {
    payload.validate().map_err(ApiError::validation)?;
    reject_blank(Some(&payload.title), "title")?;

    let Some(start_date) = payload.start_date else {
        return Err(ApiError::bad_request("Start date is required", "VALIDATION_ERROR"));
    };
    let end_date = effective_end_date(start_date, payload.end_date, payload.is_ongoing)?;

    let training = state
        .store
        .trainings
        .insert(NewTraining {
            title: payload.title.trim().to_string(),
            short_description: payload.short_description,
            full_description: payload.full_description,
            facilitators: payload.facilitators,
            target_audience: payload.target_audience.filter(|t| !t.trim().is_empty()),
            resources: payload.resources,
            image_urls: payload.image_urls,
            certificate_issued: payload.certificate_issued,
            mode: payload.mode,
            start_date,
            end_date,
            is_ongoing: payload.is_ongoing,
        })
        .map_err(|e| ApiError::store(e, "Failed to create training"))?;

    info!(training_id = %training.id, mode = %training.mode, "Training created");
    Ok((StatusCode::CREATED, Json(training)))
}

#[utoipa::path(
    get,
    path = "/api/trainings/{id}",
    tag = "Trainings",
    params(("id" = String, Path, description = "Training ID")),
    responses(
        (status = 200, description = "Training found", body = Training),
        (status = 404, description = "Training not found", body = ApiError)
    )
)]
pub async fn get_training(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Training>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state
        .store
        .trainings
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch training"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))
}

#[utoipa::path(
    put,
    path = "/api/trainings/{id}",
    tag = "Trainings",
    params(("id" = String, Path, description = "Training ID")),
    request_body = TrainingChanges,
    responses(
        (status = 200, description = "Training updated", body = Training),
        (status = 400, description = "Invalid field or dates", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Training not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_training(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(mut changes): JsonBody<TrainingChanges>,
) -> ApiResult<Json<Training>> {
    let id = parse_id(&id, NOT_FOUND)?;
    reject_blank(changes.title.as_deref(), "title")?;
    reject_blank(changes.short_description.as_deref(), "shortDescription")?;
    reject_blank(changes.full_description.as_deref(), "fullDescription")?;

    let existing = state
        .store
        .trainings
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch training"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    let end_date = effective_end_date(
        changes.start_date.unwrap_or(existing.start_date),
        changes.end_date.unwrap_or(existing.end_date),
        changes.is_ongoing.unwrap_or(existing.is_ongoing),
    )?;
    changes.end_date = Some(end_date);

    let training = state
        .store
        .trainings
        .update(id, changes)
        .map_err(|e| ApiError::store(e, "Failed to update training"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    info!(training_id = %training.id, "Training updated");
    Ok(Json(training))
}

#[utoipa::path(
    delete,
    path = "/api/trainings/{id}",
    tag = "Trainings",
    params(("id" = String, Path, description = "Training ID")),
    responses(
        (status = 200, description = "Training deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Training not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_training(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .store
        .trainings
        .delete(id)
        .map_err(|e| ApiError::store(e, "Failed to delete training"))?;

    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND, "NOT_FOUND"));
    }

    info!(training_id = %id, "Training deleted");
    Ok(Json(MessageResponse::new("Training deleted successfully")))
}
