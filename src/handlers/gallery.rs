//! Gallery handlers.
//!
//! Gallery records point at media stored on the remote asset host. Creating a
//! record only writes locally (the asset and its tags were sent during
//! upload). Updates commit locally first and then push tags; a failed push is
//! reported as a partial success and never undone.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::reject_blank;
use crate::{
    assets::sync::{push_tags, update_and_sync, SyncOutcome},
    auth::session::SessionClaims,
    error::{parse_id, ApiError, ApiResult, JsonBody},
    media::{classify_media_type, sanitize_tags, to_next_gen_url, ImageFormat},
    models::{explicit_null, GalleryChanges, GalleryItem, MediaType, NewGalleryItem, SyncStatus},
    pagination::{Page, PaginationParams},
    store::Repository,
    AppState,
};

const NOT_FOUND: &str = "Gallery item not found";

/// A gallery record as served to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryView {
    #[serde(flatten)]
    pub item: GalleryItem,
    /// `mediaUrl` rewritten to the preferred next-gen image format.
    pub preview_url: String,
}

impl GalleryView {
    pub fn new(item: GalleryItem, format: ImageFormat) -> Self {
        let preview_url = match item.media_type {
            MediaType::Image => to_next_gen_url(&item.media_url, format),
            MediaType::Video => item.media_url.clone(),
        };
        Self { item, preview_url }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryRequest {
    #[serde(default)]
    #[schema(example = "Borehole handover")]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[schema(example = "https://cdn.example/borehole.jpg")]
    pub media_url: Option<String>,
    #[schema(example = "a1b2c3d4")]
    pub asset_id: Option<String>,
    /// Defaults to the caller's name.
    pub uploaded_by: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PartialSuccessResponse {
    #[schema(example = "Gallery updated, but failed to sync tags to the asset host")]
    pub message: String,
    pub partial_success: bool,
    /// Why the remote sync failed.
    pub warning: String,
    pub updated: GalleryView,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GalleryDeleteResponse {
    pub message: String,
    /// Remote asset left in place.
    pub asset_id: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    get,
    path = "/api/gallery",
    tag = "Gallery",
    params(PaginationParams),
    responses(
        (status = 200, description = "All entries newest first, or one page when `page` or `limit` is given", body = Page<GalleryView>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Response> {
    let format = state.image_format;

    if !params.is_requested() {
        let items = state
            .store
            .gallery
            .list()
            .map_err(|e| ApiError::store(e, "Failed to fetch gallery"))?;
        let views: Vec<GalleryView> = items
            .into_iter()
            .map(|item| GalleryView::new(item, format))
            .collect();
        return Ok(Json(views).into_response());
    }

    let (items, total) = state
        .store
        .gallery
        .page(params.limit(), params.offset())
        .map_err(|e| ApiError::store(e, "Failed to fetch gallery"))?;

    let page = Page::new(items, &params, total).map(|item| GalleryView::new(item, format));
    Ok(Json(page).into_response())
}

#[utoipa::path(
    post,
    path = "/api/gallery",
    tag = "Gallery",
    request_body = CreateGalleryRequest,
    responses(
        (status = 201, description = "Entry created", body = GalleryView),
        (status = 400, description = "Missing mediaUrl, assetId or title", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_gallery_item(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    JsonBody(payload): JsonBody<CreateGalleryRequest>,
) -> ApiResult<(StatusCode, Json<GalleryView>)> {
    let (Some(media_url), Some(asset_id)) =
        (non_blank(payload.media_url), non_blank(payload.asset_id))
    else {
        return Err(ApiError::bad_request(
            "mediaUrl and assetId are required",
            "MISSING_MEDIA",
        ));
    };

    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::bad_request("Title is required", "VALIDATION_ERROR"));
    }

    let new_item = NewGalleryItem {
        title,
        description: non_blank(payload.description),
        media_type: classify_media_type(&media_url),
        media_url,
        asset_id,
        tags: sanitize_tags(payload.tags),
        uploaded_by: non_blank(payload.uploaded_by).or(Some(claims.name)),
        sync_status: SyncStatus::Synced,
    };

    let item = state
        .store
        .gallery
        .insert(new_item)
        .map_err(|e| ApiError::store(e, "Failed to create gallery item"))?;

    info!(
        gallery_id = %item.id,
        asset_id = %item.asset_id,
        media_type = %item.media_type,
        "Gallery item created"
    );
    Ok((
        StatusCode::CREATED,
        Json(GalleryView::new(item, state.image_format)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    params(("id" = String, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Entry found", body = GalleryView),
        (status = 404, description = "Entry not found", body = ApiError)
    )
)]
pub async fn get_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GalleryView>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let item = state
        .store
        .gallery
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch gallery item"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;
    Ok(Json(GalleryView::new(item, state.image_format)))
}

#[utoipa::path(
    put,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    params(("id" = String, Path, description = "Gallery item ID")),
    request_body = UpdateGalleryRequest,
    responses(
        (status = 200, description = "Entry updated; `partialSuccess` is set when the remote tag sync failed", body = PartialSuccessResponse),
        (status = 400, description = "Invalid field", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateGalleryRequest>,
) -> ApiResult<Response> {
    let id = parse_id(&id, NOT_FOUND)?;
    reject_blank(payload.title.as_deref(), "title")?;

    let changes = GalleryChanges {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        tags: payload.tags.map(sanitize_tags),
        sync_status: None,
    };

    let outcome = update_and_sync(
        state.store.gallery.as_ref(),
        state.asset_host.as_ref(),
        id,
        changes,
    )
    .await
    .map_err(|e| ApiError::store(e, "Failed to update gallery item"))?
    .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    let response = match outcome {
        SyncOutcome::Synced(item) => {
            Json(GalleryView::new(item, state.image_format)).into_response()
        }
        SyncOutcome::Failed { item, reason } => Json(PartialSuccessResponse {
            message: "Gallery updated, but failed to sync tags to the asset host".to_string(),
            partial_success: true,
            warning: reason,
            updated: GalleryView::new(item, state.image_format),
        })
        .into_response(),
    };
    Ok(response)
}

#[utoipa::path(
    post,
    path = "/api/gallery/{id}/sync",
    tag = "Gallery",
    params(("id" = String, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Tags pushed to the asset host", body = GalleryView),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError),
        (status = 502, description = "Asset host rejected or did not answer", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn resync_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GalleryView>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let item = state
        .store
        .gallery
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch gallery item"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    match push_tags(state.store.gallery.as_ref(), state.asset_host.as_ref(), item).await {
        SyncOutcome::Synced(item) => {
            info!(gallery_id = %item.id, "Gallery tags resynced");
            Ok(Json(GalleryView::new(item, state.image_format)))
        }
        SyncOutcome::Failed { reason, .. } => Err(ApiError::bad_gateway(
            format!("Failed to sync tags to the asset host: {reason}"),
            "ASSET_SYNC_FAILED",
        )),
    }
}

#[utoipa::path(
    delete,
    path = "/api/gallery/{id}",
    tag = "Gallery",
    params(("id" = String, Path, description = "Gallery item ID")),
    responses(
        (status = 200, description = "Local entry deleted; the remote asset is kept", body = GalleryDeleteResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Entry not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_gallery_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<GalleryDeleteResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let item = state
        .store
        .gallery
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch gallery item"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    let deleted = state
        .store
        .gallery
        .delete(id)
        .map_err(|e| ApiError::store(e, "Failed to delete gallery item"))?;
    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND, "NOT_FOUND"));
    }

    info!(gallery_id = %id, asset_id = %item.asset_id, "Gallery item deleted, remote asset kept");
    Ok(Json(GalleryDeleteResponse {
        message: "Gallery item deleted. The remote asset was not removed from the asset host \
                  and may need manual cleanup."
            .to_string(),
        asset_id: item.asset_id,
    }))
}
