//! Media upload proxy.
//!
//! Files are streamed through to the remote asset host together with their
//! initial tags. Nothing is written locally; the client follows up with
//! `POST /api/gallery` using the returned `url` and `assetId`.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    assets::{AssetHostError, AssetUpload},
    error::{ApiError, ApiResult},
    media::parse_tag_list,
    AppState,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[schema(example = "https://cdn.example/borehole.jpg")]
    pub url: String,
    #[schema(example = "a1b2c3d4")]
    pub asset_id: String,
}

fn malformed(e: MultipartError) -> (StatusCode, Json<ApiError>) {
    ApiError::bad_request(format!("Malformed upload: {e}"), "INVALID_MULTIPART")
}

async fn read_upload(mut multipart: Multipart) -> ApiResult<AssetUpload> {
    let mut file = None;
    let mut tags = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            "tags" => {
                let raw = field.text().await.map_err(malformed)?;
                tags.extend(parse_tag_list(&raw));
            }
            _ => {}
        }
    }

    let Some((file_name, content_type, bytes)) = file.filter(|(_, _, b)| !b.is_empty()) else {
        return Err(ApiError::bad_request("No file provided", "MISSING_FILE"));
    };

    Ok(AssetUpload {
        file_name,
        content_type,
        bytes,
        tags,
    })
}

#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "Gallery",
    request_body(content_type = "multipart/form-data", description = "`file` plus an optional comma-separated `tags` field"),
    responses(
        (status = 201, description = "Asset stored on the remote host", body = UploadResponse),
        (status = 400, description = "No file provided", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 502, description = "Asset host rejected the upload", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn upload_asset(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let upload = read_upload(multipart).await?;
    let file_name = upload.file_name.clone();
    let size = upload.bytes.len();

    let uploaded = state.asset_host.upload(upload).await.map_err(|e| {
        warn!(file_name = %file_name, error = %e, "Asset upload failed");
        match e {
            AssetHostError::NotConfigured(_) => {
                ApiError::internal("Asset host is not configured", "ASSET_HOST_UNAVAILABLE")
            }
            other => ApiError::bad_gateway(format!("Upload failed: {other}"), "UPLOAD_FAILED"),
        }
    })?;

    info!(asset_id = %uploaded.asset_id, file_name = %file_name, size, "Asset uploaded");
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: uploaded.url,
            asset_id: uploaded.asset_id,
        }),
    ))
}
