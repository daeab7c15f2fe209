//! Blog post handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::{reject_blank, MessageResponse};
use crate::{
    error::{parse_id, ApiError, ApiResult, JsonBody},
    models::{BlogPost, BlogPostChanges, NewBlogPost},
    AppState,
};

const NOT_FOUND: &str = "Blog post not found";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Title is required"))]
    #[schema(example = "Clean water for Kisumu")]
    pub title: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub published: bool,
}

impl From<CreateBlogPostRequest> for NewBlogPost {
    fn from(req: CreateBlogPostRequest) -> Self {
        Self {
            title: req.title.trim().to_string(),
            content: req.content,
            cover_image: req.cover_image.filter(|c| !c.trim().is_empty()),
            tags: req.tags,
            published: req.published,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/blog",
    tag = "Blog",
    responses(
        (status = 200, description = "All posts, newest first", body = Vec<BlogPost>),
        (status = 500, description = "Internal server error", body = ApiError)
    )
)]
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<BlogPost>>> {
    let posts = state
        .store
        .blog
        .list()
        .map_err(|e| ApiError::store(e, "Failed to fetch blog posts"))?;
    Ok(Json(posts))
}

#[utoipa::path(
    post,
    path = "/api/blog",
    tag = "Blog",
    request_body = CreateBlogPostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPost),
        (status = 400, description = "Missing required field", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateBlogPostRequest>,
) -> ApiResult<(StatusCode, Json<BlogPost>)> {
    payload.validate().map_err(ApiError::validation)?;
    reject_blank(Some(&payload.title), "title")?;

    let post = state
        .store
        .blog
        .insert(payload.into())
        .map_err(|e| ApiError::store(e, "Failed to create blog post"))?;

    info!(post_id = %post.id, "Blog post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/api/blog/{id}",
    tag = "Blog",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post found", body = BlogPost),
        (status = 404, description = "Post not found", body = ApiError)
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<BlogPost>> {
    let id = parse_id(&id, NOT_FOUND)?;
    state
        .store
        .blog
        .find(id)
        .map_err(|e| ApiError::store(e, "Failed to fetch blog post"))?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))
}

#[utoipa::path(
    put,
    path = "/api/blog/{id}",
    tag = "Blog",
    params(("id" = String, Path, description = "Post ID")),
    request_body = BlogPostChanges,
    responses(
        (status = 200, description = "Post updated", body = BlogPost),
        (status = 400, description = "Invalid field", body = ApiError),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Post not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(changes): JsonBody<BlogPostChanges>,
) -> ApiResult<Json<BlogPost>> {
    let id = parse_id(&id, NOT_FOUND)?;
    reject_blank(changes.title.as_deref(), "title")?;
    reject_blank(changes.content.as_deref(), "content")?;

    let post = state
        .store
        .blog
        .update(id, changes)
        .map_err(|e| ApiError::store(e, "Failed to update blog post"))?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND, "NOT_FOUND"))?;

    info!(post_id = %post.id, "Blog post updated");
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/api/blog/{id}",
    tag = "Blog",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiError),
        (status = 404, description = "Post not found", body = ApiError)
    ),
    security(("session_cookie" = []))
)]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id, NOT_FOUND)?;
    let deleted = state
        .store
        .blog
        .delete(id)
        .map_err(|e| ApiError::store(e, "Failed to delete blog post"))?;

    if !deleted {
        return Err(ApiError::not_found(NOT_FOUND, "NOT_FOUND"));
    }

    info!(post_id = %id, "Blog post deleted");
    Ok(Json(MessageResponse::new("Blog post deleted successfully")))
}
