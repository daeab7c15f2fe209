//! OpenAPI documentation served through Swagger UI.

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::session::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CHEDCOM Console API",
        version = "1.0.0",
        description = "Content management for the CHEDCOM public website.\n\n\
        ## Authentication\n\
        `POST /api/auth/login` sets an HTTP-only `session` cookie. The same token\n\
        is returned in the body and is accepted as `Authorization: Bearer <token>`.\n\n\
        Reads of blog posts, projects, trainings and gallery entries are public.\n\
        Every write needs a session. Admin account management needs a superadmin.\n\n\
        ## Gallery sync\n\
        Gallery tags are mirrored on a remote asset host. Local edits always commit;\n\
        a failed remote push is reported as `partialSuccess` and recorded in `syncStatus`.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "Login, logout and session lookup"),
        (name = "Blog", description = "Blog posts"),
        (name = "Projects", description = "Project records"),
        (name = "Trainings", description = "Training records"),
        (name = "Gallery", description = "Gallery entries and uploads to the asset host"),
        (name = "Admins", description = "Admin account management (superadmins only)"),
        (name = "Pages", description = "Session-gated console pages")
    ),
    paths(
        crate::handlers::health::health_check_simple,
        crate::handlers::health::health_check,
        crate::handlers::health::ready_check,
        crate::handlers::health::live_check,

        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::session,

        crate::handlers::blog::list_posts,
        crate::handlers::blog::create_post,
        crate::handlers::blog::get_post,
        crate::handlers::blog::update_post,
        crate::handlers::blog::delete_post,

        crate::handlers::projects::list_projects,
        crate::handlers::projects::create_project,
        crate::handlers::projects::get_project,
        crate::handlers::projects::update_project,
        crate::handlers::projects::delete_project,

        crate::handlers::trainings::list_trainings,
        crate::handlers::trainings::create_training,
        crate::handlers::trainings::get_training,
        crate::handlers::trainings::update_training,
        crate::handlers::trainings::delete_training,

        crate::handlers::gallery::list_gallery,
        crate::handlers::gallery::create_gallery_item,
        crate::handlers::gallery::get_gallery_item,
        crate::handlers::gallery::update_gallery_item,
        crate::handlers::gallery::resync_gallery_item,
        crate::handlers::gallery::delete_gallery_item,
        crate::handlers::uploads::upload_asset,

        crate::handlers::admins::list_admins,
        crate::handlers::admins::create_admin,
        crate::handlers::admins::get_admin,
        crate::handlers::admins::update_admin,
        crate::handlers::admins::delete_admin,

        crate::handlers::pages::dashboard,
        crate::handlers::pages::section,
        crate::handlers::pages::login_page,
    ),
    components(
        schemas(
            crate::error::ApiError,
            crate::handlers::MessageResponse,
            crate::models::Role,
            crate::models::MediaType,
            crate::models::TrainingMode,
            crate::models::SyncStatus,
            crate::models::GalleryItem,
            crate::handlers::gallery::GalleryView,
            crate::handlers::gallery::PartialSuccessResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE,
                    "Signed session set by /api/auth/login",
                ))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token from /api/auth/login, sent as `Authorization: Bearer <token>`",
                        ))
                        .build(),
                ),
            );
        }

        openapi.security = Some(vec![]);
    }
}

pub fn swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "CHEDCOM Console API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_openapi_has_security_schemes() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");
        assert!(components.security_schemes.contains_key("session_cookie"));
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_documents_gallery_sync() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/api/gallery/{id}/sync"));
        assert!(spec.paths.paths.contains_key("/api/admins/{id}"));
    }
}
