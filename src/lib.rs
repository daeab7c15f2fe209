//! CHEDCOM console - content-management API for the public website.

pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod schema;
pub mod seed;
pub mod store;
pub mod telemetry;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use diesel::r2d2::{self, ConnectionManager};
use diesel::PgConnection;
use std::sync::Arc;
use std::time::Duration;

use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use assets::AssetHost;
use auth::{credentials::CredentialVerifier, session::SessionKeys};
use error::ApiError;
use media::ImageFormat;
use middleware::{
    admin_manager_gate, admin_page_gate, metrics::metrics_middleware,
    request_id::request_id_middleware, staff_write_gate,
};
use store::Store;
use telemetry::MetricsState;

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub sessions: Arc<SessionKeys>,
    pub credentials: CredentialVerifier,
    pub asset_host: Arc<dyn AssetHost>,
    pub password_hash_cost: u32,
    pub image_format: ImageFormat,
    pub metrics: MetricsState,
}

impl AppState {
    pub fn new(store: Store, asset_host: Arc<dyn AssetHost>, config: &Config) -> Self {
        let sessions = SessionKeys::from_config(&config.session);
        let credentials = CredentialVerifier::new(store.users.clone());
        let metrics = MetricsState::new(config.telemetry.metrics_enabled);

        Self {
            store,
            sessions: Arc::new(sessions),
            credentials,
            asset_host,
            password_hash_cost: config.security.password_hash_cost,
            image_format: config.media.image_format,
            metrics,
        }
    }
}

pub fn create_router(state: AppState, config: &config::Config) -> Router {
    let cors = build_cors_layer(config);
    let body_limit = RequestBodyLimitLayer::new(config.server.max_body_size);

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let metrics_state = state.metrics.clone();
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check_simple))
        .route("/health/status", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::ready_check))
        .route("/health/live", get(handlers::health::live_check))
        .route(
            "/metrics",
            get(telemetry::metrics::metrics_handler).with_state(metrics_state),
        )
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/session", get(handlers::auth::session))
        .with_state(state.clone());

    // Reads are public; every write needs a session.
    let content_routes = Router::new()
        .route(
            "/api/blog",
            get(handlers::blog::list_posts).post(handlers::blog::create_post),
        )
        .route(
            "/api/blog/{id}",
            get(handlers::blog::get_post)
                .put(handlers::blog::update_post)
                .delete(handlers::blog::delete_post),
        )
        .route(
            "/api/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/api/trainings",
            get(handlers::trainings::list_trainings).post(handlers::trainings::create_training),
        )
        .route(
            "/api/trainings/{id}",
            get(handlers::trainings::get_training)
                .put(handlers::trainings::update_training)
                .delete(handlers::trainings::delete_training),
        )
        .route(
            "/api/gallery",
            get(handlers::gallery::list_gallery).post(handlers::gallery::create_gallery_item),
        )
        .route(
            "/api/gallery/{id}",
            get(handlers::gallery::get_gallery_item)
                .put(handlers::gallery::update_gallery_item)
                .delete(handlers::gallery::delete_gallery_item),
        )
        .route(
            "/api/gallery/{id}/sync",
            post(handlers::gallery::resync_gallery_item),
        )
        .route(
            "/api/uploads",
            post(handlers::uploads::upload_asset)
                .layer(DefaultBodyLimit::max(config.server.max_body_size)),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            staff_write_gate,
        ))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route(
            "/api/admins",
            get(handlers::admins::list_admins).post(handlers::admins::create_admin),
        )
        .route(
            "/api/admins/{id}",
            get(handlers::admins::get_admin)
                .put(handlers::admins::update_admin)
                .delete(handlers::admins::delete_admin),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_manager_gate,
        ))
        .with_state(state.clone());

    let page_routes = Router::new()
        .route("/admin", get(handlers::pages::dashboard))
        .route("/admin/login", get(handlers::pages::login_page))
        .route("/admin/{*section}", get(handlers::pages::section))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            admin_page_gate,
        ))
        .with_state(state.clone());

    let docs_routes = openapi::swagger_router();

    Router::new()
        .merge(docs_routes)
        .merge(public_routes)
        .merge(content_routes)
        .merge(admin_routes)
        .merge(page_routes)
        .fallback(fallback_handler)
        .layer(axum_middleware::from_fn(metrics_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(timeout)
        .layer(body_limit)
        .layer(cors)
}

async fn fallback_handler() -> impl IntoResponse {
    ApiError::not_found("Not found", "NOT_FOUND")
}

fn build_cors_layer(config: &config::Config) -> CorsLayer {
    use axum::http::header::HeaderName;
    use axum::http::{HeaderValue, Method};

    let is_wildcard_origin = config.cors.allowed_origins.contains(&"*".to_string())
        || config.cors.allowed_origins.is_empty();

    let methods: Vec<Method> = config
        .cors
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    let headers: Vec<HeaderName> = config
        .cors
        .allowed_headers
        .iter()
        .filter_map(|h| h.parse().ok())
        .collect();

    let origins = || -> Vec<HeaderValue> {
        config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect()
    };

    let cors = match (config.cors.allow_credentials, is_wildcard_origin) {
        // Credentialed requests cannot use `*`; echo the caller's origin instead.
        (true, true) => CorsLayer::new().allow_origin(tower_http::cors::AllowOrigin::mirror_request()),
        (_, false) => CorsLayer::new().allow_origin(origins()),
        (false, true) => CorsLayer::new().allow_origin(Any),
    };

    cors.allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.cors.allow_credentials)
        .max_age(Duration::from_secs(config.cors.max_age_secs))
}

/// Builds the pool once at start-up; fails if the minimum idle connections
/// cannot be opened.
pub fn create_db_pool(config: &config::Config) -> Result<DbPool, r2d2::PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(&config.database.url);
    r2d2::Pool::builder()
        .max_size(config.database.max_connections)
        .min_idle(Some(config.database.min_connections))
        .connection_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .idle_timeout(Some(Duration::from_secs(config.database.idle_timeout_secs)))
        .build(manager)
}

pub fn init_tracing(config: &config::Config) {
    telemetry::init_telemetry(config);
}

pub use config::Config;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_build_cors_layer_wildcard() {
        let mut config = Config::default_for_testing();
        config.cors.allowed_origins = vec!["*".to_string()];
        let _ = build_cors_layer(&config);
    }

    #[test]
    fn test_build_cors_layer_specific_origins() {
        let mut config = Config::default_for_testing();
        config.cors.allowed_origins = vec![
            "http://localhost:3000".to_string(),
            "https://example.com".to_string(),
        ];
        config.cors.allow_credentials = true;
        let _ = build_cors_layer(&config);
    }
}
