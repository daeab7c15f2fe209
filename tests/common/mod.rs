//! Common test utilities and helpers for integration tests.
//!
//! Every `TestApp` runs the full router on an ephemeral port against its own
//! in-memory store, next to a stub asset host that can be told to fail.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use reqwest::{header, redirect::Policy, Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use chedcom_console::{
    assets::ReImageClient,
    auth::password::PasswordService,
    create_router,
    models::{NewUser, Role, User},
    store::{Repository, Store},
    AppState, Config,
};

pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Records what the console pushed to the remote asset host.
#[derive(Clone, Default)]
pub struct StubAssetHost {
    pub fail: Arc<AtomicBool>,
    pub stall: Arc<AtomicBool>,
    pub tags: Arc<Mutex<HashMap<String, Vec<String>>>>,
    pub uploads: Arc<AtomicUsize>,
}

impl StubAssetHost {
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn tags_for(&self, asset_id: &str) -> Option<Vec<String>> {
        self.tags.lock().unwrap().get(asset_id).cloned()
    }

    /// Makes the tag endpoint hang well past any short client timeout.
    pub fn set_stalling(&self, stalling: bool) {
        self.stall.store(stalling, Ordering::SeqCst);
    }

    fn failing(&self) -> bool {
        self.fail.load(Ordering::SeqCst)
    }
}

#[derive(Deserialize)]
struct TagBody {
    tags: Vec<String>,
}

async fn stub_upload(State(stub): State<StubAssetHost>, mut multipart: Multipart) -> impl IntoResponse {
    if stub.failing() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "remote storage down").into_response();
    }

    let mut file_name = String::from("upload");
    let mut tags = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("upload").to_string();
                let _ = field.bytes().await;
            }
            "tags" => {
                let raw = field.text().await.unwrap_or_default();
                tags = raw
                    .split(',')
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            _ => {}
        }
    }

    let asset_id = Uuid::new_v4().simple().to_string();
    stub.tags.lock().unwrap().insert(asset_id.clone(), tags);
    stub.uploads.fetch_add(1, Ordering::SeqCst);

    Json(json!({
        "original": format!("https://cdn.test/{asset_id}/{file_name}"),
        "object_id": asset_id,
    }))
    .into_response()
}

async fn stub_tag(
    State(stub): State<StubAssetHost>,
    Path(asset_id): Path<String>,
    Json(body): Json<TagBody>,
) -> impl IntoResponse {
    if stub.stall.load(Ordering::SeqCst) {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    if stub.failing() {
        return (StatusCode::SERVICE_UNAVAILABLE, "tag service unavailable").into_response();
    }
    stub.tags.lock().unwrap().insert(asset_id, body.tags);
    StatusCode::OK.into_response()
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://127.0.0.1:{port}")
}

/// A test application instance with its own HTTP client and base URL.
pub struct TestApp {
    pub client: Client,
    pub base_url: String,
    pub store: Store,
    pub asset_host: StubAssetHost,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns the app after letting the caller adjust the test config.
    pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> Self {
        let asset_host = StubAssetHost::default();
        let stub_router = Router::new()
            .route("/upload/", post(stub_upload))
            .route("/tag/{asset_id}", post(stub_tag))
            .with_state(asset_host.clone());
        let stub_url = serve(stub_router).await;

        let mut config = Config::default_for_testing();
        config.asset_host.base_url = stub_url;
        configure(&mut config);

        let store = Store::in_memory();
        let client = ReImageClient::new(&config.asset_host).expect("asset host client");
        let state = AppState::new(store.clone(), Arc::new(client), &config);
        let base_url = serve(create_router(state, &config)).await;

        Self {
            client: Client::builder()
                .redirect(Policy::none())
                .build()
                .expect("Failed to build client"),
            base_url,
            store,
            asset_host,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn unique_email() -> String {
        format!("test_{}@chedcom.org", Uuid::new_v4().simple())
    }

    /// Inserts an account directly into the store.
    pub fn create_user(&self, email: &str, role: Role) -> User {
        self.store
            .users
            .insert(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: PasswordService::hash_password_with_cost(TEST_PASSWORD, 4)
                    .expect("hash"),
                role,
            })
            .expect("Failed to create user")
    }

    pub async fn login_response(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Logs in and returns the `Cookie` header value for the session.
    pub async fn login(&self, email: &str) -> String {
        let response = self.login_response(email, TEST_PASSWORD).await;
        assert_eq!(response.status().as_u16(), 200, "login failed");
        session_cookie(&response).expect("login did not set a session cookie")
    }

    /// Creates an account with `role` and returns its session cookie.
    pub async fn signed_in(&self, role: Role) -> (User, String) {
        let email = Self::unique_email();
        let user = self.create_user(&email, role);
        let cookie = self.login(&email).await;
        (user, cookie)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>, body: Value) -> Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, cookie: Option<&str>, body: Value) -> Response {
        let mut request = self.client.put(self.url(path)).json(&body);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> Response {
        let mut request = self.client.delete(self.url(path));
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        request.send().await.expect("Failed to execute request")
    }

    /// Creates a gallery entry and returns its JSON.
    pub async fn create_gallery_item(&self, cookie: &str, title: &str, media_url: &str) -> Value {
        let response = self
            .post(
                "/api/gallery",
                Some(cookie),
                json!({
                    "title": title,
                    "mediaUrl": media_url,
                    "assetId": format!("asset-{}", Uuid::new_v4().simple()),
                    "tags": ["community"]
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);
        response.json().await.expect("Failed to parse response")
    }
}

/// Extracts `session=<token>` from a response's `Set-Cookie` headers.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("session="))
        .map(str::to_string)
}
