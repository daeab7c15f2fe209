//! Blog, project and training integration tests.

mod common;

use chedcom_console::models::Role;
use common::TestApp;
use serde_json::{json, Value};

fn project_body() -> Value {
    json!({
        "title": "Clean Water Initiative",
        "shortDescription": "Boreholes for three villages",
        "fullDescription": "A two-year programme drilling and maintaining boreholes.",
        "collaborators": ["County Water Office"],
        "imageUrls": [],
        "startDate": "2024-03-01",
        "endDate": "2025-03-01",
        "isOngoing": false
    })
}

// ============================================================================
// Authorization
// ============================================================================

#[tokio::test]
async fn reads_are_public_and_writes_need_a_session() {
    let app = TestApp::spawn().await;

    let list = app.get("/api/blog", None).await;
    assert_eq!(list.status().as_u16(), 200);

    let create = app
        .post(
            "/api/blog",
            None,
            json!({ "title": "Anonymous", "content": "Should not land" }),
        )
        .await;
    assert_eq!(create.status().as_u16(), 401);
    let body: Value = create.json().await.unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");

    let listed: Vec<Value> = app.get("/api/blog", None).await.json().await.unwrap();
    assert!(listed.is_empty());
}

// ============================================================================
// Blog
// ============================================================================

#[tokio::test]
async fn blog_round_trip() {
    // Arrange
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    // Act
    let created = app
        .post(
            "/api/blog",
            Some(&cookie),
            json!({
                "title": "Field notes",
                "content": "We visited Siaya this week.",
                "tags": ["field", "water"]
            }),
        )
        .await;

    // Assert
    assert_eq!(created.status().as_u16(), 201);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["published"], false);
    assert!(created["coverImage"].is_null());

    let path = format!("/api/blog/{}", created["id"].as_str().unwrap());
    let fetched: Value = app.get(&path, None).await.json().await.unwrap();
    assert_eq!(fetched["title"], "Field notes");
    assert_eq!(fetched["tags"], json!(["field", "water"]));

    let deleted = app.delete(&path, Some(&cookie)).await;
    assert_eq!(deleted.status().as_u16(), 200);
    assert_eq!(app.get(&path, None).await.status().as_u16(), 404);
}

#[tokio::test]
async fn blog_create_requires_title_and_content() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let response = app
        .post("/api/blog", Some(&cookie), json!({ "content": "No title" }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["message"].as_str().unwrap().contains("Title is required"));
}

#[tokio::test]
async fn blog_update_replaces_arrays_and_clears_cover_with_null() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;
    let created: Value = app
        .post(
            "/api/blog",
            Some(&cookie),
            json!({
                "title": "Draft",
                "content": "Body",
                "coverImage": "https://cdn.test/cover.jpg",
                "tags": ["a", "b"]
            }),
        )
        .await
        .json()
        .await
        .unwrap();
    let path = format!("/api/blog/{}", created["id"].as_str().unwrap());

    let response = app
        .put(
            &path,
            Some(&cookie),
            json!({ "tags": ["c"], "coverImage": null, "published": true }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["tags"], json!(["c"]));
    assert!(updated["coverImage"].is_null());
    assert_eq!(updated["published"], true);
    assert_eq!(updated["title"], "Draft");
}

#[tokio::test]
async fn blog_lists_newest_first() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;
    for title in ["first", "second", "third"] {
        app.post(
            "/api/blog",
            Some(&cookie),
            json!({ "title": title, "content": "x" }),
        )
        .await;
    }

    let posts: Vec<Value> = app.get("/api/blog", None).await.json().await.unwrap();

    let titles: Vec<&str> = posts.iter().map(|p| p["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn missing_and_malformed_ids_are_not_found() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let missing = app
        .get("/api/blog/00000000-0000-0000-0000-000000000000", None)
        .await;
    assert_eq!(missing.status().as_u16(), 404);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["message"], "Blog post not found");

    let malformed = app.delete("/api/projects/42", Some(&cookie)).await;
    assert_eq!(malformed.status().as_u16(), 404);
}

// ============================================================================
// Projects
// ============================================================================

#[tokio::test]
async fn project_round_trip() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let created = app.post("/api/projects", Some(&cookie), project_body()).await;
    assert_eq!(created.status().as_u16(), 201);
    let created: Value = created.json().await.unwrap();

    let path = format!("/api/projects/{}", created["id"].as_str().unwrap());
    let fetched: Value = app.get(&path, None).await.json().await.unwrap();
    assert_eq!(fetched["title"], "Clean Water Initiative");
    assert_eq!(fetched["startDate"], "2024-03-01");
    assert_eq!(fetched["endDate"], "2025-03-01");
    assert_eq!(fetched["collaborators"], json!(["County Water Office"]));

    let deleted: Value = app.delete(&path, Some(&cookie)).await.json().await.unwrap();
    assert_eq!(deleted["message"], "Project deleted successfully");
    assert_eq!(app.get(&path, None).await.status().as_u16(), 404);
}

#[tokio::test]
async fn ongoing_project_has_no_end_date() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;
    let mut body = project_body();
    body["isOngoing"] = json!(true);

    let created: Value = app
        .post("/api/projects", Some(&cookie), body)
        .await
        .json()
        .await
        .unwrap();
    assert!(created["endDate"].is_null());

    // Marking a finished project as ongoing clears its end date too.
    let finished: Value = app
        .post("/api/projects", Some(&cookie), project_body())
        .await
        .json()
        .await
        .unwrap();
    let updated: Value = app
        .put(
            &format!("/api/projects/{}", finished["id"].as_str().unwrap()),
            Some(&cookie),
            json!({ "isOngoing": true }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["isOngoing"], true);
    assert!(updated["endDate"].is_null());
}

#[tokio::test]
async fn project_end_date_before_start_is_rejected() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;
    let mut body = project_body();
    body["endDate"] = json!("2023-01-01");

    let response = app.post("/api/projects", Some(&cookie), body).await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_DATE_RANGE");
}

#[tokio::test]
async fn project_requires_start_date() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;
    let mut body = project_body();
    body.as_object_mut().unwrap().remove("startDate");

    let response = app.post("/api/projects", Some(&cookie), body).await;

    assert_eq!(response.status().as_u16(), 400);
}

// ============================================================================
// Trainings
// ============================================================================

#[tokio::test]
async fn training_defaults_and_mode() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let response = app
        .post(
            "/api/trainings",
            Some(&cookie),
            json!({
                "title": "First aid for volunteers",
                "shortDescription": "Two-day course",
                "fullDescription": "CPR, wound care and triage.",
                "facilitators": ["Red Cross"],
                "startDate": "2024-06-10"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["mode"], "In-Person");
    assert_eq!(created["certificateIssued"], false);
    assert_eq!(created["isOngoing"], false);
    assert!(created["targetAudience"].is_null());

    let path = format!("/api/trainings/{}", created["id"].as_str().unwrap());
    let updated: Value = app
        .put(
            &path,
            Some(&cookie),
            json!({ "mode": "Online", "targetAudience": "Youth leaders" }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(updated["mode"], "Online");
    assert_eq!(updated["targetAudience"], "Youth leaders");
    assert_eq!(updated["facilitators"], json!(["Red Cross"]));
}

#[tokio::test]
async fn training_rejects_unknown_mode() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let response = app
        .post(
            "/api/trainings",
            Some(&cookie),
            json!({
                "title": "Webinar",
                "shortDescription": "s",
                "fullDescription": "f",
                "mode": "Hybrid",
                "startDate": "2024-06-10"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn updates_reject_blank_required_text() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Admin).await;

    let post: Value = app
        .post(
            "/api/blog",
            Some(&cookie),
            json!({ "title": "Harvest report", "content": "Yields were up." }),
        )
        .await
        .json()
        .await
        .unwrap();
    let project: Value = app
        .post("/api/projects", Some(&cookie), project_body())
        .await
        .json()
        .await
        .unwrap();
    let training: Value = app
        .post(
            "/api/trainings",
            Some(&cookie),
            json!({
                "title": "Bookkeeping basics",
                "shortDescription": "Ledgers for cooperatives",
                "fullDescription": "Cash books, receipts and monthly reconciliation.",
                "startDate": "2024-09-02"
            }),
        )
        .await
        .json()
        .await
        .unwrap();

    let cases = [
        (format!("/api/blog/{}", post["id"].as_str().unwrap()), json!({ "content": "" })),
        (
            format!("/api/projects/{}", project["id"].as_str().unwrap()),
            json!({ "shortDescription": "   " }),
        ),
        (
            format!("/api/projects/{}", project["id"].as_str().unwrap()),
            json!({ "fullDescription": "" }),
        ),
        (
            format!("/api/trainings/{}", training["id"].as_str().unwrap()),
            json!({ "shortDescription": "" }),
        ),
        (
            format!("/api/trainings/{}", training["id"].as_str().unwrap()),
            json!({ "fullDescription": " " }),
        ),
    ];

    for (path, body) in cases {
        let response = app.put(&path, Some(&cookie), body.clone()).await;
        assert_eq!(response.status().as_u16(), 400, "PUT {path} {body}");
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["code"], "VALIDATION_ERROR");
    }

    let stored: Value = app
        .get(&format!("/api/projects/{}", project["id"].as_str().unwrap()), None)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stored["shortDescription"], "Boreholes for three villages");
}
