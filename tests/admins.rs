//! Admin account management integration tests.

mod common;

use chedcom_console::{
    models::Role,
    store::{Repository, UserRepository},
};
use common::{TestApp, TEST_PASSWORD};
use serde_json::{json, Value};

// ============================================================================
// Access control
// ============================================================================

#[tokio::test]
async fn admin_api_requires_superadmin() {
    // Arrange
    let app = TestApp::spawn().await;
    let (_, admin_cookie) = app.signed_in(Role::Admin).await;
    let before = app.store.users.list().unwrap().len();

    // Act
    let anonymous = app.get("/api/admins", None).await;
    let as_admin = app
        .post(
            "/api/admins",
            Some(&admin_cookie),
            json!({ "name": "Intruder", "email": "x@chedcom.org", "password": "pw123456" }),
        )
        .await;

    // Assert
    assert_eq!(anonymous.status().as_u16(), 403);
    assert_eq!(as_admin.status().as_u16(), 403);
    let body: Value = as_admin.json().await.unwrap();
    assert_eq!(body["message"], "Forbidden: Superadmins only");
    assert_eq!(app.store.users.list().unwrap().len(), before);
}

#[tokio::test]
async fn forbidden_delete_has_no_side_effect() {
    let app = TestApp::spawn().await;
    let target = app.create_user(&TestApp::unique_email(), Role::Admin);
    let (_, admin_cookie) = app.signed_in(Role::Admin).await;

    let response = app
        .delete(&format!("/api/admins/{}", target.id), Some(&admin_cookie))
        .await;

    assert_eq!(response.status().as_u16(), 403);
    assert!(app.store.users.find(target.id).unwrap().is_some());
}

// ============================================================================
// CRUD
// ============================================================================

#[tokio::test]
async fn create_admin_hashes_password_and_defaults_role() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;

    let response = app
        .post(
            "/api/admins",
            Some(&cookie),
            json!({
                "name": "Field Officer",
                "email": "New.Officer@Chedcom.org",
                "password": "s3cret-pass",
                "canManageAdmins": true
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["email"], "new.officer@chedcom.org");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["canManageAdmins"], false);
    assert!(body.get("passwordHash").is_none());
    assert!(body.get("password").is_none());

    // The new account can log in.
    let login = app
        .login_response("new.officer@chedcom.org", "s3cret-pass")
        .await;
    assert_eq!(login.status().as_u16(), 200);
}

#[tokio::test]
async fn superadmin_role_always_can_manage_admins() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;

    let created: Value = app
        .post(
            "/api/admins",
            Some(&cookie),
            json!({
                "name": "Director",
                "email": TestApp::unique_email(),
                "password": "s3cret-pass",
                "role": "superadmin",
                "canManageAdmins": false
            }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(created["canManageAdmins"], true);

    let plain = app.create_user(&TestApp::unique_email(), Role::Admin);
    let promoted: Value = app
        .put(
            &format!("/api/admins/{}", plain.id),
            Some(&cookie),
            json!({ "role": "superadmin", "canManageAdmins": false }),
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(promoted["role"], "superadmin");
    assert_eq!(promoted["canManageAdmins"], true);
}

#[tokio::test]
async fn create_admin_requires_name_email_and_password() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;

    let response = app
        .post(
            "/api/admins",
            Some(&cookie),
            json!({ "name": "No Password", "email": TestApp::unique_email() }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::spawn().await;
    let (existing, cookie) = app.signed_in(Role::Superadmin).await;

    let response = app
        .post(
            "/api/admins",
            Some(&cookie),
            json!({
                "name": "Twin",
                "email": existing.email.to_uppercase(),
                "password": "s3cret-pass"
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn list_and_get_never_expose_password_hash() {
    let app = TestApp::spawn().await;
    let (me, cookie) = app.signed_in(Role::Superadmin).await;

    let list = app.get("/api/admins", Some(&cookie)).await;
    assert_eq!(list.status().as_u16(), 200);
    let text = list.text().await.unwrap();
    assert!(!text.contains("argon2"));
    assert!(!text.contains("passwordHash"));

    let one: Value = app
        .get(&format!("/api/admins/{}", me.id), Some(&cookie))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(one["email"], me.email.as_str());
    assert!(one.get("passwordHash").is_none());
}

#[tokio::test]
async fn update_rehashes_new_password() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;
    let target = app.create_user(&TestApp::unique_email(), Role::Admin);

    let response = app
        .put(
            &format!("/api/admins/{}", target.id),
            Some(&cookie),
            json!({ "password": "brand-new-pass" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);

    let stored = app.store.users.find_by_email(&target.email).unwrap().unwrap();
    assert_ne!(stored.password_hash, target.password_hash);
    assert!(!stored.password_hash.contains("brand-new-pass"));

    assert_eq!(
        app.login_response(&target.email, TEST_PASSWORD)
            .await
            .status()
            .as_u16(),
        401
    );
    assert_eq!(
        app.login_response(&target.email, "brand-new-pass")
            .await
            .status()
            .as_u16(),
        200
    );
}

#[tokio::test]
async fn delete_admin_then_get_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;
    let target = app.create_user(&TestApp::unique_email(), Role::Admin);
    let path = format!("/api/admins/{}", target.id);

    let deleted = app.delete(&path, Some(&cookie)).await;
    assert_eq!(deleted.status().as_u16(), 200);
    let body: Value = deleted.json().await.unwrap();
    assert_eq!(body["message"], "Admin deleted successfully");

    assert_eq!(app.get(&path, Some(&cookie)).await.status().as_u16(), 404);
    assert_eq!(app.delete(&path, Some(&cookie)).await.status().as_u16(), 404);
}

#[tokio::test]
async fn superadmin_cannot_delete_own_account() {
    let app = TestApp::spawn().await;
    let (me, cookie) = app.signed_in(Role::Superadmin).await;

    let response = app
        .delete(&format!("/api/admins/{}", me.id), Some(&cookie))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "SELF_DELETE");
    assert!(app.store.users.find(me.id).unwrap().is_some());
}

#[tokio::test]
async fn malformed_admin_id_is_not_found() {
    let app = TestApp::spawn().await;
    let (_, cookie) = app.signed_in(Role::Superadmin).await;

    let response = app.get("/api/admins/not-a-uuid", Some(&cookie)).await;

    assert_eq!(response.status().as_u16(), 404);
}
