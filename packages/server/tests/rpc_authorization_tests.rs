// Authorization behavior of the RPC procedures, end to end through the
// router: session middleware, guards, handlers, envelope.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{assert_rpc_error, body_json, TestApp, ROOT_KEY};
use server_core::domains::users::UserRole;

#[tokio::test]
async fn hello_is_public_and_enveloped() {
    let app = TestApp::new();

    let response = app.get("/api/trpc/example.hello?name=Ada", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["data"]["greeting"], "Hello, Ada!");
    let timestamp = body["result"]["data"]["timestamp"].as_str().unwrap();
    chrono::DateTime::parse_from_rfc3339(timestamp).expect("RFC 3339 timestamp");

    let response = app.get("/api/trpc/example.hello", None).await;
    let body = body_json(response).await;
    assert_eq!(body["result"]["data"]["greeting"], "Hello, world!");
}

#[tokio::test]
async fn set_user_role_requires_the_root_key() {
    let app = TestApp::new();
    let (user_id, _) = app.login_as("user@example.org", UserRole::User);
    let payload = json!({ "userId": user_id.to_string(), "role": 1 });

    // No Authorization header at all.
    let response = app
        .post_json("/api/trpc/userAdmin.setUserRole", payload.clone(), None, None)
        .await;
    assert_rpc_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    // Wrong key.
    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            payload.clone(),
            None,
            Some("Bearer not-the-key"),
        )
        .await;
    assert_rpc_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    // An admin session is not a substitute for the root key.
    let (_, admin_cookie) = app.login_as("admin@example.org", UserRole::Admin);
    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            payload,
            Some(&admin_cookie),
            None,
        )
        .await;
    assert_rpc_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;
}

#[tokio::test]
async fn set_user_role_promotes_and_demotes() {
    let app = TestApp::new();
    let (user_id, _) = app.login_as("user@example.org", UserRole::User);

    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            json!({ "userId": user_id.to_string(), "role": 1 }),
            None,
            Some(&format!("Bearer {ROOT_KEY}")),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["result"]["data"];
    assert_eq!(data["success"], true);
    assert_eq!(data["message"], "User role updated to Admin");
    assert_eq!(data["user"]["role"], 1);
    assert_eq!(data["user"]["roleLabel"], "Admin");

    // The raw key without a Bearer prefix works too.
    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            json!({ "userId": user_id.to_string(), "role": 0 }),
            None,
            Some(ROOT_KEY),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"]["data"]["user"]["role"], 0);
}

#[tokio::test]
async fn set_user_role_rejects_bad_input_and_unknown_users() {
    let app = TestApp::new();
    let root = format!("Bearer {ROOT_KEY}");

    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            json!({ "userId": "not-a-uuid", "role": 1 }),
            None,
            Some(&root),
        )
        .await;
    let body = assert_rpc_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
    assert_eq!(body["error"]["message"], "Invalid user ID format");

    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            json!({ "userId": Uuid::new_v4().to_string(), "role": 7 }),
            None,
            Some(&root),
        )
        .await;
    assert_rpc_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;

    // Well-formed id with no row behind it: no write happens.
    let response = app
        .post_json(
            "/api/trpc/userAdmin.setUserRole",
            json!({ "userId": Uuid::new_v4().to_string(), "role": 1 }),
            None,
            Some(&root),
        )
        .await;
    let body = assert_rpc_error(response, StatusCode::NOT_FOUND, "NOT_FOUND").await;
    assert_eq!(body["error"]["message"], "User not found");
}

#[tokio::test]
async fn get_all_users_requires_an_admin_session() {
    let app = TestApp::new();

    let response = app.get("/api/trpc/userAdmin.getAllUsers", None).await;
    assert_rpc_error(response, StatusCode::UNAUTHORIZED, "UNAUTHORIZED").await;

    let (_, user_cookie) = app.login_as("user@example.org", UserRole::User);
    let response = app
        .get("/api/trpc/userAdmin.getAllUsers", Some(&user_cookie))
        .await;
    assert_rpc_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;

    // A valid session without any role record is also forbidden.
    let orphan = app.auth.add_user("orphan@example.org", "password-123", true);
    let session = app.auth.issue_session(orphan);
    let cookie = format!("sb-access-token={}", session.access_token);
    let response = app
        .get("/api/trpc/userAdmin.getAllUsers", Some(&cookie))
        .await;
    assert_rpc_error(response, StatusCode::FORBIDDEN, "FORBIDDEN").await;
}

#[tokio::test]
async fn get_all_users_lists_admins_first_with_pagination() {
    let app = TestApp::new();
    let (admin_id, admin_cookie) = app.login_as("admin@example.org", UserRole::Admin);
    for i in 0..3 {
        let id = app
            .auth
            .add_user(&format!("user{i}@example.org"), "password-123", true);
        app.store.insert(id, UserRole::User);
    }

    let response = app
        .get(
            "/api/trpc/userAdmin.getAllUsers?limit=2&offset=0",
            Some(&admin_cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let data = &body["result"]["data"];

    let users = data["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["id"], admin_id.to_string());
    assert_eq!(users[0]["roleLabel"], "Admin");

    assert_eq!(data["pagination"]["limit"], 2);
    assert_eq!(data["pagination"]["offset"], 0);
    assert_eq!(data["pagination"]["total"], 4);
}

#[tokio::test]
async fn get_all_users_validates_pagination_bounds() {
    let app = TestApp::new();
    let (_, admin_cookie) = app.login_as("admin@example.org", UserRole::Admin);

    for uri in [
        "/api/trpc/userAdmin.getAllUsers?limit=0",
        "/api/trpc/userAdmin.getAllUsers?limit=101",
        "/api/trpc/userAdmin.getAllUsers?offset=-1",
    ] {
        let response = app.get(uri, Some(&admin_cookie)).await;
        assert_rpc_error(response, StatusCode::BAD_REQUEST, "BAD_REQUEST").await;
    }
}

#[tokio::test]
async fn health_reports_healthy_with_a_reachable_store() {
    let app = TestApp::new();
    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}
