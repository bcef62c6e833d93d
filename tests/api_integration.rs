//! Full-router integration tests against a real Postgres instance.
//!
//! These run only when TEST_DATABASE_URL is set; without it each test
//! skips early so the suite stays green on machines with no database.
//! Every test registers its own throwaway users, so a shared database
//! can be reused across runs.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use diesel::prelude::*;
use http_body_util::BodyExt;
use recipe_api::models::NewSession;
use recipe_api::schema::sessions;
use recipe_api::{app, auth, db};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Option<Router> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    Some(app(Arc::new(db::create_pool(&url))))
}

macro_rules! require_db {
    () => {
        match test_app() {
            Some(app) => app,
            None => {
                eprintln!("TEST_DATABASE_URL not set, skipping");
                return;
            }
        }
    };
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

async fn register(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({"email": email, "password": password, "name": "Test User"})),
    )
    .await
}

async fn login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/users/token",
        None,
        Some(json!({"email": email, "password": password})),
    )
    .await
}

/// Registers a fresh user and returns a bearer token for it.
async fn make_user(app: &Router) -> String {
    let email = unique_email();
    let (status, _) = register(app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = login(app, &email, "password123").await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

async fn create_attr(app: &Router, token: &str, uri: &str, name: &str) -> Value {
    let (status, body) = send(app, "POST", uri, Some(token), Some(json!({"name": name}))).await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn protected_routes_reject_unauthenticated_requests() {
    let app = require_db!();

    for uri in [
        "/api/tags",
        "/api/ingredients",
        "/api/recipes",
        "/api/users/me",
        "/api/test/ping",
    ] {
        let (status, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {uri}");
    }

    // A bogus token is rejected the same way
    let (status, _) = send(&app, "GET", "/api/tags", Some("deadbeef"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/test/unauthed-ping", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn authenticated_ping_echoes_caller_identity() {
    let app = require_db!();

    let email = unique_email();
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = login(&app, &email, "password123").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/test/ping", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong");
    assert_eq!(body["email"], email);
}

#[tokio::test]
async fn expired_tokens_are_rejected() {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set, skipping");
        return;
    };
    let pool = Arc::new(db::create_pool(&url));
    let app = app(pool.clone());

    let email = unique_email();
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = login(&app, &email, "password123").await;
    let live_token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/users/me", Some(&live_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let user_id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();

    // Forge a session whose expiry has already passed
    let stale_token = auth::generate_token();
    let stale_hash = auth::hash_token(&stale_token);
    {
        let mut conn = pool.get().unwrap();
        diesel::insert_into(sessions::table)
            .values(&NewSession {
                user_id,
                token_hash: &stale_hash,
                expires_at: Utc::now() - Duration::days(1),
            })
            .execute(&mut conn)
            .unwrap();
    }

    let (status, body) = send(&app, "GET", "/api/tags", Some(&stale_token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("token").is_none());

    // The unexpired session keeps working
    let (status, _) = send(&app, "GET", "/api/tags", Some(&live_token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn registration_normalizes_email_and_hides_password() {
    let app = require_db!();

    let local = format!("User-{}", Uuid::new_v4());
    let mixed_case = format!("{local}@EXAMPLE.com");

    let (status, body) = register(&app, &mixed_case, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body["email"].as_str().unwrap(),
        mixed_case.to_lowercase(),
        "stored email should be the lowercased address"
    );
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    // Login with the original casing still works
    let (status, body) = login(&app, &mixed_case, "password123").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn registration_validates_input() {
    let app = require_db!();

    let (status, _) = register(&app, "", "password123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, "   ", "password123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = register(&app, &unique_email(), "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let email = unique_email();
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn failed_login_never_reveals_which_field_was_wrong() {
    let app = require_db!();

    let email = unique_email();
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);

    let (wrong_pw_status, wrong_pw_body) = login(&app, &email, "not-the-password").await;
    let (unknown_status, unknown_body) = login(&app, &unique_email(), "password123").await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["error"], "Invalid credentials");
    // Identical bodies: no account enumeration
    assert_eq!(wrong_pw_body, unknown_body);
    assert!(wrong_pw_body.get("token").is_none());
}

#[tokio::test]
async fn tags_are_scoped_to_owner_and_sorted_descending() {
    let app = require_db!();

    let token_a = make_user(&app).await;
    let token_b = make_user(&app).await;

    create_attr(&app, &token_a, "/api/tags", "fruity").await;
    create_attr(&app, &token_b, "/api/tags", "dessert").await;
    create_attr(&app, &token_b, "/api/tags", "vegan").await;
    create_attr(&app, &token_b, "/api/tags", "comfort food").await;

    let (status, body) = send(&app, "GET", "/api/tags", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["vegan", "dessert", "comfort food"]);

    // User A sees only their own row
    let (status, body) = send(&app, "GET", "/api/tags", Some(&token_a), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["fruity"]);
}

#[tokio::test]
async fn ingredients_are_scoped_to_owner() {
    let app = require_db!();

    let token_a = make_user(&app).await;
    let token_b = make_user(&app).await;

    create_attr(&app, &token_a, "/api/ingredients", "bacon").await;
    create_attr(&app, &token_b, "/api/ingredients", "nutmeg").await;

    let (status, body) = send(&app, "GET", "/api/ingredients", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "nutmeg");
}

#[tokio::test]
async fn empty_attr_name_is_rejected_and_nothing_persists() {
    let app = require_db!();
    let token = make_user(&app).await;

    for uri in ["/api/tags", "/api/ingredients"] {
        let (status, _) = send(&app, "POST", uri, Some(&token), Some(json!({"name": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) =
            send(&app, "POST", uri, Some(&token), Some(json!({"name": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn recipe_crud_round_trip() {
    let app = require_db!();
    let token = make_user(&app).await;

    let tag = create_attr(&app, &token, "/api/tags", "dinner").await;
    let ingredient = create_attr(&app, &token, "/api/ingredients", "salt").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token),
        Some(json!({
            "title": "shawarma",
            "time_minutes": 5,
            "price": "5.00",
            "tags": [tag["id"]],
            "ingredients": [ingredient["id"]],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/recipes", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "shawarma");
    assert_eq!(items[0]["time_minutes"], 5);
    assert_eq!(items[0]["price"], "5.00");
    assert_eq!(items[0]["tags"][0], tag["id"]);

    let uri = format!("/api/recipes/{recipe_id}");
    let (status, body) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tags"][0]["name"], "dinner");
    assert_eq!(body["ingredients"][0]["name"], "salt");

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&token),
        Some(json!({"title": "kebab", "ingredients": []})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "kebab");
    assert_eq!(body["time_minutes"], 5);
    assert!(body["ingredients"].as_array().unwrap().is_empty());
    assert_eq!(body["tags"][0]["name"], "dinner");

    let (status, _) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipes_are_invisible_across_users() {
    let app = require_db!();
    let token_a = make_user(&app).await;
    let token_b = make_user(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token_a),
        Some(json!({"title": "secret stew", "time_minutes": 30, "price": "9.99"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/recipes", Some(&token_b), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    // Another user's recipe id behaves like a missing one
    let uri = format!("/api/recipes/{recipe_id}");
    let (status, _) = send(&app, "GET", &uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, Some(&token_b), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recipe_rejects_invalid_payloads() {
    let app = require_db!();
    let token_a = make_user(&app).await;
    let token_b = make_user(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token_a),
        Some(json!({"title": "  ", "time_minutes": 5, "price": "5.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token_a),
        Some(json!({"title": "soup", "time_minutes": 5, "price": "cheap"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Referencing another user's tag fails validation
    let foreign_tag = create_attr(&app, &token_b, "/api/tags", "theirs").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token_a),
        Some(json!({
            "title": "soup",
            "time_minutes": 5,
            "price": "5.00",
            "tags": [foreign_tag["id"]],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_read_and_update() {
    let app = require_db!();

    let email = unique_email();
    let (status, _) = register(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::CREATED);
    let (_, body) = login(&app, &email, "password123").await;
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
    assert_eq!(body["name"], "Test User");

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/users/me",
        Some(&token),
        Some(json!({"name": "Renamed", "password": "newpassword"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Renamed");

    // Old password is gone, new one works
    let (status, _) = login(&app, &email, "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = login(&app, &email, "newpassword").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn image_upload_derives_safe_path() {
    let app = require_db!();
    let token = make_user(&app).await;

    let media_root = std::env::temp_dir().join(format!("recipe-api-test-{}", Uuid::new_v4()));
    std::env::set_var("MEDIA_ROOT", &media_root);

    let (status, body) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token),
        Some(json!({"title": "toast", "time_minutes": 2, "price": "1.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = body["id"].as_str().unwrap().to_string();

    let boundary = "recipeapiboundary";
    let payload = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"myimage.jpg\"\r\nContent-Type: image/jpeg\r\n\r\nnot-really-a-jpeg\r\n--{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/recipes/{recipe_id}/image"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(payload))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    let image_path = body["image_path"].as_str().unwrap();
    assert!(image_path.starts_with("uploads/recipe/"));
    assert!(image_path.ends_with(".jpg"));
    assert!(
        !image_path.contains("myimage"),
        "original filename must not leak into the stored path"
    );

    // The bytes landed where the path says
    assert!(media_root.join(image_path).is_file());

    // And the recipe row records the path
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/recipes/{recipe_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["image_path"].as_str().unwrap(), image_path);
}

#[tokio::test]
async fn image_upload_rejects_foreign_recipe() {
    let app = require_db!();
    let token_a = make_user(&app).await;
    let token_b = make_user(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/recipes",
        Some(&token_a),
        Some(json!({"title": "omelette", "time_minutes": 4, "price": "2.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let recipe_id = body["id"].as_str().unwrap().to_string();

    let boundary = "recipeapiboundary";
    let payload = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"sneaky.png\"\r\nContent-Type: image/png\r\n\r\nnot-really-a-png\r\n--{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/recipes/{recipe_id}/image"))
        .header(header::AUTHORIZATION, format!("Bearer {token_b}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(payload))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner's recipe is untouched
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/recipes/{recipe_id}"),
        Some(&token_a),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["image_path"].is_null());
}
