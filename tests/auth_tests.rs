mod common;

use autosource::entities::{login_tokens, prelude::LoginTokens};
use autosource::services::AuthService;
use axum::http::{StatusCode, header};
use common::{
    ADMIN_EMAIL, body_json, callback_path, session_cookie, spawn_app, spawn_app_with,
};
use sea_orm::{EntityTrait, sea_query::Expr};
use serde_json::json;

fn link_from_email(html: &str) -> String {
    let start = html.find("/auth/callback?token=").expect("e-mail should carry a link");
    let rest = &html[start..];
    let end = rest.find('"').unwrap_or(rest.len());
    rest[..end].to_string()
}

#[tokio::test]
async fn test_login_link_reply_is_generic() {
    let app = spawn_app().await;
    app.state
        .auth_service()
        .add_user(ADMIN_EMAIL, "admin")
        .await
        .unwrap();

    let known = app
        .json(
            "POST",
            "/api/auth/login-link",
            &json!({ "email": ADMIN_EMAIL }),
            None,
        )
        .await;
    assert_eq!(known.status(), StatusCode::OK);
    let known = body_json(known).await;

    let unknown = app
        .json(
            "POST",
            "/api/auth/login-link",
            &json!({ "email": "stranger@example.com" }),
            None,
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown = body_json(unknown).await;

    assert_eq!(known, unknown);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, ADMIN_EMAIL);
}

#[tokio::test]
async fn test_login_link_rejects_malformed_email() {
    let app = spawn_app().await;

    let response = app
        .json(
            "POST",
            "/api/auth/login-link",
            &json!({ "email": "not-an-email" }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_emailed_link_signs_in_once() {
    let app = spawn_app().await;
    app.state
        .auth_service()
        .add_user(ADMIN_EMAIL, "admin")
        .await
        .unwrap();

    app.json(
        "POST",
        "/api/auth/login-link",
        &json!({ "email": ADMIN_EMAIL }),
        None,
    )
    .await;
    let path = link_from_email(&app.mailer.sent()[0].html);

    let response = app.get(&path, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    let cookie = session_cookie(&response).unwrap();

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], ADMIN_EMAIL);
    assert!(body["data"]["last_login_at"].is_string());

    let response = app.get(&path, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_link_is_rejected() {
    let app = spawn_app().await;
    let auth = app.state.auth_service();
    auth.add_user(ADMIN_EMAIL, "admin").await.unwrap();

    let link = auth.create_login_link(ADMIN_EMAIL).await.unwrap().unwrap();

    LoginTokens::update_many()
        .col_expr(
            login_tokens::Column::ExpiresAt,
            Expr::value("2000-01-01T00:00:00.000Z"),
        )
        .exec(&app.state.store().conn)
        .await
        .unwrap();

    let response = app.get(&callback_path(&link), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_callback_without_token() {
    let app = spawn_app().await;

    let response = app.get("/auth/callback", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/auth/callback?token=deadbeef", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .json("POST", "/api/auth/logout", &json!({}), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get("/api/admin/vehicles", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_removed_user_loses_access() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    app.state
        .store()
        .users()
        .delete_by_email(ADMIN_EMAIL)
        .await
        .unwrap();

    let response = app.get("/api/admin/vehicles", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rate_limit() {
    let app = spawn_app_with(|config| {
        config.rate_limit.login.max_requests = 1;
    })
    .await;

    let body = json!({ "email": "someone@example.com" });
    let response = app.json("POST", "/api/auth/login-link", &body, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.json("POST", "/api/auth/login-link", &body, None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app.form("/admin/login", "email=someone%40example.com", None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}
