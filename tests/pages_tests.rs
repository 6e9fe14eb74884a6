mod common;

use autosource::models::lead::LeadSource;
use autosource::services::LeadService;
use axum::http::{StatusCode, header};
use common::{body_text, spawn_app, vehicle_body};
use serde_json::json;

#[tokio::test]
async fn test_home_page_renders_featured_and_testimonials() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let vehicle = app
        .create_vehicle(&cookie, vehicle_body("Mazda", "MX-5", 16_995, "available"))
        .await;
    app.json(
        "PUT",
        &format!("/api/admin/vehicles/{}/featured", vehicle["id"]),
        &json!({ "featured": true, "position": 1 }),
        Some(&cookie),
    )
    .await;
    app.json(
        "POST",
        "/api/admin/testimonials",
        &json!({ "name": "Ruth", "rating": 5, "content": "Found my dream roadster" }),
        Some(&cookie),
    )
    .await;

    let response = app.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let html = body_text(response).await;
    assert!(html.contains("MX-5"));
    assert!(html.contains("16,995"));
    assert!(html.contains("Found my dream roadster"));
}

#[tokio::test]
async fn test_stock_page_filters() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    app.create_vehicle(&cookie, vehicle_body("Honda", "Jazz", 8_495, "available"))
        .await;
    app.create_vehicle(&cookie, vehicle_body("Tesla", "Model 3", 24_000, "reserved"))
        .await;
    app.create_vehicle(&cookie, vehicle_body("Fiat", "500", 5_000, "draft"))
        .await;

    let response = app.get("/stock", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Jazz"));
    assert!(html.contains("Model 3"));
    assert!(html.contains("badge-reserved"));
    assert!(!html.contains("Fiat 500"));

    let response = app.get("/stock?make=Honda", None).await;
    let html = body_text(response).await;
    assert!(html.contains("Jazz"));
    assert!(!html.contains("Model 3"));

    let response = app.get("/stock?sort=backwards", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vehicle_detail_page() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let listed = app
        .create_vehicle(&cookie, vehicle_body("Volvo", "V60", 18_750, "available"))
        .await;
    let draft = app
        .create_vehicle(&cookie, vehicle_body("Volvo", "XC40", 22_000, "draft"))
        .await;

    let response = app.get(&format!("/stock/{}", listed["id"]), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("V60"));
    assert!(html.contains("18,750"));
    assert!(html.contains(r#"name="vehicle_id""#));

    let response = app.get(&format!("/stock/{}", draft["id"]), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("<html"));
}

#[tokio::test]
async fn test_vehicle_detail_with_bad_id_is_not_found() {
    let app = spawn_app().await;

    let response = app.get("/stock/abc", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("<html"));
}

#[tokio::test]
async fn test_contact_form_submission() {
    let app = spawn_app().await;

    let response = app.get("/contact?make_model=Golf%20GTI", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Golf GTI"));

    let response = app
        .form(
            "/contact",
            "name=Lee&contact=lee%40example.com&make_model=Golf+GTI&budget=20000&message=",
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Thank you"));

    let leads = app
        .state
        .lead_service()
        .list(Default::default())
        .await
        .unwrap();
    assert_eq!(leads.total, 1);
    assert_eq!(leads.items[0].source.as_str(), "contact_form");
    assert_eq!(leads.items[0].message, None);
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_contact_form_rerenders_on_error() {
    let app = spawn_app().await;

    let response = app
        .form("/contact", "name=Lee&contact=%3Cscript%3E", None)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains(r#"role="alert""#));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[tokio::test]
async fn test_legal_pages() {
    let app = spawn_app().await;

    for uri in ["/privacy", "/terms"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn test_admin_pages_redirect_to_login() {
    let app = spawn_app().await;

    for uri in ["/admin", "/admin/vehicles", "/admin/leads", "/admin/settings"] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(response.headers()[header::LOCATION], "/admin/login");
    }

    let response = app.get("/admin/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_pages_render_for_admin() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    for uri in [
        "/admin",
        "/admin/vehicles",
        "/admin/leads",
        "/admin/testimonials",
        "/admin/settings",
    ] {
        let response = app.get(uri, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        let html = body_text(response).await;
        assert!(html.contains("/static/admin.js"), "{uri}");
    }

    let response = app.form("/admin/logout", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app.get("/admin", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_admin_lists_are_paginated() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    for n in 0..13 {
        app.create_vehicle(
            &cookie,
            vehicle_body("Skoda", &format!("Unit{n:02}"), 9_000 + n, "available"),
        )
        .await;
        app.state
            .lead_service()
            .create(
                serde_json::from_value(json!({
                    "name": format!("Buyer{n:02}"),
                    "contact": "buyer@example.com"
                }))
                .unwrap(),
                LeadSource::Api,
            )
            .await
            .unwrap();
    }

    let response = app.get("/admin/vehicles", Some(&cookie)).await;
    let html = body_text(response).await;
    assert!(html.contains("Unit12"));
    assert!(!html.contains("Unit00"));
    assert!(html.contains("/admin/vehicles?page=2"));

    let response = app.get("/admin/vehicles?page=2", Some(&cookie)).await;
    let html = body_text(response).await;
    assert!(html.contains("Unit00"));
    assert!(html.contains("/admin/vehicles?page=1"));

    let response = app.get("/admin/leads", Some(&cookie)).await;
    let html = body_text(response).await;
    assert!(!html.contains("Buyer00"));
    assert!(html.contains("/admin/leads?page=2"));

    let response = app
        .get("/admin/leads?q=Buyer&page=2", Some(&cookie))
        .await;
    let html = body_text(response).await;
    assert!(html.contains("Buyer00"));
    assert!(html.contains("/admin/leads?q=Buyer&amp;page=1"));
}

#[tokio::test]
async fn test_login_form_reply_is_generic() {
    let app = spawn_app().await;

    let response = app
        .form("/admin/login", "email=nobody%40example.com", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Check your inbox"));
    assert!(app.mailer.sent().is_empty());

    let response = app.form("/admin/login", "email=nope", None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_static_assets_and_404() {
    let app = spawn_app().await;

    let response = app.get("/static/site.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );

    let response = app.get("/static/missing.css", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get("/no-such-page", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("<html"));
}
