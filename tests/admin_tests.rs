mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{body_json, spawn_app, spawn_app_with, vehicle_body};
use serde_json::json;

fn multipart(file_name: &str, content_type: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "autosource-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = spawn_app().await;

    for uri in [
        "/api/admin/vehicles",
        "/api/admin/leads",
        "/api/admin/testimonials",
        "/api/admin/users",
        "/api/admin/stats",
    ] {
        let response = app.get(uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
    }

    let response = app
        .json(
            "POST",
            "/api/admin/vehicles",
            &vehicle_body("Ford", "Ka", 3_000, "available"),
            Some("id=forged"),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_admin_role_is_rejected() {
    let app = spawn_app().await;
    let cookie = app.login_as("viewer@example.com", "viewer").await;

    let response = app.get("/api/admin/vehicles", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_vehicle_crud() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let vehicle = app
        .create_vehicle(&cookie, vehicle_body("Skoda", "Octavia", 12_500, "draft"))
        .await;
    let id = vehicle["id"].as_i64().unwrap();
    assert_eq!(vehicle["status"], "draft");
    assert_eq!(vehicle["featured"], false);

    let response = app
        .get(&format!("/api/admin/vehicles/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .json(
            "PUT",
            &format!("/api/admin/vehicles/{id}"),
            &vehicle_body("Skoda", "Octavia vRS", 13_250, "available"),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["model"], "Octavia vRS");
    assert_eq!(body["data"]["price"], 13_250);

    let response = app.get(&format!("/api/vehicles/{id}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .delete(&format!("/api/admin/vehicles/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get(&format!("/api/admin/vehicles/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vehicle_validation() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let mut body = vehicle_body("Ford", "Focus", 9_000, "available");
    body["year"] = json!(1901);
    let response = app
        .json("POST", "/api/admin/vehicles", &body, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut body = vehicle_body("Ford", "Focus", 9_000, "available");
    body["price"] = json!(-1);
    let response = app
        .json("POST", "/api/admin/vehicles", &body, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .json(
            "PUT",
            "/api/admin/vehicles/0",
            &vehicle_body("Ford", "Focus", 9_000, "available"),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .json(
            "PUT",
            "/api/admin/vehicles/4242",
            &vehicle_body("Ford", "Focus", 9_000, "available"),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lead_board_workflow() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .json(
            "POST",
            "/api/leads",
            &json!({ "name": "Jo", "contact": "jo@example.com", "make_model": "Honda Civic" }),
            None,
        )
        .await;
    let lead = body_json(response).await["data"].clone();
    let id = lead["id"].as_i64().unwrap();

    let response = app
        .json(
            "PATCH",
            &format!("/api/admin/leads/{id}"),
            &json!({ "status": "contacted", "notes": "Called back on Monday" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "contacted");
    assert_eq!(body["data"]["notes"], "Called back on Monday");

    let response = app
        .get("/api/admin/leads?status=contacted", Some(&cookie))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);

    let response = app.get("/api/admin/leads?status=new", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 0);

    let response = app.get("/api/admin/leads?q=Civic", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);

    let response = app
        .delete(&format!("/api/admin/leads/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get(&format!("/api/admin/leads/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lead_search_matches_wildcards_literally() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    for make_model in ["Kia Niro plug_in", "Kia Niro plugin", "Kia Niro 100% electric"] {
        let response = app
            .json(
                "POST",
                "/api/leads",
                &json!({ "name": "Jo", "contact": "jo@example.com", "make_model": make_model }),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.get("/api/admin/leads?q=plug_in", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["make_model"], "Kia Niro plug_in");

    let response = app.get("/api/admin/leads?q=100%25", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 1);

    let response = app.get("/api/admin/leads?q=Niro", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn test_testimonials_reorder() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let mut ids = Vec::new();
    for name in ["Ana", "Ben", "Cal"] {
        let response = app
            .json(
                "POST",
                "/api/admin/testimonials",
                &json!({ "name": name, "rating": 5, "content": "Great service" }),
                Some(&cookie),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        ids.push(body_json(response).await["data"]["id"].as_i64().unwrap());
    }

    let order = json!({ "ids": [ids[2], ids[0], ids[1]] });
    let response = app
        .json("PUT", "/api/admin/testimonials/order", &order, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/testimonials", None).await;
    let body = body_json(response).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Cal", "Ana", "Ben"]);

    let response = app
        .json(
            "PUT",
            "/api/admin/testimonials/order",
            &json!({ "ids": [ids[0], ids[0]] }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .json(
            "PUT",
            &format!("/api/admin/testimonials/{}", ids[1]),
            &json!({ "name": "Ben", "rating": 4, "content": "Good", "active": false }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/testimonials", None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app.get("/api/admin/testimonials", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_testimonial_sort_order_is_bounded() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .json(
            "POST",
            "/api/admin/testimonials",
            &json!({ "name": "Dee", "rating": 5, "content": "Superb", "sort_order": i32::MAX }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .json(
            "POST",
            "/api/admin/testimonials",
            &json!({ "name": "Dee", "rating": 5, "content": "Superb", "sort_order": 1_000_000 }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .json(
            "POST",
            "/api/admin/testimonials",
            &json!({ "name": "Eve", "rating": 4, "content": "Very helpful" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["sort_order"], 1_000_001);
}

#[tokio::test]
async fn test_settings_update() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/api/admin/settings", Some(&cookie)).await;
    let mut settings = body_json(response).await["data"].clone();
    settings["hero"]["headline"] = json!("Cars found for you");
    settings["seo"]["keywords"] = json!(["used cars", "car sourcing"]);

    let response = app
        .json("PUT", "/api/admin/settings", &settings, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/api/settings", None).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["hero"]["headline"], "Cars found for you");
    assert_eq!(body["data"]["seo"]["keywords"][1], "car sourcing");

    settings["hero"]["headline"] = json!("");
    let response = app
        .json("PUT", "/api/admin/settings", &settings, Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_user_management() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .json(
            "POST",
            "/api/admin/users",
            &json!({ "email": "Second@Example.com" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "second@example.com");
    assert_eq!(body["data"]["role"], "admin");
    let second = body["data"]["id"].as_i64().unwrap();

    let response = app
        .json(
            "POST",
            "/api/admin/users",
            &json!({ "email": "second@example.com" }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.get("/api/admin/users", Some(&cookie)).await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app.get("/api/auth/me", Some(&cookie)).await;
    let me = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = app
        .delete(&format!("/api/admin/users/{me}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .delete(&format!("/api/admin/users/{second}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stats() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    app.create_vehicle(&cookie, vehicle_body("Ford", "Focus", 9_000, "available"))
        .await;
    app.create_vehicle(&cookie, vehicle_body("Ford", "Kuga", 19_000, "sold"))
        .await;
    app.json(
        "POST",
        "/api/leads",
        &json!({ "name": "Jo", "contact": "jo@example.com" }),
        None,
    )
    .await;

    let response = app.get("/api/admin/stats", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["leads_last_7_days"], 1);

    let vehicles = body["data"]["vehicles"].as_array().unwrap();
    let sold = vehicles.iter().find(|c| c["status"] == "sold").unwrap();
    assert_eq!(sold["count"], 1);
}

#[tokio::test]
async fn test_local_upload() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let (content_type, body) = multipart("car.jpg", "image/jpeg", b"\xff\xd8\xff\xe0fake-jpeg");
    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/admin/uploads")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".jpg"));

    let response = app.get(&url, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejects_wrong_type_and_size() {
    let app = spawn_app_with(|config| {
        config.storage.max_upload_bytes = 32;
    })
    .await;
    let cookie = app.login_admin().await;

    let (content_type, body) = multipart("notes.txt", "text/plain", b"hello");
    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/admin/uploads")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (content_type, body) = multipart("big.png", "image/png", &[0u8; 64]);
    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/admin/uploads")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::COOKIE, &cookie)
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_signature_requires_cdn_backend() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app
        .json(
            "POST",
            "/api/admin/uploads/signature",
            &json!({}),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_disabled_is_not_found() {
    let app = spawn_app().await;
    let cookie = app.login_admin().await;

    let response = app.get("/api/admin/metrics", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
