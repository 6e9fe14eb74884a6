#![allow(dead_code)]

use autosource::api::AppState;
use autosource::clients::mailer::LogMailer;
use autosource::config::Config;
use autosource::services::AuthService;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "owner@example.com";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub mailer: Arc<LogMailer>,
    pub dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let dir = std::env::temp_dir().join(format!("autosource-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();

    let mut config = Config::default();
    config.database.url = format!("sqlite://{}?mode=rwc", dir.join("test.db").display());
    config.storage.local_dir = dir.join("uploads").display().to_string();
    config.server.secure_cookies = false;
    config.rate_limit.contact.max_requests = 1000;
    config.rate_limit.login.max_requests = 1000;
    customize(&mut config);

    let mailer = Arc::new(LogMailer::new());
    let state = autosource::api::create_app_state_with_mailer(config, mailer.clone())
        .await
        .expect("Failed to create app state");
    let router = autosource::api::router(state.clone()).await;

    TestApp {
        router,
        state,
        mailer,
        dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Creates the user if needed and signs in through a one-time link.
    /// Returns the `Cookie` header value for the new session.
    pub async fn login_as(&self, email: &str, role: &str) -> String {
        let auth = self.state.auth_service();
        if !auth
            .list_users()
            .await
            .unwrap()
            .iter()
            .any(|u| u.email == email)
        {
            auth.add_user(email, role).await.unwrap();
        }

        let link = auth.create_login_link(email).await.unwrap().unwrap();
        let response = self.get(&callback_path(&link), None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("callback should set a session cookie")
    }

    pub async fn login_admin(&self) -> String {
        self.login_as(ADMIN_EMAIL, "admin").await
    }

    pub async fn create_vehicle(&self, cookie: &str, body: Value) -> Value {
        let response = self
            .json("POST", "/api/admin/vehicles", &body, Some(cookie))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["data"].clone()
    }
}

/// Strips the origin from an absolute login link.
pub fn callback_path(link: &str) -> String {
    let start = link.find("/auth/callback").expect("link should target the callback");
    link[start..].to_string()
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("id="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn vehicle_body(make: &str, model: &str, price: i64, status: &str) -> Value {
    serde_json::json!({
        "make": make,
        "model": model,
        "year": 2021,
        "mileage": 25000,
        "price": price,
        "fuel": "petrol",
        "transmission": "manual",
        "body_type": "Hatchback",
        "colour": "Grey",
        "description": "Full service history",
        "images": [],
        "status": status,
    })
}
