//! Server-rendered HTML pages.
//!
//! Markup is assembled with `format!`; every interpolated value goes through
//! [`text`] or [`attr`] first.

use axum::{
    Router, middleware,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::api::{ApiError, AppState};
use crate::models::page::Page;
use crate::models::settings::{ContactSettings, SeoSettings};

mod admin;
mod public;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let contact_submit = Router::new()
        .route("/contact", post(public::contact_submit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            public::contact_page_limit,
        ));

    let login_submit = Router::new()
        .route("/admin/login", post(admin::login_submit))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            public::login_page_limit,
        ));

    let guarded = Router::new()
        .route("/admin", get(admin::dashboard))
        .route("/admin/vehicles", get(admin::vehicles))
        .route("/admin/leads", get(admin::leads))
        .route("/admin/testimonials", get(admin::testimonials))
        .route("/admin/settings", get(admin::settings))
        .route("/admin/logout", post(admin::logout))
        .route_layer(middleware::from_fn_with_state(state, admin::page_guard));

    Router::new()
        .route("/", get(public::home))
        .route("/stock", get(public::stock))
        .route("/stock/{id}", get(public::vehicle_detail))
        .route("/contact", get(public::contact_form))
        .route("/privacy", get(public::privacy))
        .route("/terms", get(public::terms))
        .route("/admin/login", get(admin::login_form))
        .route("/auth/callback", get(admin::callback))
        .merge(contact_submit)
        .merge(login_submit)
        .merge(guarded)
}

// ============================================================================
// Escaping and formatting
// ============================================================================

#[must_use]
pub fn text(value: &str) -> Cow<'_, str> {
    html_escape::encode_text(value)
}

#[must_use]
pub fn attr(value: &str) -> Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(value)
}

/// Groups digits in threes: `12995` -> `12,995`.
#[must_use]
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[must_use]
pub fn money(symbol: &str, amount: i64) -> String {
    format!("{symbol}{}", group_digits(amount))
}

#[must_use]
pub fn mileage(miles: i32) -> String {
    format!("{} miles", group_digits(i64::from(miles)))
}

/// `base?<query>` with `page` replaced and empty values dropped.
#[must_use]
pub fn page_href(base: &str, raw_query: Option<&str>, page: u64) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(raw) = raw_query {
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            if key != "page" && !value.is_empty() {
                serializer.append_pair(&key, &value);
            }
        }
    }
    serializer.append_pair("page", &page.to_string());
    format!("{base}?{}", serializer.finish())
}

/// Previous/next links that keep the current filters.
#[must_use]
pub fn pagination<T>(base: &str, page: &Page<T>, raw_query: Option<&str>) -> String {
    if page.total_pages <= 1 {
        return String::new();
    }

    let mut out = String::from(r#"<nav class="pagination">"#);
    if page.has_previous() {
        let _ = write!(
            out,
            r#"<a rel="prev" href="{}">Previous</a>"#,
            attr(&page_href(base, raw_query, page.page - 1))
        );
    }
    let _ = write!(out, "<span>Page {} of {}</span>", page.page, page.total_pages);
    if page.has_next() {
        let _ = write!(
            out,
            r#"<a rel="next" href="{}">Next</a>"#,
            attr(&page_href(base, raw_query, page.page + 1))
        );
    }
    out.push_str("</nav>");
    out
}

// ============================================================================
// Layout
// ============================================================================

/// Site-wide copy shared by every public page.
pub struct Chrome {
    pub site_name: String,
    pub currency_symbol: String,
    pub seo: SeoSettings,
    pub contact: ContactSettings,
}

impl Chrome {
    pub async fn load(state: &AppState) -> Result<Self, PageError> {
        let settings = state.settings_service().get().await?;
        let config = state.config().read().await;
        Ok(Self {
            site_name: config.site.name.clone(),
            currency_symbol: config.site.currency_symbol.clone(),
            seo: settings.seo,
            contact: settings.contact,
        })
    }

    #[must_use]
    pub fn price(&self, amount: i64) -> String {
        money(&self.currency_symbol, amount)
    }

    /// Wraps `body` in the public layout.
    #[must_use]
    pub fn page(&self, title: Option<&str>, body: &str) -> String {
        let full_title = title.map_or_else(
            || self.seo.title.clone(),
            |t| format!("{t} | {}", self.site_name),
        );

        let mut footer = String::new();
        if !self.contact.phone.is_empty() {
            let _ = write!(footer, "<span>{}</span>", text(&self.contact.phone));
        }
        if !self.contact.email.is_empty() {
            let _ = write!(
                footer,
                r#"<a href="mailto:{}">{}</a>"#,
                attr(&self.contact.email),
                text(&self.contact.email)
            );
        }
        if !self.contact.address.is_empty() {
            let _ = write!(footer, "<span>{}</span>", text(&self.contact.address));
        }
        if let Some(hours) = &self.contact.opening_hours {
            let _ = write!(footer, "<span>{}</span>", text(hours));
        }

        format!(
            r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<meta name="description" content="{description}">
<meta name="keywords" content="{keywords}">
<link rel="stylesheet" href="/static/site.css">
</head>
<body>
<header class="site-header">
<a class="brand" href="/">{site}</a>
<nav><a href="/stock">Stock</a><a href="/contact">Contact</a></nav>
</header>
<main>
{body}
</main>
<footer class="site-footer">
<div class="contact">{footer}</div>
<nav><a href="/privacy">Privacy</a><a href="/terms">Terms</a></nav>
</footer>
</body>
</html>"#,
            title = text(&full_title),
            description = attr(&self.seo.description),
            keywords = attr(&self.seo.keywords.join(", ")),
            site = text(&self.site_name),
        )
    }
}

/// Minimal layout for pages rendered without site settings.
#[must_use]
pub fn bare_page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/site.css">
</head>
<body>
<main class="narrow">
{body}
</main>
</body>
</html>"#,
        title = text(title),
    )
}

/// Renders `message` with a link back home.
#[must_use]
pub fn message_page(title: &str, message: &str) -> String {
    bare_page(
        title,
        &format!(
            r#"<h1>{}</h1><p>{}</p><p><a href="/">Back to the home page</a></p>"#,
            text(title),
            text(message)
        ),
    )
}

// ============================================================================
// Errors
// ============================================================================

/// An error rendered as an HTML page instead of the JSON envelope.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl<E> From<E> for PageError
where
    E: Into<ApiError>,
{
    fn from(err: E) -> Self {
        let err: ApiError = err.into();
        let status = err.status();
        let message = match &err {
            ApiError::NotFound(_) => "We could not find that page.".to_string(),
            ApiError::ValidationError(msg) => msg.clone(),
            _ => {
                tracing::error!(error = %err, "Page request failed");
                "Something went wrong on our side. Please try again shortly.".to_string()
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let title = match self.status {
            StatusCode::NOT_FOUND => "Page not found",
            StatusCode::BAD_REQUEST => "Bad request",
            StatusCode::UNAUTHORIZED => "Sign-in required",
            StatusCode::TOO_MANY_REQUESTS => "Too many requests",
            _ => "Something went wrong",
        };
        (self.status, Html(message_page(title, &self.message))).into_response()
    }
}

/// Fallback for unknown paths.
pub async fn not_found(State(state): State<Arc<AppState>>) -> Response {
    let body = r#"<section class="notice"><h1>Page not found</h1><p>The page you asked for does not exist.</p><p><a href="/stock">Browse our stock</a></p></section>"#;
    match Chrome::load(&state).await {
        Ok(chrome) => (
            StatusCode::NOT_FOUND,
            Html(chrome.page(Some("Page not found"), body)),
        )
            .into_response(),
        Err(_) => PageError::new(StatusCode::NOT_FOUND, "The page you asked for does not exist.")
            .into_response(),
    }
}
