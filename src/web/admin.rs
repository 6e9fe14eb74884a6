use axum::{
    Extension, Form,
    extract::{Query, RawQuery, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tower_sessions::Session;

use super::{PageError, attr, bare_page, group_digits, money, pagination, text};
use crate::api::AppState;
use crate::api::auth::{current_admin, establish_session};
use crate::db::User;
use crate::models::lead::{LeadQuery, LeadStatus};
use crate::models::vehicle::{FuelType, Transmission, VehicleQuery, VehicleStatus};
use crate::services::AuthError;

const LOGIN_PATH: &str = "/admin/login";

// ============================================================================
// Guard
// ============================================================================

/// Redirects anyone who is not a signed-in admin to the login page.
pub async fn page_guard(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    match current_admin(&state, &session).await {
        Ok(user) => {
            tracing::Span::current().record("user_id", user.id);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e @ (AuthError::Database(_) | AuthError::Internal(_))) => {
            PageError::from(e).into_response()
        }
        Err(_) => Redirect::to(LOGIN_PATH).into_response(),
    }
}

// ============================================================================
// Layout
// ============================================================================

fn admin_page(user: &User, title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="robots" content="noindex">
<title>{title} | Admin</title>
<link rel="stylesheet" href="/static/site.css">
<script src="/static/admin.js" defer></script>
</head>
<body class="admin">
<header class="site-header">
<a class="brand" href="/admin">Admin</a>
<nav>
<a href="/admin/vehicles">Vehicles</a>
<a href="/admin/leads">Leads</a>
<a href="/admin/testimonials">Testimonials</a>
<a href="/admin/settings">Settings</a>
<a href="/" target="_blank">View site</a>
</nav>
<form method="post" action="/admin/logout" class="logout"><span>{email}</span><button type="submit">Sign out</button></form>
</header>
<main>
<p class="flash" data-flash hidden></p>
{body}
</main>
</body>
</html>"#,
        title = text(title),
        email = text(&user.email),
    )
}

fn option_list<T: Copy + PartialEq>(
    values: &[T],
    selected: Option<T>,
    value: impl Fn(T) -> &'static str,
) -> String {
    values
        .iter()
        .map(|&v| {
            format!(
                r#"<option value="{0}"{1}>{0}</option>"#,
                value(v),
                if selected == Some(v) { " selected" } else { "" }
            )
        })
        .collect()
}

// ============================================================================
// Login
// ============================================================================

fn login_page(email: &str, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, text(e)))
        .unwrap_or_default();
    bare_page(
        "Admin sign-in",
        &format!(
            r#"<h1>Admin sign-in</h1>
<p>Enter your e-mail address and we will send you a one-time sign-in link.</p>
{error}
<form method="post" action="/admin/login">
<label>E-mail<input type="email" name="email" required value="{}"></label>
<button type="submit">Send link</button>
</form>"#,
            attr(email)
        ),
    )
}

/// GET /admin/login
pub async fn login_form() -> Html<String> {
    Html(login_page("", None))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
}

/// POST /admin/login
/// The confirmation reads the same whether or not the address has an account.
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    match state.auth_service().request_link(&form.email).await {
        Ok(()) => Ok(Html(bare_page(
            "Check your inbox",
            r#"<h1>Check your inbox</h1><p>If that address belongs to an admin, a sign-in link is on its way. The link can be used once and expires shortly.</p>"#,
        ))
        .into_response()),
        Err(AuthError::Validation(message)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(login_page(&form.email, Some(&message))),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub token: Option<String>,
}

/// GET /auth/callback?token=
pub async fn callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, PageError> {
    let token = query.token.unwrap_or_default();

    match state.auth_service().consume_link(&token).await {
        Ok(user) => {
            establish_session(&session, &user).await?;
            tracing::info!(event = "admin_signed_in", user_id = user.id, "Admin signed in");
            Ok(Redirect::to("/admin").into_response())
        }
        Err(AuthError::InvalidLink) => Ok((
            StatusCode::UNAUTHORIZED,
            Html(login_page(
                "",
                Some("That sign-in link is invalid or has expired. Request a new one below."),
            )),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// POST /admin/logout
pub async fn logout(session: Session) -> Result<Redirect, PageError> {
    session
        .flush()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to clear session: {e}"))?;
    Ok(Redirect::to(LOGIN_PATH))
}

// ============================================================================
// Pages
// ============================================================================

/// GET /admin
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, PageError> {
    let vehicles = state.vehicle_service().count_by_status().await?;
    let leads = state.lead_service().count_by_status().await?;
    let recent = state.lead_service().count_recent(7).await?;
    let latest = state.lead_service().list(LeadQuery::default()).await?;

    let tiles = |counts: &[(String, u64)]| -> String {
        counts
            .iter()
            .map(|(label, count)| {
                format!(
                    r#"<div class="tile"><span class="count">{}</span><span>{}</span></div>"#,
                    group_digits(i64::try_from(*count).unwrap_or(i64::MAX)),
                    text(label)
                )
            })
            .collect()
    };

    let vehicle_counts: Vec<(String, u64)> = vehicles
        .into_iter()
        .map(|(s, c)| (s.as_str().to_string(), c))
        .collect();
    let lead_counts: Vec<(String, u64)> = leads
        .into_iter()
        .map(|(s, c)| (s.as_str().to_string(), c))
        .collect();

    let mut rows = String::new();
    for lead in latest.items.iter().take(10) {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            text(&lead.created_at),
            text(&lead.name),
            text(&lead.contact),
            text(lead.make_model.as_deref().unwrap_or("")),
            lead.status.as_str()
        );
    }

    let body = format!(
        r#"<h1>Dashboard</h1>
<section><h2>Vehicles</h2><div class="tiles">{vehicles}</div></section>
<section><h2>Leads</h2><div class="tiles">{leads}<div class="tile"><span class="count">{recent}</span><span>last 7 days</span></div></div></section>
<section><h2>Latest leads</h2>
<table><thead><tr><th>Received</th><th>Name</th><th>Contact</th><th>Looking for</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>
<p><a href="/admin/leads">All leads</a></p></section>"#,
        vehicles = tiles(&vehicle_counts),
        leads = tiles(&lead_counts),
    );

    Ok(Html(admin_page(&user, "Dashboard", &body)))
}

/// GET /admin/vehicles
pub async fn vehicles(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<VehicleQuery>,
) -> Result<Html<String>, PageError> {
    let symbol = state.config().read().await.site.currency_symbol.clone();
    let page = state.vehicle_service().list_admin(query).await?;

    let mut rows = String::new();
    for v in &page.items {
        let _ = write!(
            rows,
            r#"<tr>
<td>{id}</td><td>{title}</td><td>{price}</td><td>{status}</td><td>{featured}</td>
<td class="actions">
<button type="button" data-api="/api/admin/vehicles/{id}/featured" data-method="PUT" data-body='{{"featured":{toggle}}}'>{toggle_label}</button>
<button type="button" data-edit="/api/admin/vehicles/{id}" data-form="vehicle-form">Edit</button>
<button type="button" class="danger" data-api="/api/admin/vehicles/{id}" data-method="DELETE" data-confirm="Delete this vehicle?">Delete</button>
</td>
</tr>"#,
            id = v.id,
            title = text(&v.title()),
            price = text(&money(&symbol, v.price)),
            status = v.status.as_str(),
            featured = if v.featured {
                v.featured_position
                    .map_or_else(|| "yes".to_string(), |p| format!("yes (#{p})"))
            } else {
                "no".to_string()
            },
            toggle = !v.featured,
            toggle_label = if v.featured { "Unfeature" } else { "Feature" },
        );
    }

    let fuel = option_list(&FuelType::ALL, None, |f| f.as_str());
    let transmission = option_list(&Transmission::ALL, None, |t| t.as_str());
    let status = option_list(&VehicleStatus::ALL, Some(VehicleStatus::Draft), |s| s.as_str());

    let body = format!(
        r#"<h1>Vehicles</h1>
<p>{total} vehicles</p>
<table><thead><tr><th>ID</th><th>Vehicle</th><th>Price</th><th>Status</th><th>Featured</th><th></th></tr></thead><tbody>{rows}</tbody></table>
{pages}
<section>
<h2>Add or edit a vehicle</h2>
<form id="vehicle-form" data-api="/api/admin/vehicles" data-method="POST">
<label>Make<input name="make" required maxlength="60"></label>
<label>Model<input name="model" required maxlength="80"></label>
<label>Year<input name="year" type="number" data-type="number" required></label>
<label>Mileage<input name="mileage" type="number" data-type="number" required min="0"></label>
<label>Price<input name="price" type="number" data-type="number" required min="0"></label>
<label>Fuel<select name="fuel">{fuel}</select></label>
<label>Gearbox<select name="transmission">{transmission}</select></label>
<label>Body type<input name="body_type" data-type="optional" maxlength="40"></label>
<label>Colour<input name="colour" data-type="optional" maxlength="40"></label>
<label>Status<select name="status">{status}</select></label>
<label>Featured<input name="featured" type="checkbox" data-type="bool"></label>
<label>Featured position<input name="featured_position" type="number" data-type="optional-number" min="0" max="100"></label>
<label>Description<textarea name="description" data-type="optional" rows="6" maxlength="5000"></textarea></label>
<label>Images (one URL per line)<textarea name="images" data-type="lines" rows="4"></textarea></label>
<label>Upload image<input type="file" accept="image/*" data-upload="images"></label>
<button type="submit">Save vehicle</button>
<button type="reset">Clear</button>
</form>
</section>"#,
        total = page.total,
        pages = pagination("/admin/vehicles", &page, raw_query.as_deref()),
    );

    Ok(Html(admin_page(&user, "Vehicles", &body)))
}

/// GET /admin/leads
pub async fn leads(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    RawQuery(raw_query): RawQuery,
    Query(query): Query<LeadQuery>,
) -> Result<Html<String>, PageError> {
    let selected = query.status;
    let search = query.q.clone().unwrap_or_default();
    let page = state.lead_service().list(query).await?;

    let mut rows = String::new();
    for lead in &page.items {
        let _ = write!(
            rows,
            r#"<tr>
<td>{created}</td><td>{name}</td><td>{contact}</td><td>{make_model}</td><td>{budget}</td><td>{message}</td><td>{source}</td>
<td><form data-api="/api/admin/leads/{id}" data-method="PATCH" class="inline">
<select name="status">{statuses}</select>
<input name="notes" data-type="optional" value="{notes}" placeholder="Notes">
<button type="submit">Save</button>
</form></td>
<td><button type="button" class="danger" data-api="/api/admin/leads/{id}" data-method="DELETE" data-confirm="Delete this lead?">Delete</button></td>
</tr>"#,
            id = lead.id,
            created = text(&lead.created_at),
            name = text(&lead.name),
            contact = text(&lead.contact),
            make_model = text(lead.make_model.as_deref().unwrap_or("")),
            budget = text(lead.budget.as_deref().unwrap_or("")),
            message = text(lead.message.as_deref().unwrap_or("")),
            source = lead.source.as_str(),
            statuses = option_list(&LeadStatus::ALL, Some(lead.status), |s| s.as_str()),
            notes = attr(lead.notes.as_deref().unwrap_or("")),
        );
    }

    let filter = option_list(&LeadStatus::ALL, selected, |s| s.as_str());
    let body = format!(
        r#"<h1>Leads</h1>
<form method="get" action="/admin/leads" class="filters">
<label>Status<select name="status"><option value="">All</option>{filter}</select></label>
<label>Search<input type="search" name="q" value="{search}"></label>
<button type="submit">Filter</button>
</form>
<p>{total} leads</p>
<table><thead><tr><th>Received</th><th>Name</th><th>Contact</th><th>Looking for</th><th>Budget</th><th>Message</th><th>Source</th><th>Status</th><th></th></tr></thead><tbody>{rows}</tbody></table>
{pages}"#,
        search = attr(&search),
        total = page.total,
        pages = pagination("/admin/leads", &page, raw_query.as_deref()),
    );

    Ok(Html(admin_page(&user, "Leads", &body)))
}

/// GET /admin/testimonials
pub async fn testimonials(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, PageError> {
    let all = state.testimonial_service().list_all().await?;

    let mut rows = String::new();
    for t in &all {
        let _ = write!(
            rows,
            r#"<tr><td>{id}</td><td>{name}</td><td>{rating}/5</td><td>{content}</td><td>{featured}</td><td>{active}</td>
<td><button type="button" class="danger" data-api="/api/admin/testimonials/{id}" data-method="DELETE" data-confirm="Delete this testimonial?">Delete</button></td></tr>"#,
            id = t.id,
            name = text(&t.name),
            rating = t.rating,
            content = text(&t.content),
            featured = if t.featured { "yes" } else { "no" },
            active = if t.active { "yes" } else { "no" },
        );
    }

    let order = all
        .iter()
        .map(|t| t.id.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let body = format!(
        r#"<h1>Testimonials</h1>
<table><thead><tr><th>ID</th><th>Name</th><th>Rating</th><th>Content</th><th>Featured</th><th>Active</th><th></th></tr></thead><tbody>{rows}</tbody></table>
<section>
<h2>Display order</h2>
<form data-api="/api/admin/testimonials/order" data-method="PUT">
<label>IDs in display order<input name="ids" data-type="id-list" value="{order}"></label>
<button type="submit">Save order</button>
</form>
</section>
<section>
<h2>Add a testimonial</h2>
<form data-api="/api/admin/testimonials" data-method="POST">
<label>Name<input name="name" required maxlength="100"></label>
<label>Role<input name="role" data-type="optional" maxlength="100"></label>
<label>Rating<input name="rating" type="number" data-type="number" min="1" max="5" value="5"></label>
<label>Content<textarea name="content" required maxlength="1000" rows="4"></textarea></label>
<label>Featured<input name="featured" type="checkbox" data-type="bool"></label>
<label>Active<input name="active" type="checkbox" data-type="bool" checked></label>
<button type="submit">Add testimonial</button>
</form>
</section>"#,
        order = attr(&order),
    );

    Ok(Html(admin_page(&user, "Testimonials", &body)))
}

/// GET /admin/settings
pub async fn settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Html<String>, PageError> {
    let s = state.settings_service().get().await?;

    let input = |name: &str, label: &str, value: &str, extra: &str| {
        format!(
            r#"<label>{label}<input name="{name}" value="{}"{extra}></label>"#,
            attr(value)
        )
    };

    let body = format!(
        r#"<h1>Site settings</h1>
<form data-api="/api/admin/settings" data-method="PUT">
<fieldset><legend>Hero</legend>
{headline}{subheadline}{cta}
</fieldset>
<fieldset><legend>SEO</legend>
{seo_title}{seo_description}{keywords}
</fieldset>
<fieldset><legend>Contact</legend>
{email}{phone}{address}{whatsapp}{hours}
</fieldset>
<button type="submit">Save settings</button>
</form>"#,
        headline = input("hero.headline", "Headline", &s.hero.headline, " required maxlength=\"120\""),
        subheadline = input("hero.subheadline", "Subheadline", &s.hero.subheadline, " maxlength=\"300\""),
        cta = input("hero.cta_label", "Call to action", &s.hero.cta_label, " required maxlength=\"40\""),
        seo_title = input("seo.title", "Title", &s.seo.title, " required maxlength=\"70\""),
        seo_description = input("seo.description", "Description", &s.seo.description, " maxlength=\"160\""),
        keywords = input(
            "seo.keywords",
            "Keywords (comma separated)",
            &s.seo.keywords.join(", "),
            " data-type=\"list\""
        ),
        email = input("contact.email", "E-mail", &s.contact.email, " type=\"email\""),
        phone = input("contact.phone", "Phone", &s.contact.phone, " maxlength=\"40\""),
        address = input("contact.address", "Address", &s.contact.address, " maxlength=\"300\""),
        whatsapp = input(
            "contact.whatsapp",
            "WhatsApp",
            s.contact.whatsapp.as_deref().unwrap_or(""),
            " data-type=\"optional\" maxlength=\"40\""
        ),
        hours = input(
            "contact.opening_hours",
            "Opening hours",
            s.contact.opening_hours.as_deref().unwrap_or(""),
            " data-type=\"optional\" maxlength=\"200\""
        ),
    );

    Ok(Html(admin_page(&user, "Settings", &body)))
}
