use axum::{
    Form,
    extract::{
        Path, Query, RawQuery, Request, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

use super::{Chrome, PageError, attr, mileage, pagination, text};
use crate::api::AppState;
use crate::api::assets;
use crate::api::rate_limit::admit;
use crate::models::lead::{LeadInput, LeadSource};
use crate::models::testimonial::Testimonial;
use crate::models::vehicle::{
    FuelType, Transmission, Vehicle, VehicleQuery, VehicleSort, VehicleStatus,
};
use crate::services::{Bucket, LeadError};

const HOME_FEATURED: usize = 6;

// ============================================================================
// Rate limiting
// ============================================================================

fn too_many_requests() -> Response {
    PageError::new(
        StatusCode::TOO_MANY_REQUESTS,
        "You have sent a lot of requests in a short time. Please wait a few minutes and try again.",
    )
    .into_response()
}

pub async fn contact_page_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !admit(&state, Bucket::Contact, &request) {
        return too_many_requests();
    }
    next.run(request).await
}

pub async fn login_page_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !admit(&state, Bucket::Login, &request) {
        return too_many_requests();
    }
    next.run(request).await
}

// ============================================================================
// Fragments
// ============================================================================

fn vehicle_card(chrome: &Chrome, vehicle: &Vehicle) -> String {
    let image = vehicle.cover_image().map_or_else(
        || r#"<div class="card-image placeholder"></div>"#.to_string(),
        |src| {
            format!(
                r#"<img class="card-image" src="{}" alt="{}" loading="lazy">"#,
                attr(src),
                attr(&vehicle.title())
            )
        },
    );

    let badge = if matches!(vehicle.status, VehicleStatus::Reserved | VehicleStatus::Sold) {
        format!(
            r#"<span class="badge badge-{0}">{0}</span>"#,
            vehicle.status.as_str()
        )
    } else {
        String::new()
    };

    format!(
        r#"<article class="card">
<a href="/stock/{id}">{image}</a>
<div class="card-body">
<h3><a href="/stock/{id}">{title}</a></h3>{badge}
<p class="price">{price}</p>
<p class="meta">{mileage} &middot; {fuel} &middot; {transmission}</p>
</div>
</article>"#,
        id = vehicle.id,
        title = text(&vehicle.title()),
        price = text(&chrome.price(vehicle.price)),
        mileage = mileage(vehicle.mileage),
        fuel = vehicle.fuel.label(),
        transmission = vehicle.transmission.label(),
    )
}

fn vehicle_grid(chrome: &Chrome, vehicles: &[Vehicle]) -> String {
    let cards: String = vehicles.iter().map(|v| vehicle_card(chrome, v)).collect();
    format!(r#"<div class="grid">{cards}</div>"#)
}

fn stars(rating: i32) -> String {
    let filled = usize::try_from(rating.clamp(0, 5)).unwrap_or(0);
    format!("{}{}", "\u{2605}".repeat(filled), "\u{2606}".repeat(5 - filled))
}

fn testimonial_list(testimonials: &[Testimonial]) -> String {
    let mut out = String::from(r#"<div class="testimonials">"#);
    for t in testimonials {
        let role = t
            .role
            .as_deref()
            .map(|r| format!(", {}", text(r)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<blockquote class="testimonial{featured}"><p class="stars" aria-label="{rating} out of 5">{stars}</p><p>{content}</p><footer>{name}{role}</footer></blockquote>"#,
            featured = if t.featured { " featured" } else { "" },
            rating = t.rating,
            stars = stars(t.rating),
            content = text(&t.content),
            name = text(&t.name),
        );
    }
    out.push_str("</div>");
    out
}

fn options<T: Copy + PartialEq>(
    values: &[T],
    selected: Option<T>,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> String {
    values
        .iter()
        .map(|&v| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                value(v),
                if selected == Some(v) { " selected" } else { "" },
                label(v)
            )
        })
        .collect()
}

/// Rebuilds the current query string with another `page` value.
// ============================================================================
// Pages
// ============================================================================

/// GET /
pub async fn home(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    let chrome = Chrome::load(&state).await?;
    let settings = state.settings_service().get().await?;
    let featured = state.vehicle_service().featured(HOME_FEATURED).await?;
    let testimonials = state.testimonial_service().list_public().await?;

    let mut body = format!(
        r#"<section class="hero">
<h1>{headline}</h1>
<p>{subheadline}</p>
<a class="button" href="/contact">{cta}</a>
</section>"#,
        headline = text(&settings.hero.headline),
        subheadline = text(&settings.hero.subheadline),
        cta = text(&settings.hero.cta_label),
    );

    if !featured.is_empty() {
        let _ = write!(
            body,
            r#"<section><h2>Featured vehicles</h2>{}<p><a href="/stock">See all stock</a></p></section>"#,
            vehicle_grid(&chrome, &featured)
        );
    }
    if !testimonials.is_empty() {
        let _ = write!(
            body,
            "<section><h2>What our customers say</h2>{}</section>",
            testimonial_list(&testimonials)
        );
    }

    Ok(Html(chrome.page(None, &body)))
}

/// GET /stock
pub async fn stock(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    query: Result<Query<VehicleQuery>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let Query(query) = query.map_err(|e| PageError::new(StatusCode::BAD_REQUEST, e.body_text()))?;

    let chrome = Chrome::load(&state).await?;
    let makes = state.vehicle_service().makes().await?;
    let page = state.vehicle_service().list_public(query.clone()).await?;

    let make_options: String = makes
        .iter()
        .map(|m| {
            let selected = query
                .make
                .as_deref()
                .is_some_and(|q| q.eq_ignore_ascii_case(m));
            format!(
                r#"<option value="{0}"{1}>{2}</option>"#,
                attr(m),
                if selected { " selected" } else { "" },
                text(m)
            )
        })
        .collect();

    let number = |name: &str, label: &str, value: Option<String>| {
        format!(
            r#"<label>{label}<input type="number" name="{name}" value="{}"></label>"#,
            attr(&value.unwrap_or_default())
        )
    };

    let mut body = format!(
        r#"<h1>Our stock</h1>
<form class="filters" method="get" action="/stock">
<label>Search<input type="search" name="q" value="{q}"></label>
<label>Make<select name="make"><option value="">Any</option>{make_options}</select></label>
<label>Fuel<select name="fuel"><option value="">Any</option>{fuel}</select></label>
<label>Gearbox<select name="transmission"><option value="">Any</option>{transmission}</select></label>
{min_price}{max_price}{min_year}{max_year}{max_mileage}
<label>Sort<select name="sort">{sort}</select></label>
<button type="submit">Search</button>
</form>
<p class="result-count">{total} vehicles</p>"#,
        q = attr(query.q.as_deref().unwrap_or_default()),
        fuel = options(&FuelType::ALL, query.fuel, |f| f.as_str(), |f| f.label()),
        transmission = options(
            &Transmission::ALL,
            query.transmission,
            |t| t.as_str(),
            |t| t.label()
        ),
        min_price = number("min_price", "Min price", query.min_price.map(|v| v.to_string())),
        max_price = number("max_price", "Max price", query.max_price.map(|v| v.to_string())),
        min_year = number("min_year", "From year", query.min_year.map(|v| v.to_string())),
        max_year = number("max_year", "To year", query.max_year.map(|v| v.to_string())),
        max_mileage = number(
            "max_mileage",
            "Max mileage",
            query.max_mileage.map(|v| v.to_string())
        ),
        sort = options(
            &VehicleSort::ALL,
            Some(query.sort.unwrap_or_default()),
            |s| s.as_str(),
            |s| s.label()
        ),
        total = page.total,
    );

    if page.items.is_empty() {
        body.push_str(
            r#"<p class="notice">No vehicles match those filters. <a href="/contact">Tell us what you are looking for</a> and we will source it.</p>"#,
        );
    } else {
        body.push_str(&vehicle_grid(&chrome, &page.items));
        body.push_str(&pagination("/stock", &page, raw_query.as_deref()));
    }

    Ok(Html(chrome.page(Some("Stock"), &body)))
}

/// GET /stock/{id}
pub async fn vehicle_detail(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Html<String>, PageError> {
    let Ok(Path(id)) = id else {
        return Err(PageError::new(
            StatusCode::NOT_FOUND,
            "We could not find that vehicle.",
        ));
    };
    let chrome = Chrome::load(&state).await?;
    let vehicle = state.vehicle_service().get_public(id).await?;
    let title = vehicle.title();

    let gallery: String = vehicle
        .images
        .iter()
        .enumerate()
        .map(|(i, src)| {
            format!(
                r#"<img src="{}" alt="{} photo {}" loading="{}">"#,
                attr(src),
                attr(&title),
                i + 1,
                if i == 0 { "eager" } else { "lazy" }
            )
        })
        .collect();

    let mut specs = String::new();
    let mut row = |label: &str, value: &str| {
        let _ = write!(specs, "<tr><th>{label}</th><td>{}</td></tr>", text(value));
    };
    row("Make", &vehicle.make);
    row("Model", &vehicle.model);
    row("Year", &vehicle.year.to_string());
    row("Mileage", &mileage(vehicle.mileage));
    row("Fuel", vehicle.fuel.label());
    row("Gearbox", vehicle.transmission.label());
    if let Some(body_type) = &vehicle.body_type {
        row("Body", body_type);
    }
    if let Some(colour) = &vehicle.colour {
        row("Colour", colour);
    }
    row("Status", vehicle.status.as_str());

    let description = vehicle
        .description
        .as_deref()
        .map(|d| {
            d.split("\n\n")
                .map(|p| format!("<p>{}</p>", text(p.trim())))
                .collect::<String>()
        })
        .unwrap_or_default();

    let body = format!(
        r#"<article class="vehicle">
<h1>{title}</h1>
<p class="price">{price}</p>
<div class="gallery">{gallery}</div>
<table class="specs">{specs}</table>
<div class="description">{description}</div>
</article>
<section class="enquiry">
<h2>Enquire about this vehicle</h2>
{form}
</section>"#,
        title = text(&title),
        price = text(&chrome.price(vehicle.price)),
        form = contact_fields(&ContactForm {
            make_model: Some(title.clone()),
            vehicle_id: Some(vehicle.id.to_string()),
            ..ContactForm::default()
        }),
    );

    Ok(Html(chrome.page(Some(&title), &body)))
}

// ============================================================================
// Contact
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub contact: String,
    pub make_model: Option<String>,
    pub budget: Option<String>,
    pub message: Option<String>,
    pub vehicle_id: Option<String>,
}

impl ContactForm {
    fn into_input(self) -> Result<LeadInput, String> {
        let vehicle_id = match self.vehicle_id.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| "vehicle reference is invalid".to_string())?,
            ),
        };

        Ok(LeadInput {
            name: self.name,
            contact: self.contact,
            make_model: self.make_model,
            budget: self.budget,
            message: self.message,
            extra: None,
            vehicle_id,
        })
    }
}

fn contact_fields(form: &ContactForm) -> String {
    let value = |v: &Option<String>| attr(v.as_deref().unwrap_or_default()).into_owned();
    let hidden = form
        .vehicle_id
        .as_deref()
        .map(|id| format!(r#"<input type="hidden" name="vehicle_id" value="{}">"#, attr(id)))
        .unwrap_or_default();

    format!(
        r#"<form class="contact-form" method="post" action="/contact">
{hidden}
<label>Your name<input name="name" required maxlength="100" value="{name}"></label>
<label>E-mail or phone<input name="contact" required maxlength="200" value="{contact}"></label>
<label>Make and model<input name="make_model" maxlength="200" value="{make_model}"></label>
<label>Budget<input name="budget" maxlength="50" value="{budget}"></label>
<label>Message<textarea name="message" maxlength="2000" rows="5">{message}</textarea></label>
<button type="submit">Send enquiry</button>
</form>"#,
        name = attr(&form.name),
        contact = attr(&form.contact),
        make_model = value(&form.make_model),
        budget = value(&form.budget),
        message = text(form.message.as_deref().unwrap_or_default()),
    )
}

fn contact_page(chrome: &Chrome, form: &ContactForm, error: Option<&str>) -> String {
    let error = error
        .map(|e| format!(r#"<p class="error" role="alert">{}</p>"#, text(e)))
        .unwrap_or_default();
    let body = format!(
        r#"<section class="contact">
<h1>Tell us what you are looking for</h1>
<p>Give us a make, a model and a budget. We will search the trade and come back to you.</p>
{error}
{fields}
</section>"#,
        fields = contact_fields(form),
    );
    chrome.page(Some("Contact"), &body)
}

#[derive(Debug, Deserialize)]
pub struct ContactQuery {
    pub make_model: Option<String>,
}

/// GET /contact
pub async fn contact_form(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> Result<Html<String>, PageError> {
    let chrome = Chrome::load(&state).await?;
    let form = ContactForm {
        make_model: query.make_model,
        ..ContactForm::default()
    };
    Ok(Html(contact_page(&chrome, &form, None)))
}

/// POST /contact
/// Validation failures re-render the form with a 422.
pub async fn contact_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ContactForm>,
) -> Result<Response, PageError> {
    let chrome = Chrome::load(&state).await?;

    let input = match form.clone().into_input() {
        Ok(input) => input,
        Err(message) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(contact_page(&chrome, &form, Some(&message))),
            )
                .into_response());
        }
    };

    let source = if input.vehicle_id.is_some() {
        LeadSource::VehicleEnquiry
    } else {
        LeadSource::ContactForm
    };

    match state.lead_service().create(input, source).await {
        Ok(_) => {
            let body = r#"<section class="notice"><h1>Thank you</h1><p>We have your enquiry and will be in touch soon.</p><p><a href="/stock">Keep browsing</a></p></section>"#;
            Ok(Html(chrome.page(Some("Thank you"), body)).into_response())
        }
        Err(LeadError::Validation(message)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(contact_page(&chrome, &form, Some(&message))),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Legal
// ============================================================================

async fn legal(state: &AppState, title: &str, path: &str) -> Result<Html<String>, PageError> {
    let chrome = Chrome::load(state).await?;
    let content = assets::text(path)
        .ok_or_else(|| PageError::new(StatusCode::NOT_FOUND, "We could not find that page."))?;
    let body = format!(r#"<article class="legal">{content}</article>"#);
    Ok(Html(chrome.page(Some(title), &body)))
}

/// GET /privacy
pub async fn privacy(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    legal(&state, "Privacy policy", "legal/privacy.html").await
}

/// GET /terms
pub async fn terms(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    legal(&state, "Terms of business", "legal/terms.html").await
}
