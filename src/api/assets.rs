use axum::{
    body::Body,
    extract::Path,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "assets/"]
pub struct Asset;

/// Embedded text document, e.g. `legal/privacy.html`.
#[must_use]
pub fn text(path: &str) -> Option<String> {
    Asset::get(path).map(|content| String::from_utf8_lossy(&content.data).into_owned())
}

/// GET /static/{*path}
pub async fn serve_static(Path(path): Path<String>) -> Response {
    let path = format!("static/{}", path.trim_start_matches('/'));

    match Asset::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                [
                    (header::CONTENT_TYPE, mime.as_ref()),
                    (header::CACHE_CONTROL, "public, max-age=3600"),
                ],
                Body::from(content.data),
            )
                .into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_pages_are_embedded() {
        assert!(text("legal/privacy.html").is_some());
        assert!(text("legal/terms.html").is_some());
        assert!(text("legal/missing.html").is_none());
    }
}
