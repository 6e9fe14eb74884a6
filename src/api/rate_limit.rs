use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;

use super::{ApiError, AppState};
use crate::services::Bucket;
use crate::services::rate_limit::client_key;

/// Charges one request against `bucket` for the calling client.
/// Returns `false` when the client is over its quota.
pub fn admit(state: &AppState, bucket: Bucket, request: &Request) -> bool {
    let limits = state.rate_limits();

    let forwarded_for = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok());
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let client = client_key(forwarded_for, peer.as_deref(), limits.trust_forwarded_for());

    if limits.check(bucket, &client) {
        return true;
    }

    metrics::counter!("rate_limited_total", "bucket" => bucket.as_str()).increment(1);
    tracing::warn!(
        event = "rate_limited",
        bucket = bucket.as_str(),
        client = %client,
        "Request rejected by rate limiter"
    );
    false
}

pub async fn contact_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !admit(&state, Bucket::Contact, &request) {
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(request).await)
}

pub async fn login_limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !admit(&state, Bucket::Login, &request) {
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(request).await)
}
