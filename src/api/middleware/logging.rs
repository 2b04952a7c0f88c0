//! Access logging for the teams API
//!
//! One line per request once the response is ready. Caller ids are logged as
//! fields; the caller's email and name are personal data and only their
//! presence is recorded.

use std::time::Instant;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use super::identity::{
    ORGANIZATION_ID_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER, USER_NAME_HEADER,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// How a request header appears in the access log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderPolicy {
    Log,
    Redact,
    Skip,
}

fn header_policy(name: &str) -> HeaderPolicy {
    match name {
        USER_ID_HEADER | ORGANIZATION_ID_HEADER | REQUEST_ID_HEADER | "content-type"
        | "user-agent" => HeaderPolicy::Log,
        USER_EMAIL_HEADER | USER_NAME_HEADER | "cookie" | "authorization" => {
            HeaderPolicy::Redact
        }
        _ => HeaderPolicy::Skip,
    }
}

/// Runs inside `TraceLayer`'s span, so it records fields and opens none.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = matched_route(&request);
    let request_id = request_id(request.headers());
    let headers = loggable_headers(request.headers());

    let response = next.run(request).await;

    let status = response.status();
    let duration_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        warn!(
            method = %method,
            route = %route,
            status = status.as_u16(),
            duration_ms,
            request_id = %request_id,
            headers = %headers,
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            route = %route,
            status = status.as_u16(),
            duration_ms,
            request_id = %request_id,
            headers = %headers,
            "Request handled"
        );
    }

    response
}

fn matched_route(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

/// Set upstream by `SetRequestIdLayer`; generated here only when the
/// middleware runs without it.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn loggable_headers(headers: &HeaderMap) -> String {
    let mut parts: Vec<String> = headers
        .iter()
        .filter_map(|(name, value)| match header_policy(name.as_str()) {
            HeaderPolicy::Log => Some(format!(
                "{}={}",
                name,
                value.to_str().unwrap_or("[invalid]")
            )),
            HeaderPolicy::Redact => Some(format!("{}=[REDACTED]", name)),
            HeaderPolicy::Skip => None,
        })
        .collect();

    parts.sort();
    parts.join(", ")
}
