//! Per-request context.
//!
//! # Responsibilities
//! - Attach a request ID (propagated from the client or a fresh UUID v4)
//! - Echo it on the response
//! - Record request count and latency
//!
//! # Design Decisions
//! - Metric path labels are limited to known routes to bound cardinality

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ID stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

pub async fn request_context(mut req: Request, next: Next) -> Response {
    let start = Instant::now();
    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let method = req.method().clone();
    let path = metric_path(req.uri().path());
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = response.status().as_u16();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path,
        status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_api_request(path, status, start);
    response
}

fn metric_path(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/sum" => "/sum",
        _ => "other",
    }
}
