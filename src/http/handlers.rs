//! Request handlers.

use std::collections::HashMap;

use axum::{
    extract::RawQuery,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

const INVALID_PARAMS: &str = "Invalid query params";

/// Largest integer an f64 represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /sum?a=&b=`. A repeated parameter takes its last value.
pub async fn sum(RawQuery(query): RawQuery) -> Response {
    match parse_operands(query.as_deref().unwrap_or("")) {
        Some((a, b)) => match finite(a + b) {
            Some(result) => Json(json!({ "result": number(result) })).into_response(),
            None => invalid_params(),
        },
        None => invalid_params(),
    }
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" }))).into_response()
}

fn invalid_params() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_PARAMS }))).into_response()
}

fn parse_operands(query: &str) -> Option<(f64, f64)> {
    let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();
    let a = parse_number(params.get("a")?)?;
    let b = parse_number(params.get("b")?)?;
    Some((a, b))
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().and_then(finite)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Integral results are emitted as JSON integers.
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operands() {
        assert_eq!(parse_operands("a=1&b=2"), Some((1.0, 2.0)));
        assert_eq!(parse_operands("a=+1.5&b=%202%20"), Some((1.5, 2.0)));
        assert_eq!(parse_operands("a=1&b=2&a=5"), Some((5.0, 2.0)));
        assert_eq!(parse_operands("a=1"), None);
        assert_eq!(parse_operands("a=&b=2"), None);
        assert_eq!(parse_operands("a=x&b=2"), None);
        assert_eq!(parse_operands("a=NaN&b=2"), None);
        assert_eq!(parse_operands("a=inf&b=2"), None);
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(3.0), json!(3));
        assert_eq!(number(-0.0), json!(0));
        assert_eq!(number(0.5), json!(0.5));
        assert_eq!(number(1e300), json!(1e300));
    }

    #[test]
    fn test_overflow_is_not_finite() {
        assert_eq!(finite(f64::MAX + f64::MAX), None);
    }
}
