//! Shared request/response plumbing for route handlers
//!
//! Every handler returns `Response<Full<Bytes>>` JSON with permissive CORS
//! headers; every error body carries a stable machine-readable `kind`
//! alongside the human-readable message, plus field-level detail for
//! validation failures.

use bson::oid::ObjectId;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{FieldError, RefugeError};

/// Maximum accepted JSON body size
const MAX_BODY_BYTES: usize = 65536;

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a [FieldError]>,
}

/// Build a JSON response with the standard headers
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PATCH, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|_| fallback_response())
}

/// Map a service error to its HTTP response
pub fn error_response(err: &RefugeError) -> Response<Full<Bytes>> {
    let body = ErrorBody {
        error: err.to_string(),
        kind: err.kind(),
        fields: err.fields(),
    };
    json_response(err.status_code(), &body)
}

/// CORS preflight response
pub fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PATCH, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| fallback_response())
}

fn fallback_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(
        r#"{"error":"Internal error","kind":"DATABASE"}"#,
    )));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Read and deserialize a JSON request body
pub async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<Incoming>,
) -> Result<T, RefugeError> {
    let body = req
        .collect()
        .await
        .map_err(|e| RefugeError::Http(format!("failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > MAX_BODY_BYTES {
        return Err(RefugeError::Http("request body too large".into()));
    }

    serde_json::from_slice(&bytes).map_err(|e| RefugeError::Http(format!("invalid JSON: {}", e)))
}

/// Copy the Authorization header out before the request body is consumed
pub fn auth_header(req: &Request<Incoming>) -> Option<String> {
    req.headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Parse a path segment that must be a document id
pub fn parse_object_id(id: &str) -> Result<ObjectId, RefugeError> {
    ObjectId::parse_str(id)
        .map_err(|_| RefugeError::Http(format!("malformed document id '{}'", id)))
}

/// Parse a query string into a key-value map
pub fn parse_query_params(query: &str) -> HashMap<String, String> {
    if query.is_empty() {
        return HashMap::new();
    }

    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Clamp a caller-supplied page size to the configured maximum
pub fn page_limit(params: &HashMap<String, String>, max: i64) -> i64 {
    params
        .get("limit")
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(max)
        .min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_carries_kind_and_status() {
        let resp = error_response(&RefugeError::NotFound("animal".into()));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = error_response(&RefugeError::Conflict("not pending".into()));
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_parse_object_id() {
        assert!(parse_object_id("64f1a2b3c4d5e6f708091011").is_ok());
        assert!(matches!(
            parse_object_id("dog"),
            Err(RefugeError::Http(_))
        ));
    }

    #[test]
    fn test_parse_query_params() {
        let params = parse_query_params("status=available&limit=10");
        assert_eq!(params.get("status"), Some(&"available".to_string()));
        assert_eq!(params.get("limit"), Some(&"10".to_string()));
        assert!(parse_query_params("").is_empty());
    }

    #[test]
    fn test_page_limit_clamps() {
        let mut params = HashMap::new();
        assert_eq!(page_limit(&params, 100), 100);

        params.insert("limit".to_string(), "10".to_string());
        assert_eq!(page_limit(&params, 100), 10);

        params.insert("limit".to_string(), "5000".to_string());
        assert_eq!(page_limit(&params, 100), 100);

        params.insert("limit".to_string(), "-3".to_string());
        assert_eq!(page_limit(&params, 100), 100);
    }
}
