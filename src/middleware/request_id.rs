use axum::{body::Body, extract::Request};
use tower_http::request_id::RequestId;

/// HTTP header name for request ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The request ID as text, or "unknown" when missing or not valid UTF-8
pub fn request_id_str(request_id: Option<&RequestId>) -> &str {
    request_id
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("unknown")
}

/// Creates a tracing span carrying the request ID.
///
/// Expects `SetRequestIdLayer` to run first so an incoming or generated
/// `x-request-id` is always present.
pub fn make_span_with_request_id(request: &Request<Body>) -> tracing::Span {
    let request_id = request_id_str(request.extensions().get::<RequestId>());

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_id_str() {
        let id = RequestId::new(HeaderValue::from_static("abc-123"));
        assert_eq!(request_id_str(Some(&id)), "abc-123");
        assert_eq!(request_id_str(None), "unknown");
    }
}
