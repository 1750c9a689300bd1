//! Request ID generation and lookup.
//!
//! IDs are 32-char hex UUIDs. A caller-supplied `x-request-id` is kept.

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Placeholder used in logs when a request carries no ID.
pub const NO_REQUEST_ID: &str = "-";

/// Generates simple-format UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeHexRequestId;

impl MakeRequestId for MakeHexRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().simple().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID from headers, or `"-"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(NO_REQUEST_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_is_32_hex_chars() {
        let request = Request::new(());
        let id = MakeHexRequestId.make_request_id(&request).unwrap();
        let id = id.header_value().to_str().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_request_id_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "-");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }
}
