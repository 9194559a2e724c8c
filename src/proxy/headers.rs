//! Which headers cross the proxy, in each direction.
//!
//! Upstream-bound requests carry an allow-list of exactly `content-type`
//! and `cookie` ([`forwarded_headers`]). Caller-bound responses carry
//! every upstream header except hop-by-hop ones and `content-length`
//! ([`strip_response_hop_by_hop`]).

use std::sync::LazyLock;

use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE, COOKIE};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

static HOP_BY_HOP: LazyLock<Vec<HeaderName>> = LazyLock::new(|| {
    [
        "connection",
        "keep-alive",
        "transfer-encoding",
        "te",
        "trailer",
        "upgrade",
        "proxy-authorization",
        "proxy-authenticate",
    ]
    .iter()
    .filter_map(|name| name.parse::<HeaderName>().ok())
    .collect()
});

/// Strip hop-by-hop headers and `content-length` from an upstream response.
///
/// The body is decoded and re-encoded before it reaches the caller, so the
/// origin's framing no longer applies. Axum sets `content-length` from the
/// re-encoded bytes.
pub fn strip_response_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
    headers.remove(CONTENT_LENGTH);
}

/// Keep only `content-type` and `cookie`.
///
/// Several `cookie` lines (as HTTP/2 clients send them) are folded into a
/// single `; `-separated value.
#[must_use]
pub fn forwarded_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();

    if let Some(content_type) = inbound.get(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, content_type.clone());
    }

    let cookies: Vec<&[u8]> = inbound
        .get_all(COOKIE)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();
    if !cookies.is_empty() {
        if let Ok(value) = HeaderValue::from_bytes(&cookies.join(&b"; "[..])) {
            headers.insert(COOKIE, value);
        }
    }

    headers
}
