//! Upstream → caller response translation.
//!
//! [`translate`] copies the upstream status and headers, rebuilds the
//! `Set-Cookie` lines, decodes the body as JSON and re-encodes it by value
//! type. An empty upstream body becomes an empty reply; a body that is not
//! JSON at all is an [`ProxyError::UpstreamBody`].

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::error::Category;
use serde_json::Value;

use super::cookies::{self, CookieMode};
use super::headers::strip_response_hop_by_hop;
use crate::error::ProxyError;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
/// A decoded string body goes back as HTML text unless upstream named a type.
const TEXT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

#[derive(Debug, thiserror::Error)]
#[error("body is unusable: it has already been read")]
pub struct BodyUnusable;

/// A response body that can be read at most once.
#[derive(Debug)]
pub struct OnceBody(Option<Bytes>);

impl OnceBody {
    #[must_use]
    pub const fn new(bytes: Bytes) -> Self {
        Self(Some(bytes))
    }

    pub fn take(&mut self) -> Result<Bytes, BodyUnusable> {
        self.0.take().ok_or(BodyUnusable)
    }
}

#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: OnceBody,
}

impl UpstreamResponse {
    /// Collect a hyper response into memory.
    pub async fn collect(
        response: hyper::Response<hyper::body::Incoming>,
    ) -> Result<Self, ProxyError> {
        let (parts, body) = response.into_parts();
        let bytes = body
            .collect()
            .await
            .map_err(|e| ProxyError::UpstreamBody {
                source: Box::new(e),
            })?
            .to_bytes();

        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body: OnceBody::new(bytes),
        })
    }
}

/// Decode the upstream body.
///
/// JSON is tried first. When the input ends before a value is complete
/// (empty or whitespace-only bodies) the text fallback is attempted, but
/// the JSON attempt already consumed the body, so the result is `null`.
pub fn decode_body(body: &mut OnceBody) -> Result<Value, ProxyError> {
    let bytes = body.take().map_err(|e| ProxyError::UpstreamBody {
        source: Box::new(e),
    })?;

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => Ok(value),
        Err(e) if e.classify() == Category::Eof => match body.take() {
            Ok(text) => Ok(Value::String(String::from_utf8_lossy(&text).into_owned())),
            Err(BodyUnusable) => Ok(Value::Null),
        },
        Err(e) => Err(ProxyError::UpstreamBody {
            source: Box::new(e),
        }),
    }
}

/// Encode a decoded body for the caller, choosing the representation
/// from the value type. `content-type` is only filled in when upstream
/// did not send one.
pub fn encode_body(value: &Value, headers: &mut HeaderMap) -> Result<Bytes, ProxyError> {
    match value {
        Value::Null => Ok(Bytes::new()),
        Value::String(text) => {
            set_default_content_type(headers, TEXT_CONTENT_TYPE);
            Ok(Bytes::from(text.clone()))
        }
        other => {
            set_default_content_type(headers, JSON_CONTENT_TYPE);
            serde_json::to_vec(other)
                .map(Bytes::from)
                .map_err(|e| ProxyError::UpstreamBody {
                    source: Box::new(e),
                })
        }
    }
}

fn set_default_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    headers
        .entry(CONTENT_TYPE)
        .or_insert_with(|| HeaderValue::from_static(content_type));
}

pub fn translate(
    mut upstream: UpstreamResponse,
    cookie_mode: CookieMode,
) -> Result<Response, ProxyError> {
    let mut headers = upstream.headers.clone();
    strip_response_hop_by_hop(&mut headers);
    cookies::apply(cookie_mode, &upstream.headers, &mut headers);

    let value = decode_body(&mut upstream.body)?;
    let body = encode_body(&value, &mut headers)?;

    let mut builder = Response::builder().status(upstream.status);
    if let Some(map) = builder.headers_mut() {
        map.extend(headers);
    }
    Ok(builder.body(Body::from(body))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;

    fn upstream(status: StatusCode, headers: HeaderMap, body: &'static [u8]) -> UpstreamResponse {
        UpstreamResponse {
            status,
            headers,
            body: OnceBody::new(Bytes::from_static(body)),
        }
    }

    async fn body_bytes(response: Response) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn once_body_reads_once() {
        let mut body = OnceBody::new(Bytes::from_static(b"x"));
        assert_eq!(body.take().unwrap(), Bytes::from_static(b"x"));
        assert!(body.take().is_err());
    }

    #[test]
    fn json_body_decodes_to_value() {
        let mut body = OnceBody::new(Bytes::from_static(br#"{"k":1}"#));
        assert_eq!(decode_body(&mut body).unwrap(), serde_json::json!({"k": 1}));
    }

    #[test]
    fn empty_body_decodes_to_null() {
        let mut body = OnceBody::new(Bytes::new());
        assert_eq!(decode_body(&mut body).unwrap(), Value::Null);
    }

    #[test]
    fn whitespace_and_truncated_bodies_decode_to_null() {
        for raw in [&b"  \n"[..], &br#"{"k":"#[..]] {
            let mut body = OnceBody::new(Bytes::copy_from_slice(raw));
            assert_eq!(decode_body(&mut body).unwrap(), Value::Null);
        }
    }

    #[test]
    fn non_json_body_is_an_error() {
        let mut body = OnceBody::new(Bytes::from_static(b"<html>oops</html>"));
        assert!(matches!(
            decode_body(&mut body),
            Err(ProxyError::UpstreamBody { .. })
        ));
    }

    #[test]
    fn json_string_is_sent_as_text() {
        let mut headers = HeaderMap::new();
        let out = encode_body(&Value::String("hello".into()), &mut headers).unwrap();
        assert_eq!(&out[..], b"hello");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), TEXT_CONTENT_TYPE);
    }

    #[test]
    fn upstream_content_type_is_kept() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/problem+json"));
        let out = encode_body(&serde_json::json!([1, 2]), &mut headers).unwrap();
        assert_eq!(&out[..], b"[1,2]");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/problem+json");
    }

    #[tokio::test]
    async fn translate_copies_status_headers_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-upstream", HeaderValue::from_static("yes"));
        headers.insert("content-length", HeaderValue::from_static("7"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = translate(
            upstream(StatusCode::CREATED, headers, br#"{"k":1}"#),
            CookieMode::Coalesced,
        )
        .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers().get("x-upstream").unwrap(), "yes");
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(response.headers().get("content-length").is_none());
        assert_eq!(&body_bytes(response).await[..], br#"{"k":1}"#);
    }

    #[tokio::test]
    async fn translate_rebuilds_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Expire"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Expire"));

        let response = translate(upstream(StatusCode::OK, headers, b""), CookieMode::Coalesced).unwrap();

        let cookies: Vec<_> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, ["b=2; Expire", "a=1; Expire"]);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn translate_keeps_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("vary", HeaderValue::from_static("origin"));
        headers.append("vary", HeaderValue::from_static("accept"));

        let response = translate(upstream(StatusCode::OK, headers, b"null"), CookieMode::Native).unwrap();

        assert_eq!(response.headers().get_all("vary").iter().count(), 2);
    }
}
