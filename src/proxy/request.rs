//! Inbound → upstream request translation.
//!
//! [`convert`] builds the [`OutgoingRequest`] for one inbound request:
//! the URL is the upstream base with the inbound path and query appended
//! verbatim, and only `content-type` and `cookie` cross the boundary.
//! Every other inbound header, including auth and user-agent, is dropped.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use http_body_util::Full;

use super::headers::forwarded_headers;
use super::ProxyMethod;
use crate::error::ProxyError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// The parts of an inbound request the translator reads.
#[derive(Debug, Clone, Copy)]
pub struct IncomingRequest<'a> {
    pub method: ProxyMethod,
    /// Path plus query exactly as received, never re-parsed.
    pub path_and_query: &'a str,
    pub headers: &'a HeaderMap,
    pub body: &'a Bytes,
}

#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutgoingRequest {
    /// Turn this description into a request the hyper client can send.
    pub fn into_hyper(self) -> Result<hyper::Request<Full<Bytes>>, ProxyError> {
        let uri: hyper::Uri = self
            .url
            .parse()
            .map_err(|source| ProxyError::InvalidUpstreamUri {
                uri: self.url.clone(),
                source,
            })?;

        let mut builder = hyper::Request::builder().method(self.method).uri(uri);
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }

        builder
            .body(Full::new(self.body.unwrap_or_default()))
            .map_err(|e| ProxyError::Upstream {
                source: Box::new(e),
            })
    }
}

pub fn convert(
    upstream: &str,
    incoming: &IncomingRequest<'_>,
) -> Result<OutgoingRequest, ProxyError> {
    let body = if incoming.method.carries_body() {
        request_body(incoming.headers, incoming.body)?
    } else {
        None
    };

    Ok(OutgoingRequest {
        url: format!("{upstream}{}", incoming.path_and_query),
        method: incoming.method.into(),
        headers: forwarded_headers(incoming.headers),
        body,
    })
}

/// Body sent upstream for POST, PUT and PATCH.
///
/// - no `content-type`: no body;
/// - exactly `application/json`: the body is parsed and re-serialized
///   compactly, an empty body standing for `{}`;
/// - anything else: the inbound bytes, untouched.
pub fn request_body(headers: &HeaderMap, body: &Bytes) -> Result<Option<Bytes>, ProxyError> {
    let Some(content_type) = headers.get(CONTENT_TYPE) else {
        return Ok(None);
    };

    if content_type.as_bytes() != JSON_CONTENT_TYPE.as_bytes() {
        return Ok(Some(body.clone()));
    }

    let parsed: serde_json::Value = if body.is_empty() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(body).map_err(ProxyError::InvalidRequestBody)?
    };

    let serialized = serde_json::to_vec(&parsed).map_err(ProxyError::InvalidRequestBody)?;
    Ok(Some(Bytes::from(serialized)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const UPSTREAM: &str = "https://noma.rent";

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    fn incoming<'a>(
        method: ProxyMethod,
        path: &'a str,
        headers: &'a HeaderMap,
        body: &'a Bytes,
    ) -> IncomingRequest<'a> {
        IncomingRequest {
            method,
            path_and_query: path,
            headers,
            body,
        }
    }

    #[test]
    fn url_is_base_plus_path_verbatim() {
        let h = HeaderMap::new();
        let body = Bytes::new();
        let out = convert(
            UPSTREAM,
            &incoming(ProxyMethod::Get, "/api/items?q=a%20b&x=1", &h, &body),
        )
        .unwrap();
        assert_eq!(out.url, "https://noma.rent/api/items?q=a%20b&x=1");
        assert_eq!(out.method, Method::GET);
    }

    #[test]
    fn json_body_is_reserialized_compactly() {
        let h = headers(&[("content-type", "application/json")]);
        let body = Bytes::from_static(b"{ \"a\" : 1 ,\n \"b\": [true] }");
        let out = request_body(&h, &body).unwrap().unwrap();
        assert_eq!(&out[..], br#"{"a":1,"b":[true]}"#);
    }

    #[test]
    fn json_key_order_is_preserved() {
        let h = headers(&[("content-type", "application/json")]);
        let body = Bytes::from_static(br#"{"z":1,"a":2}"#);
        let out = request_body(&h, &body).unwrap().unwrap();
        assert_eq!(&out[..], br#"{"z":1,"a":2}"#);
    }

    #[test]
    fn empty_json_body_becomes_empty_object() {
        let h = headers(&[("content-type", "application/json")]);
        let out = request_body(&h, &Bytes::new()).unwrap().unwrap();
        assert_eq!(&out[..], b"{}");
    }

    #[test]
    fn invalid_json_body_is_rejected() {
        let h = headers(&[("content-type", "application/json")]);
        let err = request_body(&h, &Bytes::from_static(b"{nope")).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequestBody(_)));
    }

    #[test]
    fn missing_content_type_means_no_body() {
        let body = Bytes::from_static(b"ignored");
        assert!(request_body(&HeaderMap::new(), &body).unwrap().is_none());
    }

    #[test]
    fn other_content_types_pass_raw_bytes() {
        let h = headers(&[("content-type", "application/x-www-form-urlencoded")]);
        let body = Bytes::from_static(b"a=1&b=2");
        assert_eq!(request_body(&h, &body).unwrap().unwrap(), body);
    }

    #[test]
    fn json_with_charset_is_not_reserialized() {
        let h = headers(&[("content-type", "application/json; charset=utf-8")]);
        let body = Bytes::from_static(b"{ \"a\": 1 }");
        assert_eq!(request_body(&h, &body).unwrap().unwrap(), body);
    }

    #[test]
    fn get_and_delete_never_read_the_body() {
        let h = headers(&[("content-type", "application/json")]);
        let body = Bytes::from_static(b"{not json");
        for method in [ProxyMethod::Get, ProxyMethod::Delete] {
            let out = convert(UPSTREAM, &incoming(method, "/x", &h, &body)).unwrap();
            assert!(out.body.is_none());
        }
    }

    #[test]
    fn post_attaches_translated_body() {
        let h = headers(&[("content-type", "application/json")]);
        let body = Bytes::from_static(br#"{"a":1}"#);
        let out = convert(UPSTREAM, &incoming(ProxyMethod::Post, "/items", &h, &body)).unwrap();
        assert_eq!(out.method, Method::POST);
        assert_eq!(out.body.unwrap(), Bytes::from_static(br#"{"a":1}"#));
    }

    #[test]
    fn post_without_content_type_has_no_body() {
        let h = HeaderMap::new();
        let body = Bytes::from_static(br#"{"a":1}"#);
        let out = convert(UPSTREAM, &incoming(ProxyMethod::Post, "/items", &h, &body)).unwrap();
        assert!(out.body.is_none());
    }

    #[test]
    fn into_hyper_rejects_invalid_uri() {
        let out = OutgoingRequest {
            url: "https://noma.rent/has space".into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        };
        assert!(matches!(
            out.into_hyper(),
            Err(ProxyError::InvalidUpstreamUri { .. })
        ));
    }
}
