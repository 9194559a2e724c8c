//! Core HTTP forwarding.
//!
//! [`forward_handler`] is the Axum fallback that receives every request
//! except `GET /ping`, selects the entry point for its method, and runs
//! one translate → call upstream → translate back cycle. Submodules hold
//! the request side ([`request`]), the response side ([`response`]), the
//! header policy ([`headers`]) and the `Set-Cookie` rebuild ([`cookies`]).

pub mod cookies;
pub mod headers;
pub mod request;
pub mod response;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};

use crate::error::ProxyError;
use crate::server::AppState;
use request::IncomingRequest;
use response::UpstreamResponse;

/// The methods that are forwarded upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl ProxyMethod {
    /// `HEAD` is served by the `GET` entry point; the server drops the body.
    #[must_use]
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET | Method::HEAD => Some(Self::Get),
            Method::POST => Some(Self::Post),
            Method::PUT => Some(Self::Put),
            Method::PATCH => Some(Self::Patch),
            Method::DELETE => Some(Self::Delete),
            _ => None,
        }
    }

    #[must_use]
    pub const fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }
}

impl From<ProxyMethod> for Method {
    fn from(method: ProxyMethod) -> Self {
        match method {
            ProxyMethod::Get => Self::GET,
            ProxyMethod::Post => Self::POST,
            ProxyMethod::Put => Self::PUT,
            ProxyMethod::Patch => Self::PATCH,
            ProxyMethod::Delete => Self::DELETE,
        }
    }
}

pub async fn forward_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    req_headers: HeaderMap,
    body: Bytes,
) -> Response {
    let correlation_id = req_headers
        .get("x-correlation-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| uuid::Uuid::new_v4().to_string(), String::from);

    let path_and_query = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    let Some(proxy_method) = ProxyMethod::from_method(&method) else {
        tracing::warn!(
            correlation_id = %correlation_id,
            method = %method,
            path = %path_and_query,
            "method not proxied"
        );
        return ProxyError::UnsupportedMethod(method).into_response();
    };

    let incoming = IncomingRequest {
        method: proxy_method,
        path_and_query,
        headers: &req_headers,
        body: &body,
    };

    let start = Instant::now();
    match forward(&state, &incoming).await {
        Ok(response) => {
            tracing::info!(
                correlation_id = %correlation_id,
                method = %method,
                path = %path_and_query,
                status = response.status().as_u16(),
                latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                "request proxied"
            );
            response
        }
        Err(e) => {
            if e.status_code().is_server_error() {
                tracing::error!(
                    correlation_id = %correlation_id,
                    method = %method,
                    path = %path_and_query,
                    error = %e,
                    "upstream request failed"
                );
            } else {
                tracing::warn!(
                    correlation_id = %correlation_id,
                    method = %method,
                    path = %path_and_query,
                    error = %e,
                    "request rejected"
                );
            }
            e.into_response()
        }
    }
}

/// Run one request cycle against the upstream.
pub async fn forward(
    state: &AppState,
    incoming: &IncomingRequest<'_>,
) -> Result<Response, ProxyError> {
    let outgoing = request::convert(&state.settings.upstream, incoming)?;
    tracing::debug!(url = %outgoing.url, method = %outgoing.method, "dispatching upstream");

    let call = state.http_client.request(outgoing.into_hyper()?);
    let result = match state.settings.timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), call)
            .await
            .map_err(|_| ProxyError::UpstreamTimeout(ms))?,
        None => call.await,
    };
    let upstream = result.map_err(|e| ProxyError::Upstream {
        source: Box::new(e),
    })?;

    let upstream = UpstreamResponse::collect(upstream).await?;
    response::translate(upstream, state.settings.cookie_mode)
}
