//! `passthru ping`: check that a running instance is alive.
//!
//! Sends `GET /ping` to the given URL and expects `pong` back.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::PingArgs;
use crate::error::ProxyError;
use crate::health::{PING_PATH, PONG};

pub async fn execute(args: PingArgs) -> Result<(), ProxyError> {
    let url = format!("{}{PING_PATH}", args.url.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse()
            .map_err(|e: hyper::http::uri::InvalidUri| ProxyError::HttpRequest {
                source: Box::new(e),
            })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?;

    let started = std::time::Instant::now();
    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| ProxyError::HttpRequest {
            source: "ping timed out after 10s".into(),
        })?
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| ProxyError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if !status.is_success() || body.as_ref() != PONG.as_bytes() {
        return Err(ProxyError::PingFailed(status));
    }

    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "url": url,
                "status": status.as_u16(),
                "latency_ms": latency_ms,
            })
        );
    } else {
        println!("\u{2713} passthru is alive ({}) in {latency_ms} ms", args.url);
    }

    Ok(())
}
