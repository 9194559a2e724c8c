//! `GET /ping` liveness endpoint.
//!
//! Answers locally with `pong`; the upstream is never contacted, so the
//! check stays green while the upstream is down.

pub const PING_PATH: &str = "/ping";
pub const PONG: &str = "pong";

pub async fn ping_handler() -> &'static str {
    PONG
}
