//! `passthru run`: start the proxy server.
//!
//! Resolves settings from flags, environment and config file, starts the
//! Axum HTTP server, and serves until SIGTERM or Ctrl+C.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config;
use crate::error::ProxyError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), ProxyError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let (settings, source) = config::load(args.overrides(), args.config.as_deref()).await?;

    let addr: SocketAddr = settings.listen_addr().parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        upstream = %settings.upstream,
        cookie_mode = %settings.cookie_mode,
        config = source.as_deref().unwrap_or("(none)"),
        "Proxy service has successfully started"
    );

    let state = Arc::new(AppState::new(settings));
    let router = server::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("passthru stopped");
    Ok(())
}
