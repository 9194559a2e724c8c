//! Command-line interface definitions using clap derive macros.
//!
//! Contains the top-level [`Cli`] parser, the [`Commands`] enum for
//! subcommands (run, ping, validate), and their associated argument
//! structs. Every `run` flag has an environment variable equivalent for
//! container deployments, and every one of them is optional so that a
//! config file can supply the value instead.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::model::ConfigLayer;
use crate::proxy::cookies::CookieMode;

#[derive(Parser)]
#[command(
    name = "passthru",
    version,
    about = "Transparent HTTP reverse proxy",
    propagate_version = true,
    after_help = "\x1b[1mQuick start:\x1b[0m\n  \
        passthru run                                   Proxy :3003 to https://noma.rent\n  \
        passthru run -u http://localhost:4000 -p 8080  Proxy :8080 to a local backend\n  \
        passthru ping                                  Check a running instance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the proxy server
    Run(Box<RunArgs>),

    /// Validate a config file without starting
    Validate(ValidateArgs),

    /// Check that a running instance answers /ping
    Ping(PingArgs),
}

#[derive(Args)]
#[command(after_help = "\x1b[1mExamples:\x1b[0m\n  \
        passthru run                                    Auto-detect ./passthru.yaml\n  \
        passthru run -c proxy.yaml                      Specific config file\n  \
        passthru run -u https://api.example.com --pretty  Local dev mode")]
pub struct RunArgs {
    /// Config file path (.yaml, .json, .toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Upstream base URL every request path is appended to [default: https://noma.rent]
    #[arg(short, long, env = "UPSTREAM_URL")]
    pub upstream: Option<String>,

    /// Listen port [default: 3003]
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Listen address [default: 0.0.0.0]
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// How upstream Set-Cookie headers are rebuilt [default: coalesced]
    #[arg(long, env = "COOKIE_MODE")]
    pub cookie_mode: Option<CookieMode>,

    // -- Logging --
    /// Log level
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Force pretty (human-readable) log output
    #[arg(long)]
    pub pretty: bool,

    /// Force JSON log output (overrides TTY detection)
    #[arg(long, conflicts_with = "pretty")]
    pub json: bool,

    // -- Tuning --
    /// Upstream timeout in milliseconds [default: none]
    #[arg(long, env = "UPSTREAM_TIMEOUT_MS", help_heading = "Tuning")]
    pub timeout: Option<u64>,

    /// Max request body size in bytes [default: 1048576]
    #[arg(long, env = "MAX_BODY_SIZE", help_heading = "Tuning")]
    pub max_body: Option<usize>,
}

impl RunArgs {
    /// The settings given on the command line or through the environment.
    #[must_use]
    pub fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            host: self.host.clone(),
            port: self.port,
            upstream: self.upstream.clone(),
            cookie_mode: self.cookie_mode,
            max_body: self.max_body,
            timeout_ms: self.timeout,
        }
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Config file to validate
    #[arg(default_value = "passthru.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: ValidateFormat,
}

#[derive(Args)]
pub struct PingArgs {
    /// URL of the running instance
    #[arg(default_value = "http://localhost:3003")]
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn to_tracing_level(&self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ValidateFormat {
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "passthru",
            "run",
            "--upstream",
            "http://backend:4000",
            "--port",
            "8080",
            "--cookie-mode",
            "native",
            "--timeout",
            "1500",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        let layer = args.overrides();
        assert_eq!(layer.upstream.as_deref(), Some("http://backend:4000"));
        assert_eq!(layer.port, Some(8080));
        assert_eq!(layer.cookie_mode, Some(CookieMode::Native));
        assert_eq!(layer.timeout_ms, Some(1500));
    }

    #[test]
    fn ping_defaults_to_local_instance() {
        let cli = Cli::try_parse_from(["passthru", "ping"]).unwrap();
        let Some(Commands::Ping(args)) = cli.command else {
            panic!("expected ping subcommand");
        };
        assert_eq!(args.url, "http://localhost:3003");
        assert!(!args.json);
    }
}
