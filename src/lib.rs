//! passthru is a transparent HTTP reverse proxy.
//!
//! Every inbound request except `GET /ping` is re-issued against one
//! fixed upstream base URL, and the upstream's reply is translated back
//! to the caller. Only `content-type` and `cookie` travel upstream;
//! merged `Set-Cookie` values are split back into separate lines on the
//! way back.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, validate, ping).
//! - [`config`] -- Settings layering (flags/env, config file, defaults)
//!   and validation.
//! - [`error`] -- Unified error type using `thiserror`, with its HTTP mapping.
//! - [`health`] -- `GET /ping` handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- Request translation, upstream dispatch, response
//!   translation and `Set-Cookie` reconstruction.
//! - [`server`] -- Axum router, CORS and body-limit layers, shared state,
//!   upstream HTTP client, and graceful shutdown.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file formats |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod proxy;
pub mod server;
