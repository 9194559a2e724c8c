//! Configuration loading and validation.
//!
//! Settings are read once at startup and never change afterwards. The
//! flag/env layer from the CLI sits above an optional config file, which
//! sits above the built-in defaults. Submodules provide the data model,
//! file parsing, and validation.

pub mod model;
pub mod sources;
pub mod validation;

use std::path::Path;

use crate::error::ProxyError;
use model::{ConfigLayer, Settings};

/// Stack `overrides` on top of the config file (explicit or auto-detected)
/// and validate the result.
pub async fn load(
    overrides: ConfigLayer,
    config_file: Option<&Path>,
) -> Result<(Settings, Option<String>), ProxyError> {
    let (file_layer, source) = match sources::resolve_file(config_file).await {
        Some(path) => (
            sources::load_file(&path).await?,
            Some(path.display().to_string()),
        ),
        None => (ConfigLayer::default(), None),
    };

    let settings = Settings::from(overrides.or(file_layer));
    validation::validate(&settings).map_err(|errors| ProxyError::ConfigValidation { errors })?;

    Ok((settings, source))
}
