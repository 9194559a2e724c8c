//! `passthru validate`: check a configuration file for errors.
//!
//! Parses the file, fills unset fields with defaults, validates the
//! result, and reports in either human-readable text or JSON.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::model::Settings;
use crate::config::sources::parse_config_str;
use crate::config::validation;
use crate::error::ProxyError;

pub fn execute(args: &ValidateArgs) -> Result<(), ProxyError> {
    let path = &args.config;

    if !path.exists() {
        return Err(ProxyError::ConfigFileNotFound { path: path.clone() });
    }

    let content = std::fs::read_to_string(path)?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let layer = parse_config_str(ext, &content, &path.display().to_string())?;
    let settings = Settings::from(layer);

    if let Err(errors) = validation::validate(&settings) {
        match args.format {
            ValidateFormat::Text => {
                eprintln!("\u{2717} {} has {} errors\n", path.display(), errors.len());
                for error in &errors {
                    eprintln!("{error}");
                }
            }
            ValidateFormat::Json => {
                let json_errors: Vec<serde_json::Value> = errors
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "field": e.field,
                            "message": e.message,
                            "suggestion": e.suggestion,
                        })
                    })
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "valid": false,
                        "errors": json_errors,
                    })
                );
            }
        }
        return Err(ProxyError::ConfigValidation { errors });
    }

    match args.format {
        ValidateFormat::Text => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path.display().to_string(), &settings)
            );
        }
        ValidateFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "listen": settings.listen_addr(),
                    "upstream": settings.upstream,
                    "cookie_mode": settings.cookie_mode,
                    "max_body": settings.max_body,
                    "timeout_ms": settings.timeout_ms,
                })
            );
        }
    }

    Ok(())
}
