//! Settings validation with detailed error reporting.
//!
//! The upstream base is concatenated with each request path without any
//! normalization, so it must be an absolute `http`/`https` URL with no
//! query, fragment, or trailing slash.

use url::Url;

use super::model::Settings;
use crate::error::ValidationError;

/// Validate the upstream base URL. Returns `Ok(())` or a human-readable error.
pub fn validate_upstream(upstream: &str) -> Result<(), (String, Option<String>)> {
    let parsed =
        Url::parse(upstream).map_err(|_| (format!("'{upstream}' is not a valid URL"), None))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err((
            format!("unsupported scheme '{scheme}' (expected http or https)"),
            None,
        ));
    }
    if parsed.host_str().is_none() {
        return Err(("URL has no host".into(), None));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err((
            "URL must not carry a query or fragment".into(),
            Some("request paths are appended verbatim after the base".into()),
        ));
    }
    if upstream.ends_with('/') {
        let trimmed = upstream.trim_end_matches('/');
        return Err((
            "URL must not end with '/'".into(),
            Some(format!("did you mean '{trimmed}'?")),
        ));
    }
    Ok(())
}

pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err((message, suggestion)) = validate_upstream(&settings.upstream) {
        errors.push(ValidationError {
            field: "upstream".into(),
            message,
            suggestion,
        });
    }

    if settings.port == 0 {
        errors.push(ValidationError {
            field: "port".into(),
            message: "port must be non-zero".into(),
            suggestion: None,
        });
    }

    if settings.host.trim().is_empty() {
        errors.push(ValidationError {
            field: "host".into(),
            message: "host cannot be empty".into(),
            suggestion: Some("use '0.0.0.0' to listen on all interfaces".into()),
        });
    }

    if settings.max_body == 0 {
        errors.push(ValidationError {
            field: "max_body".into(),
            message: "max_body must be non-zero".into(),
            suggestion: None,
        });
    }

    if settings.timeout_ms == Some(0) {
        errors.push(ValidationError {
            field: "timeout_ms".into(),
            message: "timeout_ms must be non-zero when set".into(),
            suggestion: Some("omit it to disable the upstream timeout".into()),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Build a human-readable summary of valid settings.
#[must_use]
pub fn format_validation_report(source: &str, settings: &Settings) -> String {
    let timeout = settings
        .timeout_ms
        .map_or_else(|| "none".to_string(), |ms| format!("{ms} ms"));
    format!(
        "{source} is valid\n  \
         listen:   {}\n  \
         upstream: {}\n  \
         cookies:  {}\n  \
         max body: {} bytes\n  \
         timeout:  {timeout}",
        settings.listen_addr(),
        settings.upstream,
        settings.cookie_mode,
        settings.max_body,
    )
}
