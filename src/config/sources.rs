//! File-based config loading.
//!
//! YAML is always available behind the default `yaml` feature; JSON and
//! TOML are enabled by the `json` and `toml` features. [`parse_config_str`]
//! picks the deserializer from the file extension.

use std::path::{Path, PathBuf};

use crate::config::model::ConfigLayer;
use crate::error::ProxyError;

/// File names probed in the working directory when no `--config` is given.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "passthru.yaml",
    "passthru.yml",
    "passthru.json",
    "passthru.toml",
];

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<ConfigLayer, ProxyError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| ProxyError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(ProxyError::UnsupportedFormat(other.to_string())),
    }
}

/// Read and parse one config file.
pub async fn load_file(path: &Path) -> Result<ConfigLayer, ProxyError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ProxyError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ProxyError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Use the explicit path if given, otherwise the first auto-detected
/// candidate in the current directory.
pub async fn resolve_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return Some(path);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::cookies::CookieMode;

    #[cfg(feature = "yaml")]
    #[test]
    fn parses_yaml_layer() {
        let content = "upstream: http://backend:4000\nport: 8081\ncookie_mode: native\n";
        let layer = parse_config_str("yaml", content, "passthru.yaml").unwrap();
        assert_eq!(layer.upstream.as_deref(), Some("http://backend:4000"));
        assert_eq!(layer.port, Some(8081));
        assert_eq!(layer.cookie_mode, Some(CookieMode::Native));
        assert!(layer.host.is_none());
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn rejects_unknown_fields() {
        let err = parse_config_str("yaml", "routes: []\n", "passthru.yaml").unwrap_err();
        assert!(matches!(err, ProxyError::ConfigParse { .. }));
    }

    #[cfg(feature = "json")]
    #[test]
    fn parses_json_layer() {
        let content = r#"{"upstream":"https://api.example.com","timeout_ms":2500}"#;
        let layer = parse_config_str("json", content, "passthru.json").unwrap();
        assert_eq!(layer.upstream.as_deref(), Some("https://api.example.com"));
        assert_eq!(layer.timeout_ms, Some(2500));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parses_toml_layer() {
        let content = "upstream = \"https://api.example.com\"\ncookie_mode = \"coalesced\"\n";
        let layer = parse_config_str("toml", content, "passthru.toml").unwrap();
        assert_eq!(layer.cookie_mode, Some(CookieMode::Coalesced));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = parse_config_str("ini", "", "passthru.ini").unwrap_err();
        assert!(matches!(err, ProxyError::UnsupportedFormat(ref ext) if ext == "ini"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = load_file(Path::new("/nonexistent/passthru.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::ConfigFileNotFound { .. }));
    }
}
