// Structured URL configuration and its canonical string form
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PROTOCOL: &str = "http";

#[derive(Debug, Error, PartialEq)]
pub enum UrlConfigError {
    #[error("url config has no host")]
    MissingHost,
    #[error("invalid protocol: {0:?}")]
    InvalidProtocol(String),
    #[error("port out of range: {0}")]
    PortOutOfRange(i64),
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Location of a backend service.
///
/// Either `url` carries a complete, preformatted URL, or the remaining fields
/// describe it piece by piece.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default)]
    pub host: String,
    /// Signed so that a negative value in a config file surfaces as a
    /// configuration error instead of a parse failure of the whole file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl UrlConfig {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn format(&self) -> Result<String, UrlConfigError> {
        format_url(self)
    }
}

/// Format a [`UrlConfig`] into an absolute URL.
///
/// A preformatted `url` is returned verbatim once it is known to parse.
/// Otherwise the path is normalized: repeated separators collapse to one and
/// a trailing slash is kept only when the configured path has one.
pub fn format_url(config: &UrlConfig) -> Result<String, UrlConfigError> {
    if let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) {
        ensure_absolute(url)?;
        return Ok(url.to_string());
    }

    let protocol = match config.protocol.as_deref().map(str::trim) {
        None | Some("") => DEFAULT_PROTOCOL,
        Some(p) => p.trim_end_matches("//").trim_end_matches(':'),
    };
    if !is_valid_scheme(protocol) {
        return Err(UrlConfigError::InvalidProtocol(protocol.to_string()));
    }

    let host = config.host.trim();
    if host.is_empty() {
        return Err(UrlConfigError::MissingHost);
    }

    let port = match config.port {
        Some(port) if !(0..=u16::MAX as i64).contains(&port) => {
            return Err(UrlConfigError::PortOutOfRange(port));
        }
        Some(port) => format!(":{}", port),
        None => String::new(),
    };

    let path = config.path.as_deref().map(normalize_path).unwrap_or_default();

    let formatted = format!("{}://{}{}{}", protocol, host, port, path);
    ensure_absolute(&formatted)?;
    Ok(formatted)
}

fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }

    let mut normalized = format!("/{}", segments.join("/"));
    if path.ends_with('/') {
        normalized.push('/');
    }
    normalized
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn ensure_absolute(candidate: &str) -> Result<(), UrlConfigError> {
    match url::Url::parse(candidate) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        Ok(_) => Err(UrlConfigError::InvalidUrl {
            url: candidate.to_string(),
            reason: "missing host".to_string(),
        }),
        Err(e) => Err(UrlConfigError::InvalidUrl {
            url: candidate.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(protocol: Option<&str>, host: &str, port: Option<i64>, path: Option<&str>) -> UrlConfig {
        UrlConfig {
            url: None,
            protocol: protocol.map(str::to_string),
            host: host.to_string(),
            port,
            path: path.map(str::to_string),
        }
    }

    #[test]
    fn test_format_structured_url() {
        let cfg = config(Some("https"), "shop.example.com", Some(4000), Some("/graphql"));
        assert_eq!(format_url(&cfg).unwrap(), "https://shop.example.com:4000/graphql");

        let cfg = config(None, "localhost", None, None);
        assert_eq!(format_url(&cfg).unwrap(), "http://localhost");

        let cfg = config(Some("http:"), "localhost", Some(80), Some("api"));
        assert_eq!(format_url(&cfg).unwrap(), "http://localhost:80/api");
    }

    #[test]
    fn test_path_separators_collapse() {
        let cfg = config(None, "backend", Some(4000), Some("//api//v1///payments"));
        assert_eq!(format_url(&cfg).unwrap(), "http://backend:4000/api/v1/payments");

        // trailing slash survives only when configured
        let cfg = config(None, "backend", None, Some("/api/v1/"));
        assert_eq!(format_url(&cfg).unwrap(), "http://backend/api/v1/");

        let cfg = config(None, "backend", None, Some("/"));
        assert_eq!(format_url(&cfg).unwrap(), "http://backend/");
    }

    #[test]
    fn test_preformatted_url_is_verbatim() {
        let cfg = UrlConfig::from_url("http://localhost:4000/graphql");
        assert_eq!(format_url(&cfg).unwrap(), "http://localhost:4000/graphql");

        let cfg = UrlConfig::from_url("not a url");
        assert!(matches!(format_url(&cfg), Err(UrlConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_structural_errors() {
        let cfg = config(None, "localhost", Some(-1), None);
        assert_eq!(format_url(&cfg), Err(UrlConfigError::PortOutOfRange(-1)));

        let cfg = config(None, "localhost", Some(70000), None);
        assert_eq!(format_url(&cfg), Err(UrlConfigError::PortOutOfRange(70000)));

        let cfg = config(None, "  ", None, None);
        assert_eq!(format_url(&cfg), Err(UrlConfigError::MissingHost));

        let cfg = config(Some("1http"), "localhost", None, None);
        assert!(matches!(format_url(&cfg), Err(UrlConfigError::InvalidProtocol(_))));
    }

    #[test]
    fn test_deserialize_from_json() {
        let cfg: UrlConfig =
            serde_json::from_str(r#"{"protocol":"https","host":"api.shop","port":443}"#).unwrap();
        assert_eq!(cfg.format().unwrap(), "https://api.shop:443");
    }
}
