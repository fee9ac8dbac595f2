// Remote endpoint configuration published by the backend server
use serde::Deserialize;
use serde_json::Value;

use crate::proxy::error::RemoteConfigError;
use crate::proxy::upstream::UpstreamClient;

pub const CONFIG_PATH: &str = "/config";

/// Validated remote configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteConfigDocument {
    pub endpoints: Vec<String>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    endpoints: Option<Value>,
}

impl RemoteConfigDocument {
    /// Parse a config document, keeping only well-formed route patterns.
    ///
    /// A missing or non-array `endpoints` field yields no endpoints. Entries
    /// that are not strings or not absolute paths are dropped with a warning.
    pub fn from_slice(body: &[u8]) -> Result<Self, RemoteConfigError> {
        let raw: RawDocument = serde_json::from_slice(body)?;

        let endpoints = match raw.endpoints {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(pattern) if is_route_pattern(&pattern) => Some(pattern),
                    other => {
                        tracing::warn!("Ignoring malformed remote endpoint entry: {}", other);
                        None
                    }
                })
                .collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                tracing::warn!("Remote config \"endpoints\" is not a list: {}", other);
                Vec::new()
            }
        };

        Ok(Self { endpoints })
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

fn is_route_pattern(pattern: &str) -> bool {
    pattern.starts_with('/') && !pattern.chars().any(char::is_whitespace)
}

/// Fetch `/config` from the backend server.
pub async fn fetch_config(
    client: &UpstreamClient,
    server_url: &str,
) -> Result<RemoteConfigDocument, RemoteConfigError> {
    let config_url = UpstreamClient::resolve_target(server_url, CONFIG_PATH)?;
    tracing::debug!("Fetching remote config from {}", config_url);

    let response = client.get(config_url).await?;
    let status = response.status();
    if !status.is_success() {
        let status_text = response
            .extensions()
            .get::<hyper::ext::ReasonPhrase>()
            .map(|r| String::from_utf8_lossy(r.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        return Err(RemoteConfigError::Status {
            url: response.url().to_string(),
            status: status.as_u16(),
            status_text,
        });
    }

    let body = response.bytes().await?;
    RemoteConfigDocument::from_slice(&body)
}
