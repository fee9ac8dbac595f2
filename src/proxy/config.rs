use serde::{Deserialize, Serialize};

use crate::proxy::common::{RedirectMap, UrlConfig};

/// Storefront proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Whether to accept connections from the local network
    /// - false: bind 127.0.0.1 (default)
    /// - true: bind 0.0.0.0
    #[serde(default)]
    pub allow_lan_access: bool,

    /// Listening port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Backend server that publishes `/config` and receives proxied requests
    #[serde(default)]
    pub server: Option<UrlConfig>,

    /// Outcome type -> outcome result -> client path
    #[serde(default = "RedirectMap::payment_defaults")]
    pub redirects: RedirectMap,

    /// Upstream request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Outbound proxy for backend traffic
    #[serde(default)]
    pub upstream_proxy: UpstreamProxyConfig,

    /// Endpoints declared locally, registered after the remote ones
    #[serde(default)]
    pub endpoints: Vec<LocalEndpointConfig>,
}

/// Upstream proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpstreamProxyConfig {
    pub enabled: bool,
    /// Proxy address (http://, https://, socks5://)
    pub url: String,
}

/// A locally declared backend integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalEndpointConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub config: UrlConfig,
    #[serde(default)]
    pub entries: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            allow_lan_access: false,
            port: default_port(),
            server: Some(UrlConfig::from_url("http://localhost:4000/graphql")),
            redirects: RedirectMap::payment_defaults(),
            request_timeout: default_request_timeout(),
            upstream_proxy: UpstreamProxyConfig::default(),
            endpoints: Vec::new(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    120
}

impl ProxyConfig {
    pub fn get_bind_address(&self) -> &str {
        if self.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        }
    }
}
