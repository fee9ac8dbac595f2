// Upstream client implementation
// Forwards storefront requests to the backend server

use bytes::Bytes;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Duration;
use url::Url;

use crate::proxy::config::UpstreamProxyConfig;
use crate::proxy::error::ProxyError;

const USER_AGENT: &str = concat!("storefront-proxy/", env!("CARGO_PKG_VERSION"));

pub struct UpstreamClient {
    http_client: Client,
    // Follows redirects; used for the one-time config fetch only
    config_client: Client,
}

impl UpstreamClient {
    pub fn new(
        proxy_config: Option<&UpstreamProxyConfig>,
        request_timeout: u64,
    ) -> Result<Self, reqwest::Error> {
        let proxy = match proxy_config {
            Some(config) if config.enabled && !config.url.is_empty() => {
                match reqwest::Proxy::all(&config.url) {
                    Ok(proxy) => {
                        tracing::info!("UpstreamClient enabled proxy: {}", config.url);
                        Some(proxy)
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring invalid upstream proxy {}: {}", config.url, e);
                        None
                    }
                }
            }
            _ => None,
        };

        let http_client = client_builder(proxy.clone(), request_timeout)
            // Backend redirects must reach the resolver untouched
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        let config_client = client_builder(proxy, request_timeout).build()?;

        Ok(Self {
            http_client,
            config_client,
        })
    }

    /// Resolve an absolute inbound path (query included) against the server URL.
    ///
    /// Follows URL reference resolution: the path replaces the server URL's path.
    pub fn resolve_target(server_url: &str, path_and_query: &str) -> Result<Url, url::ParseError> {
        Url::parse(server_url)?.join(path_and_query)
    }

    /// Plain GET following redirects, used for the one-time remote config fetch
    pub async fn get(&self, url: Url) -> Result<Response, reqwest::Error> {
        self.config_client.get(url).send().await
    }

    /// Forward a request to `target` and hand back the raw upstream response.
    ///
    /// Never retries; timeouts come from the client configuration.
    pub async fn forward(
        &self,
        target: Url,
        method: Method,
        headers: &header::HeaderMap,
        body: Bytes,
    ) -> Result<ProxyResult, ProxyError> {
        tracing::debug!("Forwarding {} {}", method, target);

        let carries_body = method_carries_body(&method);
        let mut request = self
            .http_client
            .request(method, target)
            .headers(forwardable_headers(headers));

        if carries_body {
            request = request.body(body);
        }

        let response = request.send().await?;
        tracing::debug!(
            "Upstream responded {} for {}",
            response.status(),
            response.url()
        );
        Ok(ProxyResult { response })
    }
}

fn client_builder(proxy: Option<reqwest::Proxy>, request_timeout: u64) -> reqwest::ClientBuilder {
    let builder = Client::builder()
        .connect_timeout(Duration::from_secs(20))
        .pool_max_idle_per_host(16)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(Duration::from_secs(request_timeout))
        .user_agent(USER_AGENT);

    match proxy {
        Some(proxy) => builder.proxy(proxy),
        None => builder.no_proxy(),
    }
}

/// Raw upstream response of a proxied request
pub struct ProxyResult {
    response: Response,
}

impl ProxyResult {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Reason phrase sent by the backend, or the canonical one for the status.
    pub fn status_text(&self) -> String {
        if let Some(reason) = self.response.extensions().get::<hyper::ext::ReasonPhrase>() {
            return String::from_utf8_lossy(reason.as_bytes()).into_owned();
        }
        self.status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string()
    }

    /// Decode the body as JSON. Consumes the response.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, ProxyError> {
        let bytes = self.response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ProxyError::Decode(e.to_string()))
    }
}

impl From<Response> for ProxyResult {
    fn from(response: Response) -> Self {
        Self { response }
    }
}

fn method_carries_body(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn forwardable_headers(headers: &header::HeaderMap) -> header::HeaderMap {
    let mut forwarded = header::HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        if !is_hop_by_hop(name) && name != header::HOST && name != header::CONTENT_LENGTH {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

fn is_hop_by_hop(name: &header::HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
