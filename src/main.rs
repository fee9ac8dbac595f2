use std::sync::Arc;

use storefront_proxy::modules::{self, EndpointRegistry, EventBus};
use storefront_proxy::proxy::{self, Bootstrap, ProxyRouter, UpstreamClient, UrlConfig};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), String> {
    modules::logger::init_logger();

    let mut proxy_config = match modules::config::load_proxy_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!("failed to load proxy config: {}. using defaults", err);
            proxy::ProxyConfig::default()
        }
    };

    if let Ok(value) = std::env::var("STOREFRONT_PROXY_ALLOW_LAN") {
        if matches!(value.as_str(), "1" | "true" | "yes" | "on") {
            proxy_config.allow_lan_access = true;
        }
    }

    if let Ok(value) = std::env::var("STOREFRONT_PROXY_PORT") {
        match value.parse() {
            Ok(port) => proxy_config.port = port,
            Err(e) => tracing::warn!("ignoring STOREFRONT_PROXY_PORT={}: {}", value, e),
        }
    }

    if let Ok(url) = std::env::var("STOREFRONT_SERVER_URL") {
        proxy_config.server = Some(UrlConfig::from_url(url));
    }

    let bind_address = if let Ok(addr) = std::env::var("STOREFRONT_PROXY_BIND") {
        if addr != "127.0.0.1" && addr != "localhost" {
            proxy_config.allow_lan_access = true;
        }
        addr
    } else {
        proxy_config.get_bind_address().to_string()
    };

    let server_url = match proxy_config.server.as_ref().map(UrlConfig::format).transpose() {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("invalid backend server url: {}", e);
            None
        }
    };

    let events = EventBus::new();
    let mut event_rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => tracing::debug!(?event, "endpoint event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("endpoint event log skipped {} events", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let registry = match EndpointRegistry::from_config(&proxy_config.endpoints, &events) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::warn!("ignoring local endpoint managers: {}", e);
            EndpointRegistry::new()
        }
    };

    let upstream = Arc::new(
        UpstreamClient::new(Some(&proxy_config.upstream_proxy), proxy_config.request_timeout)
            .map_err(|e| format!("failed to create HTTP client: {}", e))?,
    );
    let redirects = Arc::new(proxy_config.redirects.clone());
    let bootstrap = Bootstrap::new(upstream, events.clone());

    let mut router = ProxyRouter::new();
    let outcome = bootstrap
        .run(Some(&mut router), server_url.as_deref(), redirects.clone())
        .await;
    tracing::debug!(?outcome, "remote endpoint bootstrap finished");

    if let Some(url) = server_url.as_deref() {
        let local_routes = registry.routes();
        if !local_routes.is_empty() {
            let outcome = bootstrap.handle_endpoints(&mut router, url, &local_routes, redirects);
            tracing::debug!(?outcome, "local endpoint registration finished");
        }
    }

    tracing::info!("proxying {} endpoint(s)", router.patterns().len());

    let (server, handle) = proxy::AxumServer::start(
        bind_address.clone(),
        proxy_config.port,
        router.into_router(),
    )
    .await
    .map_err(|e| format!("failed to start storefront proxy: {}", e))?;

    tracing::info!(
        "storefront-proxy listening on http://{}:{}",
        bind_address,
        proxy_config.port
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to listen for shutdown signal: {}", e))?;

    tracing::info!("shutdown requested, stopping server...");
    server.stop();
    let _ = handle.await;

    Ok(())
}
