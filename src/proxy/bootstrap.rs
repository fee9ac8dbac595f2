//! One-time startup wiring of proxied endpoints.
//!
//! The bootstrap asks the backend server which routes it wants proxied
//! (`GET <server>/config`) and registers a proxy handler for each of them.
//! Nothing here is fatal: every failure is logged, reported through the
//! returned [`BootstrapOutcome`], and leaves the storefront running without
//! the affected routes.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::modules::events::{EndpointEvent, EventBus};
use crate::proxy::common::RedirectMap;
use crate::proxy::error::RegistrationError;
use crate::proxy::handlers::EndpointState;
use crate::proxy::remote_config::fetch_config;
use crate::proxy::router::RouteRegistrar;
use crate::proxy::upstream::UpstreamClient;

#[derive(Debug, PartialEq)]
pub enum BootstrapOutcome {
    MissingRouter,
    MissingServerUrl,
    RemoteConfigFailed { message: String },
    NoEndpoints,
    Registered { patterns: Vec<String> },
    /// Registration stopped at the first failure; `registered` holds what
    /// was bound before it.
    RegistrationFailed {
        registered: Vec<String>,
        error: RegistrationError,
    },
}

pub struct Bootstrap {
    upstream: Arc<UpstreamClient>,
    events: EventBus,
}

impl Bootstrap {
    pub fn new(upstream: Arc<UpstreamClient>, events: EventBus) -> Self {
        Self { upstream, events }
    }

    /// Fetch the remote endpoint list and register a handler per endpoint.
    pub async fn run<R: RouteRegistrar + ?Sized>(
        &self,
        router: Option<&mut R>,
        server_url: Option<&str>,
        redirects: Arc<RedirectMap>,
    ) -> BootstrapOutcome {
        let Some(router) = router else {
            error!("\"router\" must be passed to the storefront bootstrap");
            return BootstrapOutcome::MissingRouter;
        };

        let Some(server_url) = server_url.filter(|url| !url.is_empty()) else {
            warn!("\"server_url\" must be passed to the storefront bootstrap");
            return BootstrapOutcome::MissingServerUrl;
        };

        let document = match fetch_config(&self.upstream, server_url).await {
            Ok(document) => document,
            Err(e) => {
                let message = e.to_string();
                warn!("Failed to process remote config from backend server: {}", message);
                self.events.emit(EndpointEvent::RemoteConfigFailed {
                    message: message.clone(),
                });
                return BootstrapOutcome::RemoteConfigFailed { message };
            }
        };

        self.events.emit(EndpointEvent::RemoteConfigLoaded {
            endpoints: document.endpoints.clone(),
        });

        self.handle_endpoints(router, server_url, &document.endpoints, redirects)
    }

    /// Register a proxy handler for every pattern, in order.
    ///
    /// The first registration error aborts the rest of the batch; handlers
    /// registered before it stay in place.
    pub fn handle_endpoints<R: RouteRegistrar + ?Sized>(
        &self,
        router: &mut R,
        server_url: &str,
        endpoints: &[String],
        redirects: Arc<RedirectMap>,
    ) -> BootstrapOutcome {
        if endpoints.is_empty() {
            return BootstrapOutcome::NoEndpoints;
        }

        debug!("Adding endpoints for proxying: {:?}", endpoints);

        let state = EndpointState {
            server_url: Arc::from(server_url),
            upstream: self.upstream.clone(),
            redirects,
        };

        let mut registered = Vec::with_capacity(endpoints.len());
        for pattern in endpoints {
            if let Err(e) = router.register_endpoint(pattern, state.clone()) {
                error!("Failed to handle remote endpoints: {}", e);
                return BootstrapOutcome::RegistrationFailed {
                    registered,
                    error: e,
                };
            }
            self.events.emit(EndpointEvent::EndpointRegistered {
                pattern: pattern.clone(),
            });
            registered.push(pattern.clone());
        }

        info!("Proxying {} endpoint(s) to {}", registered.len(), server_url);
        BootstrapOutcome::Registered {
            patterns: registered,
        }
    }
}
