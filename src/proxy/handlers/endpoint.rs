// Proxy handler for endpoints discovered at bootstrap
use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::ext::ReasonPhrase;
use serde::Deserialize;

use crate::proxy::common::RedirectMap;
use crate::proxy::error::ProxyError;
use crate::proxy::upstream::{ProxyResult, UpstreamClient};

const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Read-only state shared by every proxied endpoint
#[derive(Clone)]
pub struct EndpointState {
    pub server_url: Arc<str>,
    pub upstream: Arc<UpstreamClient>,
    pub redirects: Arc<RedirectMap>,
}

/// Outcome reported by the backend for a gateway callback
#[derive(Debug, Deserialize)]
struct RedirectOutcome {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

/// Forward the request to the backend server, then turn its answer into
/// either a redirect or a bare 404.
pub async fn handle_endpoint(
    State(state): State<EndpointState>,
    request: Request,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();

    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or(&parts.uri);
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let target = UpstreamClient::resolve_target(&state.server_url, path_and_query)?;

    let body = axum::body::to_bytes(body, MAX_BODY_SIZE)
        .await
        .map_err(|e| ProxyError::RequestBody(e.to_string()))?;

    let proxy_result = state
        .upstream
        .forward(target, parts.method, &parts.headers, body)
        .await?;

    resolve_redirect(proxy_result, &state.redirects).await
}

/// Map a proxied response onto the client-visible response.
pub async fn resolve_redirect(
    proxy_result: ProxyResult,
    redirects: &RedirectMap,
) -> Result<Response, ProxyError> {
    if proxy_result.status() == StatusCode::NOT_FOUND {
        // The backend's not-found body never reaches the client
        return Ok(not_found(proxy_result.status_text()));
    }

    let outcome: RedirectOutcome = proxy_result.json().await?;
    let location = redirects.resolve(outcome.kind.as_deref(), outcome.result.as_deref());
    tracing::debug!(
        "Redirecting outcome {:?}/{:?} to {}",
        outcome.kind,
        outcome.result,
        location
    );

    let location_value = HeaderValue::from_str(location)
        .map_err(|_| ProxyError::InvalidLocation(location.to_string()))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location_value)]).into_response())
}

fn not_found(status_text: String) -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    match ReasonPhrase::try_from(status_text) {
        Ok(reason) => {
            response.extensions_mut().insert(reason);
        }
        Err(e) => tracing::debug!("Dropping backend status text: {}", e),
    }
    response
}
