// Route registration surface used by the bootstrap
use std::panic::{catch_unwind, AssertUnwindSafe};

use axum::{routing::any, Router};

use crate::proxy::error::RegistrationError;
use crate::proxy::handlers::{handle_endpoint, EndpointState};

/// Something that can bind a proxy handler to a route pattern.
pub trait RouteRegistrar {
    /// Register a handler answering every method on `pattern`.
    fn register_endpoint(
        &mut self,
        pattern: &str,
        state: EndpointState,
    ) -> Result<(), RegistrationError>;
}

/// axum-backed registrar. Patterns use axum path syntax (`/:param`, `/*rest`).
#[derive(Default)]
pub struct ProxyRouter {
    router: Router,
    patterns: Vec<String>,
}

impl ProxyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn into_router(self) -> Router {
        self.router
    }
}

impl From<Router> for ProxyRouter {
    fn from(router: Router) -> Self {
        Self {
            router,
            patterns: Vec::new(),
        }
    }
}

impl RouteRegistrar for ProxyRouter {
    fn register_endpoint(
        &mut self,
        pattern: &str,
        state: EndpointState,
    ) -> Result<(), RegistrationError> {
        validate_pattern(pattern)?;

        if self.patterns.iter().any(|p| p == pattern) {
            // axum cannot hold two handlers for one path; the first stays
            tracing::debug!("Endpoint {} already registered", pattern);
            return Ok(());
        }

        // axum panics on paths it cannot insert (e.g. conflicting parameters)
        let candidate = self.router.clone();
        let handler = any(handle_endpoint).with_state(state);
        let router = catch_unwind(AssertUnwindSafe(move || candidate.route(pattern, handler)))
            .map_err(|_| RegistrationError::Rejected(pattern.to_string()))?;

        self.router = router;
        self.patterns.push(pattern.to_string());
        Ok(())
    }
}

fn validate_pattern(pattern: &str) -> Result<(), RegistrationError> {
    if !pattern.starts_with('/') {
        return Err(invalid_pattern(pattern, "must start with '/'"));
    }

    let segments: Vec<&str> = pattern[1..].split('/').collect();
    let last = segments.len() - 1;
    for (idx, segment) in segments.iter().enumerate() {
        if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(invalid_pattern(pattern, "unnamed parameter"));
            }
        } else if let Some(name) = segment.strip_prefix('*') {
            if name.is_empty() {
                return Err(invalid_pattern(pattern, "unnamed wildcard"));
            }
            if idx != last {
                return Err(invalid_pattern(pattern, "wildcard must be the last segment"));
            }
        }
    }
    Ok(())
}

fn invalid_pattern(pattern: &str, reason: &'static str) -> RegistrationError {
    RegistrationError::InvalidPattern {
        pattern: pattern.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::common::RedirectMap;
    use crate::proxy::upstream::UpstreamClient;
    use std::sync::Arc;

    fn state() -> EndpointState {
        EndpointState {
            server_url: Arc::from("http://127.0.0.1:9"),
            upstream: Arc::new(UpstreamClient::new(None, 5).unwrap()),
            redirects: Arc::new(RedirectMap::payment_defaults()),
        }
    }

    #[test]
    fn test_validate_pattern() {
        assert!(validate_pattern("/pay/callback").is_ok());
        assert!(validate_pattern("/pay/:gateway/return").is_ok());
        assert!(validate_pattern("/hooks/*rest").is_ok());
        assert!(validate_pattern("pay").is_err());
        assert!(validate_pattern("/pay/:/x").is_err());
        assert!(validate_pattern("/*rest/tail").is_err());
        assert!(validate_pattern("/hooks/*").is_err());
    }

    #[test]
    fn test_register_and_dedupe() {
        let mut router = ProxyRouter::new();
        router.register_endpoint("/pay/callback", state()).unwrap();
        router.register_endpoint("/pay/callback", state()).unwrap();
        router.register_endpoint("/pay/:gateway/return", state()).unwrap();
        assert_eq!(router.patterns(), ["/pay/callback", "/pay/:gateway/return"]);
    }

    #[test]
    fn test_conflicting_pattern_is_rejected() {
        let mut router = ProxyRouter::new();
        router.register_endpoint("/pay/:id", state()).unwrap();
        assert_eq!(
            router.register_endpoint("/pay/:slug", state()),
            Err(RegistrationError::Rejected("/pay/:slug".to_string()))
        );
        // the router keeps what it had
        assert_eq!(router.patterns(), ["/pay/:id"]);
    }
}
