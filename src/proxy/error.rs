// Typed errors for the proxy layer
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Failure to obtain the remote endpoint configuration.
#[derive(Debug, Error)]
pub enum RemoteConfigError {
    #[error("{url} - {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("invalid config url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid config document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failure to register an endpoint handler on the router.
#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
    #[error("router rejected route pattern {0:?}")]
    Rejected(String),
}

/// Failure of a single proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("cannot resolve target url: {0}")]
    TargetUrl(#[from] url::ParseError),
    #[error("failed to read request body: {0}")]
    RequestBody(String),
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("upstream response is not a redirect outcome: {0}")]
    Decode(String),
    #[error("invalid redirect location {0:?}")]
    InvalidLocation(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) | ProxyError::Decode(_) => StatusCode::BAD_GATEWAY,
            ProxyError::TargetUrl(_) | ProxyError::InvalidLocation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        tracing::error!("Proxied request failed: {}", self);
        (self.status(), self.to_string()).into_response()
    }
}
