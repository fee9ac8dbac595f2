// Handlers module - request handlers for proxied endpoints

pub mod endpoint;

pub use endpoint::{handle_endpoint, resolve_redirect, EndpointState};
