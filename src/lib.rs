//! Storefront-side endpoint proxy.
//!
//! At startup the storefront asks its backend server which endpoints should
//! be proxied, registers a handler for each, and turns the backend's
//! `{ type, result }` answers into browser redirects.

pub mod modules;
pub mod proxy;
