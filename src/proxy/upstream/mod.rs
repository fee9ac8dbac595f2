// Upstream module - outbound HTTP to the backend server

pub mod client;

pub use client::{ProxyResult, UpstreamClient};
