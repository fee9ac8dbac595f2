// proxy module - storefront endpoint proxy

pub mod bootstrap;
pub mod common;
pub mod config;
pub mod error;
pub mod handlers;
pub mod remote_config;
pub mod router;
pub mod server;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;

pub use bootstrap::{Bootstrap, BootstrapOutcome};
pub use common::{RedirectMap, UrlConfig};
pub use config::ProxyConfig;
pub use router::{ProxyRouter, RouteRegistrar};
pub use server::AxumServer;
pub use upstream::UpstreamClient;
