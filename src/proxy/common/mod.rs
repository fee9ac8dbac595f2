// Common utilities shared by the bootstrap and request handlers

pub mod redirect_map;
pub mod url_format;

pub use redirect_map::RedirectMap;
pub use url_format::{format_url, UrlConfig, UrlConfigError};
