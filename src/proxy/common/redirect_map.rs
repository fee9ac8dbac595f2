// Outcome type / result code -> client path lookup
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_REDIRECT: &str = "/";

/// Two-level redirect table: outcome `type` -> outcome `result` -> path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RedirectMap(HashMap<String, HashMap<String, String>>);

impl RedirectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: &str, result: &str, path: &str) {
        self.0
            .entry(kind.to_string())
            .or_default()
            .insert(result.to_string(), path.to_string());
    }

    pub fn with(mut self, kind: &str, result: &str, path: &str) -> Self {
        self.insert(kind, result, path);
        self
    }

    /// Redirects used by the storefront checkout.
    pub fn payment_defaults() -> Self {
        Self::new()
            .with("payment", "success", "/checkout/confirmation")
            .with("payment", "failure", "/checkout/failure")
            .with("payment", "cancel", "/cart")
    }

    /// Resolve a redirect target.
    ///
    /// An unknown `kind` behaves like an empty table; an unknown or absent
    /// `result` resolves to `/`.
    pub fn resolve(&self, kind: Option<&str>, result: Option<&str>) -> &str {
        let table = kind.and_then(|k| self.0.get(k));
        table
            .zip(result)
            .and_then(|(table, result)| table.get(result))
            .map(String::as_str)
            .unwrap_or(DEFAULT_REDIRECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_outcome() {
        let map = RedirectMap::payment_defaults();
        assert_eq!(map.resolve(Some("payment"), Some("success")), "/checkout/confirmation");
        assert_eq!(map.resolve(Some("payment"), Some("failure")), "/checkout/failure");
        assert_eq!(map.resolve(Some("payment"), Some("cancel")), "/cart");
    }

    #[test]
    fn test_resolve_falls_back_to_root() {
        let map = RedirectMap::payment_defaults();
        assert_eq!(map.resolve(Some("payment"), Some("unknown-code")), "/");
        assert_eq!(map.resolve(Some("refund"), Some("success")), "/");
        assert_eq!(map.resolve(None, Some("success")), "/");
        assert_eq!(map.resolve(Some("payment"), None), "/");
        assert_eq!(RedirectMap::new().resolve(Some("payment"), Some("success")), "/");
    }

    #[test]
    fn test_deserialize_nested_mapping() {
        let map: RedirectMap = serde_json::from_str(
            r#"{"payment":{"success":"/checkout/confirmation","cancel":"/cart"}}"#,
        )
        .unwrap();
        assert_eq!(map.resolve(Some("payment"), Some("cancel")), "/cart");
        assert_eq!(map.resolve(Some("payment"), Some("failure")), "/");
    }
}
