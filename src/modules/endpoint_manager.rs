//! Backend integrations that expose HTTP endpoints for proxying.
//!
//! Every integration implements [`EndpointManager`] on top of an
//! [`EndpointManagerBase`], which owns the shared construction state. The
//! [`EndpointRegistry`] keeps integrations in registration order and
//! aggregates their entries for the bootstrap.

use serde::Serialize;
use serde_json::{Map, Value};

use super::events::{EndpointEvent, EventBus};
use crate::proxy::common::{format_url, UrlConfig, UrlConfigError};
use crate::proxy::config::LocalEndpointConfig;

/// A route pattern an integration wants proxied, plus free-form metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointEntry {
    pub route: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl EndpointEntry {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

pub struct EndpointManagerParams {
    pub config: UrlConfig,
    pub name: Option<String>,
    pub entries: Vec<String>,
    pub events: EventBus,
}

/// State shared by all integrations. `base_url` is computed once here.
#[derive(Debug, Clone)]
pub struct EndpointManagerBase {
    name: String,
    base_url: String,
    entries: Vec<String>,
}

impl EndpointManagerBase {
    /// Build the shared state for integration type `T`; `T`'s name is used
    /// when `params.name` is absent.
    pub fn new<T: ?Sized>(params: EndpointManagerParams) -> Result<Self, UrlConfigError> {
        let base_url = format_url(&params.config)?;
        let name = params
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| short_type_name::<T>().to_string());

        params.events.emit(EndpointEvent::ManagerReady {
            name: name.clone(),
            base_url: base_url.clone(),
        });

        Ok(Self {
            name,
            base_url,
            entries: params.entries,
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

pub trait EndpointManager: Send + Sync {
    fn base(&self) -> &EndpointManagerBase;

    fn name(&self) -> &str {
        &self.base().name
    }

    fn base_url(&self) -> &str {
        &self.base().base_url
    }

    /// Endpoints this integration wants proxied. Proxies nothing by default.
    fn get_entries(&self) -> Vec<EndpointEntry> {
        Vec::new()
    }
}

/// Integration declared in the config file: proxies its configured entries.
pub struct StaticEndpointManager {
    base: EndpointManagerBase,
}

impl StaticEndpointManager {
    pub fn new(params: EndpointManagerParams) -> Result<Self, UrlConfigError> {
        Ok(Self {
            base: EndpointManagerBase::new::<Self>(params)?,
        })
    }
}

impl EndpointManager for StaticEndpointManager {
    fn base(&self) -> &EndpointManagerBase {
        &self.base
    }

    fn get_entries(&self) -> Vec<EndpointEntry> {
        self.base
            .entries()
            .iter()
            .map(|route| {
                EndpointEntry::new(route.as_str())
                    .with_meta("manager", self.name())
                    .with_meta("baseUrl", self.base_url())
            })
            .collect()
    }
}

#[derive(Default)]
pub struct EndpointRegistry {
    managers: Vec<Box<dyn EndpointManager>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        configs: &[LocalEndpointConfig],
        events: &EventBus,
    ) -> Result<Self, UrlConfigError> {
        let mut registry = Self::new();
        for cfg in configs {
            let manager = StaticEndpointManager::new(EndpointManagerParams {
                config: cfg.config.clone(),
                name: cfg.name.clone(),
                entries: cfg.entries.clone(),
                events: events.clone(),
            })?;
            registry.register(Box::new(manager));
        }
        Ok(registry)
    }

    pub fn register(&mut self, manager: Box<dyn EndpointManager>) {
        tracing::debug!(
            "Registered endpoint manager {} ({})",
            manager.name(),
            manager.base_url()
        );
        self.managers.push(manager);
    }

    /// Entries of every manager, in registration order
    pub fn entries(&self) -> Vec<EndpointEntry> {
        self.managers.iter().flat_map(|m| m.get_entries()).collect()
    }

    pub fn routes(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.route).collect()
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
