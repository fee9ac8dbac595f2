pub mod config;
pub mod endpoint_manager;
pub mod events;
pub mod logger;

pub use endpoint_manager::{
    EndpointEntry, EndpointManager, EndpointManagerBase, EndpointManagerParams, EndpointRegistry,
    StaticEndpointManager,
};
pub use events::{EndpointEvent, EventBus};
