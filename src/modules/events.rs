//! Lifecycle notifications for endpoint managers and the bootstrap.
//!
//! The bus is an explicit handle passed to whoever needs it. Emitting with no
//! subscriber is not an error.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum EndpointEvent {
    /// A backend integration finished construction
    ManagerReady { name: String, base_url: String },
    /// The backend server published its endpoint list
    RemoteConfigLoaded { endpoints: Vec<String> },
    /// The remote endpoint list could not be obtained
    RemoteConfigFailed { message: String },
    /// A proxy handler is now registered for `pattern`
    EndpointRegistered { pattern: String },
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EndpointEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, event: EndpointEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Endpoint event dropped: no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EndpointEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
