//! Event publisher adapter

use crate::events::ConsensusEvent;
use crate::ports::ConsensusEventPublisher;
use async_trait::async_trait;
use parking_lot::RwLock;

/// In-memory publisher that records every event
#[derive(Default)]
pub struct InMemoryEventPublisher {
    events: RwLock<Vec<ConsensusEvent>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_events(&self) -> Vec<ConsensusEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

#[async_trait]
impl ConsensusEventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: ConsensusEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}

/// Publisher forwarding into a tokio broadcast channel
///
/// Having no subscribers is not an error.
pub struct BroadcastEventPublisher {
    sender: tokio::sync::broadcast::Sender<ConsensusEvent>,
}

impl BroadcastEventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ConsensusEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl ConsensusEventPublisher for BroadcastEventPublisher {
    async fn publish(&self, event: ConsensusEvent) -> Result<(), String> {
        let _ = self.sender.send(event);
        Ok(())
    }
}
