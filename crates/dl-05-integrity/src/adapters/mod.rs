//! Adapters layer

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{AuditEvent, AuditEventSink};

/// Sink that keeps every emitted event in memory
#[derive(Default)]
pub struct InMemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.read().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}

#[async_trait]
impl AuditEventSink for InMemoryAuditSink {
    async fn emit(&self, event: AuditEvent) -> Result<(), String> {
        self.events.write().push(event);
        Ok(())
    }
}
