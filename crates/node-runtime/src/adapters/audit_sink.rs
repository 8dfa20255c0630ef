//! Audit alert sink

use async_trait::async_trait;
use shared_types::{AuditEvent, AuditEventSink};
use tokio::sync::broadcast;
use tracing::error;

/// Logs every alert and forwards it to subscribers.
///
/// Having no subscribers is not an error.
pub struct NodeAuditSink {
    sender: broadcast::Sender<AuditEvent>,
}

impl NodeAuditSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl AuditEventSink for NodeAuditSink {
    async fn emit(&self, event: AuditEvent) -> Result<(), String> {
        match &event {
            AuditEvent::IntegrityAlert {
                integrity_score,
                health,
                invalid_records,
                recommendations,
            } => error!(
                integrity_score,
                %health,
                invalid_records,
                first_recommendation = recommendations.first().map(String::as_str).unwrap_or(""),
                "Integrity alert"
            ),
            AuditEvent::ComplianceAlert {
                compliance_score,
                level,
                violations,
                ..
            } => error!(compliance_score, %level, violations, "Compliance alert"),
        }
        let _ = self.sender.send(event);
        Ok(())
    }
}
