use async_trait::async_trait;
use tracing::{info, warn};

use crate::app::ports::NotificationPort;
use crate::domain::{AiInsight, ContainerStatus, Priority};
use crate::error::Result;

/// Delivers notifications as structured log events.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationPort for TracingNotifier {
    async fn send_alert(&self, message: &str, priority: Priority, recipients: &[String]) -> Result<()> {
        match priority {
            Priority::High | Priority::Critical => {
                warn!(target: "notifications", %priority, recipients = ?recipients, "{}", message)
            }
            _ => info!(target: "notifications", %priority, recipients = ?recipients, "{}", message),
        }
        Ok(())
    }

    async fn send_status_update(&self, container_id: &str, status: ContainerStatus) -> Result<()> {
        info!(target: "notifications", container_id, %status, "Container status changed");
        Ok(())
    }

    async fn send_insight(&self, insight: &AiInsight) -> Result<()> {
        info!(
            target: "notifications",
            id = insight.insight_id(),
            category = %insight.category(),
            confidence = insight.confidence(),
            impact = %insight.impact_level(),
            "{}",
            insight.title()
        );
        Ok(())
    }
}
