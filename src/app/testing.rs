//! Fakes for service tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::app::ports::{ContainerRepository, InsightPort, NotificationPort, PortOverview, WeatherSnapshot};
use crate::app::ContainerTrackingService;
use crate::domain::ship::tests::draft as ship_draft;
use crate::domain::{
    AiInsight, Container, ContainerStatus, ImpactLevel, InsightCategory, InsightDraft, PortOperation,
    Priority, Ship,
};
use crate::error::{Result, TrackerError};
use crate::infra::{InMemoryOperations, InMemoryRepository};

/// Insight port that answers every call with the same confidence and records
/// what it was asked about.
pub struct FakeInsights {
    confidence: f64,
    crane_calls: AtomicUsize,
    last_crane_batch: Mutex<Vec<String>>,
    last_operation_batch: Mutex<Vec<String>>,
}

impl FakeInsights {
    pub fn new(confidence: f64) -> Self {
        Self {
            confidence,
            crane_calls: AtomicUsize::new(0),
            last_crane_batch: Mutex::new(vec![]),
            last_operation_batch: Mutex::new(vec![]),
        }
    }

    pub fn crane_calls(&self) -> usize {
        self.crane_calls.load(Ordering::SeqCst)
    }

    pub fn last_crane_batch(&self) -> Vec<String> {
        self.last_crane_batch.lock().unwrap().clone()
    }

    pub fn last_operation_batch(&self) -> Vec<String> {
        self.last_operation_batch.lock().unwrap().clone()
    }

    fn insight(&self, tag: &str, related: Vec<String>) -> AiInsight {
        InsightDraft {
            insight_id: format!("{}_test", tag),
            category: InsightCategory::Recommendation,
            title: tag.to_string(),
            description: String::new(),
            confidence: self.confidence,
            impact_level: ImpactLevel::Medium,
            generated_at: Utc::now(),
            related_containers: related,
        }
        .build()
        .unwrap()
    }
}

#[async_trait]
impl InsightPort for FakeInsights {
    async fn predict_port_congestion(&self, _overview: &PortOverview) -> AiInsight {
        self.insight("congestion", vec![])
    }

    async fn recommend_crane_allocation(&self, containers: &[Container]) -> AiInsight {
        self.crane_calls.fetch_add(1, Ordering::SeqCst);
        let ids: Vec<String> = containers.iter().map(|c| c.container_id.clone()).collect();
        *self.last_crane_batch.lock().unwrap() = ids.clone();
        self.insight("crane", ids)
    }

    async fn analyze_cargo_patterns(&self, _containers: &[Container]) -> AiInsight {
        self.insight("cargo", vec![])
    }

    async fn generate_efficiency_insights(&self, operations: &[PortOperation]) -> AiInsight {
        *self.last_operation_batch.lock().unwrap() =
            operations.iter().map(|op| op.container_id.clone()).collect();
        self.insight("efficiency", vec![])
    }

    async fn predict_delays(&self, ship: &Ship, _weather: &WeatherSnapshot) -> AiInsight {
        self.insight("delays", vec![ship.ship_id.clone()])
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    alerts: Mutex<Vec<(String, Priority, Vec<String>)>>,
    status_updates: Mutex<Vec<(String, ContainerStatus)>>,
    insights_sent: AtomicUsize,
    fail_next: AtomicBool,
}

impl RecordingNotifier {
    pub fn alerts(&self) -> Vec<(String, Priority, Vec<String>)> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn status_updates(&self) -> Vec<(String, ContainerStatus)> {
        self.status_updates.lock().unwrap().clone()
    }

    pub fn insights_sent(&self) -> usize {
        self.insights_sent.load(Ordering::SeqCst)
    }

    /// Make the next notification fail
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            Err(TrackerError::Api {
                message: "notification channel down".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn send_alert(&self, message: &str, priority: Priority, recipients: &[String]) -> Result<()> {
        self.check()?;
        self.alerts
            .lock()
            .unwrap()
            .push((message.to_string(), priority, recipients.to_vec()));
        Ok(())
    }

    async fn send_status_update(&self, container_id: &str, status: ContainerStatus) -> Result<()> {
        self.check()?;
        self.status_updates
            .lock()
            .unwrap()
            .push((container_id.to_string(), status));
        Ok(())
    }

    async fn send_insight(&self, _insight: &AiInsight) -> Result<()> {
        self.check()?;
        self.insights_sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct Fixture {
    pub service: ContainerTrackingService,
    pub repo: Arc<InMemoryRepository>,
    pub insights: Arc<FakeInsights>,
    pub notifier: Arc<RecordingNotifier>,
    pub operations: Arc<InMemoryOperations>,
}

impl Fixture {
    pub async fn repo_container(&self, container_id: &str) -> Container {
        ContainerRepository::get_by_id(self.repo.as_ref(), container_id)
            .await
            .unwrap()
    }

    pub async fn repo_len(&self) -> usize {
        ContainerRepository::list_all(self.repo.as_ref()).await.len()
    }
}

/// Tracking service over in-memory storage with three ships:
/// S-1 in transit, S-2 arriving, S-3 departed.
pub async fn fixture(containers: Vec<Container>, confidence: f64) -> Fixture {
    let ships = vec![
        ship_draft("S-1", 100, 400, "in_transit").build().unwrap(),
        ship_draft("S-2", 300, 400, "arriving").build().unwrap(),
        ship_draft("S-3", 50, 400, "departed").build().unwrap(),
    ];
    let repo = Arc::new(InMemoryRepository::with_data(containers, ships));
    let insights = Arc::new(FakeInsights::new(confidence));
    let notifier = Arc::new(RecordingNotifier::default());
    let operations = Arc::new(InMemoryOperations::new());

    let service = ContainerTrackingService::new(
        repo.clone(),
        repo.clone(),
        insights.clone(),
        notifier.clone(),
        operations.clone(),
    );
    Fixture {
        service,
        repo,
        insights,
        notifier,
        operations,
    }
}
