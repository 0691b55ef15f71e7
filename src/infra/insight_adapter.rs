//! Insight generation backed by a text generator.
//!
//! Each operation renders a prompt, asks for a JSON reply, and maps the
//! call-specific keys onto an [`AiInsight`]. Transport errors, unparseable
//! replies and out-of-range values all end in the basic-mode fallback; no
//! operation here ever fails.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::app::ports::{InsightPort, PortOverview, TextGenerator, WeatherSnapshot};
use crate::constants::{BERTH_COUNT, CRANE_COUNT, PORT_NAME};
use crate::domain::{
    AiInsight, Container, ImpactLevel, InsightCategory, InsightDraft, PortOperation, Ship,
};
use crate::error::{Result, TrackerError};
use crate::metrics::InsightMetrics;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

const TAG_CONGESTION: &str = "congestion";
const TAG_CRANE: &str = "crane_allocation";
const TAG_CARGO: &str = "cargo_patterns";
const TAG_EFFICIENCY: &str = "efficiency";
const TAG_DELAYS: &str = "delays";

/// The outermost `{...}` span of a reply, skipping code fences or chatter
/// around it.
fn extract_json(reply: &str) -> Option<&str> {
    JSON_OBJECT.find(reply).map(|m| m.as_str())
}

fn insight_id(tag: &str) -> String {
    format!("{}_{}", tag, Utc::now().format("%Y%m%d_%H%M"))
}

#[derive(Debug, Deserialize)]
struct CongestionReply {
    prediction: String,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    recommendations: Vec<String>,
    impact: String,
}

#[derive(Debug, Deserialize)]
struct CraneReply {
    priority_order: Vec<String>,
    #[serde(default)]
    crane_assignments: BTreeMap<String, serde_json::Value>,
    reasoning: String,
    estimated_efficiency: f64,
    #[serde(default)]
    recommendations: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CargoReply {
    #[serde(default)]
    trends: Vec<String>,
    insights: String,
    #[serde(default)]
    predictions: serde_json::Value,
    #[serde(default)]
    opportunities: Vec<String>,
    impact_score: f64,
}

#[derive(Debug, Deserialize)]
struct EfficiencyReply {
    efficiency_score: f64,
    #[serde(default)]
    bottlenecks: Vec<String>,
    #[serde(default)]
    improvements: Vec<String>,
    analysis: String,
    priority: String,
}

#[derive(Debug, Deserialize)]
struct DelayReply {
    expected_delay_hours: f64,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    risk_factors: Vec<String>,
    impact: String,
}

#[derive(Serialize)]
struct ContainerSummary<'a> {
    id: &'a str,
    cargo: &'static str,
    weight_kg: f64,
    priority: &'static str,
    status: &'static str,
}

#[derive(Serialize)]
struct OperationSummary<'a> {
    operation_type: String,
    container_id: &'a str,
    crane: Option<&'a str>,
    duration_hours: Option<f64>,
    completed: bool,
}

fn with_list(text: &str, label: &str, items: &[String]) -> String {
    if items.is_empty() {
        text.to_string()
    } else {
        format!("{} {}: {}", text, label, items.join(", "))
    }
}

pub struct LlmInsightAdapter {
    generator: Arc<dyn TextGenerator>,
}

impl LlmInsightAdapter {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    async fn ask<R: DeserializeOwned>(&self, system: &str, prompt: &str, temperature: f32) -> Result<R> {
        let reply = self.generator.generate(system, prompt, temperature).await?;
        let body = extract_json(&reply)
            .ok_or_else(|| TrackerError::Generation("reply contains no JSON object".to_string()))?;
        Ok(serde_json::from_str(body)?)
    }

    fn finish(tag: &str, result: Result<AiInsight>) -> AiInsight {
        match result {
            Ok(insight) => {
                InsightMetrics::record_generated(tag);
                debug!(tag, id = insight.insight_id(), confidence = insight.confidence(), "Insight generated");
                insight
            }
            Err(e) => {
                warn!(tag, error = %e, "Insight generation failed, using basic mode");
                InsightMetrics::record_fallback(tag);
                AiInsight::fallback(tag, &e.to_string(), Utc::now())
            }
        }
    }

    async fn congestion(&self, overview: &PortOverview) -> Result<AiInsight> {
        let prompt = format!(
            "You are an operations expert at the {port}, Peru.\n\n\
             Current port data:\n\
             - Total containers: {containers}\n\
             - Ships in port: {ships}\n\
             - Active cranes: {cranes}/{crane_count}\n\
             - Occupied berths: {berths}/{berth_count}\n\
             - Containers unloading: {unloading}\n\n\
             Predict whether the port will be congested in the next 6-12 hours.\n\n\
             Reply in JSON:\n\
             {{\"prediction\": \"low/medium/high congestion\", \"confidence\": 0.0-1.0, \
             \"reasoning\": \"...\", \"recommendations\": [\"...\"], \"impact\": \"low/medium/high\"}}",
            port = PORT_NAME,
            containers = overview.total_containers,
            ships = overview.ships_count,
            cranes = overview.active_cranes,
            crane_count = CRANE_COUNT,
            berths = overview.occupied_berths,
            berth_count = BERTH_COUNT,
            unloading = overview.unloading_containers,
        );
        let reply: CongestionReply = self
            .ask("You analyse port logistics at Chancay.", &prompt, 0.3)
            .await?;

        InsightDraft {
            insight_id: insight_id(TAG_CONGESTION),
            category: InsightCategory::Prediction,
            title: format!("Congestion forecast: {}", reply.prediction),
            description: with_list(&reply.reasoning, "Recommendations", &reply.recommendations),
            confidence: reply.confidence,
            impact_level: reply.impact.parse::<ImpactLevel>()?,
            generated_at: Utc::now(),
            related_containers: vec![],
        }
        .build()
        .map_err(TrackerError::from)
    }

    async fn crane_allocation(&self, containers: &[Container]) -> Result<AiInsight> {
        let summary: Vec<ContainerSummary> = containers
            .iter()
            .map(|c| ContainerSummary {
                id: &c.container_id,
                cargo: c.cargo_type.as_str(),
                weight_kg: c.weight_kg(),
                priority: c.priority.as_str(),
                status: c.status().as_str(),
            })
            .collect();
        let prompt = format!(
            "You plan crane work at the {port}. The port has {cranes} cranes.\n\n\
             Containers waiting for a crane:\n{data}\n\n\
             Weigh cargo priority (critical > high > medium > low), cargo type \
             (minerals take longer), and weight.\n\n\
             Reply in JSON:\n\
             {{\"priority_order\": [\"container_id\", ...], \"crane_assignments\": {{\"container_id\": \"crane\"}}, \
             \"reasoning\": \"...\", \"estimated_efficiency\": 0.0-1.0, \"recommendations\": [\"...\"]}}",
            port = PORT_NAME,
            cranes = CRANE_COUNT,
            data = serde_json::to_string_pretty(&summary)?,
        );
        let reply: CraneReply = self
            .ask("You optimise port crane operations.", &prompt, 0.2)
            .await?;

        let impact_level = if reply.estimated_efficiency > 0.7 {
            ImpactLevel::Medium
        } else {
            ImpactLevel::Low
        };
        let description = format!(
            "{} Suggested assignments: {}.",
            with_list(&reply.reasoning, "Recommendations", &reply.recommendations),
            reply.crane_assignments.len()
        );

        InsightDraft {
            insight_id: insight_id(TAG_CRANE),
            category: InsightCategory::Recommendation,
            title: format!(
                "Crane allocation (efficiency {:.0}%)",
                reply.estimated_efficiency * 100.0
            ),
            description,
            confidence: reply.estimated_efficiency,
            impact_level,
            generated_at: Utc::now(),
            related_containers: reply.priority_order.into_iter().take(3).collect(),
        }
        .build()
        .map_err(TrackerError::from)
    }

    async fn cargo_patterns(&self, containers: &[Container]) -> Result<AiInsight> {
        let mut breakdown: BTreeMap<&str, usize> = BTreeMap::new();
        for container in containers {
            *breakdown.entry(container.cargo_type.as_str()).or_insert(0) += 1;
        }
        let prompt = format!(
            "You study Peru-Asia trade through the {port}.\n\n\
             Current cargo mix:\n{data}\n\n\
             Consider Peruvian exports (minerals, agricultural goods), bilateral \
             trade trends and seasonality.\n\n\
             Reply in JSON:\n\
             {{\"trends\": [\"...\"], \"insights\": \"...\", \"predictions\": \"...\", \
             \"opportunities\": [\"...\"], \"impact_score\": 0.0-1.0}}",
            port = PORT_NAME,
            data = serde_json::to_string_pretty(&breakdown)?,
        );
        let reply: CargoReply = self
            .ask("You analyse Peru-Asia international trade.", &prompt, 0.4)
            .await?;

        let mut description = with_list(&reply.insights, "Opportunities", &reply.opportunities);
        if let Some(predictions) = reply.predictions.as_str().filter(|p| !p.is_empty()) {
            description = format!("{} Outlook: {}", description, predictions);
        }
        description = with_list(&description, "Trends", &reply.trends);

        InsightDraft {
            insight_id: insight_id(TAG_CARGO),
            category: InsightCategory::Analysis,
            title: "Peru-Asia cargo patterns".to_string(),
            description,
            confidence: reply.impact_score,
            impact_level: if reply.impact_score > 0.7 {
                ImpactLevel::High
            } else {
                ImpactLevel::Medium
            },
            generated_at: Utc::now(),
            related_containers: vec![],
        }
        .build()
        .map_err(TrackerError::from)
    }

    async fn efficiency(&self, operations: &[PortOperation]) -> Result<AiInsight> {
        let summary: Vec<OperationSummary> = operations
            .iter()
            .map(|op| OperationSummary {
                operation_type: op.operation_type.to_string(),
                container_id: &op.container_id,
                crane: op.crane_id.as_deref(),
                duration_hours: op.duration_hours(),
                completed: op.is_completed(),
            })
            .collect();
        let prompt = format!(
            "You review operational efficiency at the {port}.\n\n\
             Recent operations:\n{data}\n\n\
             Assess operation times, crane utilisation and bottlenecks.\n\n\
             Reply in JSON:\n\
             {{\"efficiency_score\": 0.0-1.0, \"bottlenecks\": [\"...\"], \"improvements\": [\"...\"], \
             \"analysis\": \"...\", \"priority\": \"low/medium/high\"}}",
            port = PORT_NAME,
            data = serde_json::to_string_pretty(&summary)?,
        );
        let reply: EfficiencyReply = self
            .ask("You optimise port efficiency.", &prompt, 0.3)
            .await?;

        let description = with_list(
            &with_list(&reply.analysis, "Improvements", &reply.improvements),
            "Bottlenecks",
            &reply.bottlenecks,
        );
        InsightDraft {
            insight_id: insight_id(TAG_EFFICIENCY),
            category: InsightCategory::Recommendation,
            title: format!("Operational efficiency ({:.0}%)", reply.efficiency_score * 100.0),
            description,
            confidence: reply.efficiency_score,
            impact_level: reply.priority.parse::<ImpactLevel>()?,
            generated_at: Utc::now(),
            related_containers: operations.iter().map(|op| op.container_id.clone()).collect(),
        }
        .build()
        .map_err(TrackerError::from)
    }

    async fn delays(&self, ship: &Ship, weather: &WeatherSnapshot) -> Result<AiInsight> {
        let data = json!({
            "ship": {
                "id": ship.ship_id,
                "name": ship.name,
                "origin": ship.origin_port,
                "status": ship.current_status,
                "eta": ship.eta.format("%Y-%m-%dT%H:%M:%S").to_string(),
                "load_percentage": ship.load_percentage(),
            },
            "weather": weather,
        });
        let prompt = format!(
            "You forecast vessel delays at the {port}.\n\n\
             Vessel and weather:\n{data}\n\n\
             Reply in JSON:\n\
             {{\"expected_delay_hours\": 0.0, \"confidence\": 0.0-1.0, \"reasoning\": \"...\", \
             \"risk_factors\": [\"...\"], \"impact\": \"low/medium/high\"}}",
            port = PORT_NAME,
            data = serde_json::to_string_pretty(&data)?,
        );
        let reply: DelayReply = self
            .ask("You forecast maritime arrival delays.", &prompt, 0.3)
            .await?;

        InsightDraft {
            insight_id: insight_id(TAG_DELAYS),
            category: InsightCategory::Prediction,
            title: format!(
                "Delay outlook for {}: {:.1} h",
                ship.name, reply.expected_delay_hours
            ),
            description: with_list(&reply.reasoning, "Risk factors", &reply.risk_factors),
            confidence: reply.confidence,
            impact_level: reply.impact.parse::<ImpactLevel>()?,
            generated_at: Utc::now(),
            related_containers: vec![],
        }
        .build()
        .map_err(TrackerError::from)
    }
}

#[async_trait]
impl InsightPort for LlmInsightAdapter {
    async fn predict_port_congestion(&self, overview: &PortOverview) -> AiInsight {
        Self::finish(TAG_CONGESTION, self.congestion(overview).await)
    }

    async fn recommend_crane_allocation(&self, containers: &[Container]) -> AiInsight {
        Self::finish(TAG_CRANE, self.crane_allocation(containers).await)
    }

    async fn analyze_cargo_patterns(&self, containers: &[Container]) -> AiInsight {
        Self::finish(TAG_CARGO, self.cargo_patterns(containers).await)
    }

    async fn generate_efficiency_insights(&self, operations: &[PortOperation]) -> AiInsight {
        Self::finish(TAG_EFFICIENCY, self.efficiency(operations).await)
    }

    async fn predict_delays(&self, ship: &Ship, weather: &WeatherSnapshot) -> AiInsight {
        Self::finish(TAG_DELAYS, self.delays(ship, weather).await)
    }
}
