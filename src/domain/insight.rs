use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Prediction,
    Recommendation,
    Alert,
    Analysis,
    Error,
}

impl fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InsightCategory::Prediction => "prediction",
            InsightCategory::Recommendation => "recommendation",
            InsightCategory::Alert => "alert",
            InsightCategory::Analysis => "analysis",
            InsightCategory::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImpactLevel::Low => "low",
            ImpactLevel::Medium => "medium",
            ImpactLevel::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for ImpactLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ImpactLevel::Low),
            "medium" => Ok(ImpactLevel::Medium),
            "high" => Ok(ImpactLevel::High),
            _ => Err(DomainError::UnknownVariant {
                kind: "impact level",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightDraft {
    pub insight_id: String,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub confidence: f64,
    pub impact_level: ImpactLevel,
    pub generated_at: DateTime<Utc>,
    pub related_containers: Vec<String>,
}

impl InsightDraft {
    pub fn build(self) -> Result<AiInsight, DomainError> {
        AiInsight::new(self)
    }
}

/// An analytical result produced for one request. Never mutated after
/// construction and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiInsight {
    insight_id: String,
    category: InsightCategory,
    title: String,
    description: String,
    confidence: f64,
    impact_level: ImpactLevel,
    generated_at: DateTime<Utc>,
    related_containers: Vec<String>,
}

impl AiInsight {
    pub fn new(draft: InsightDraft) -> Result<Self, DomainError> {
        if !(0.0..=1.0).contains(&draft.confidence) {
            return Err(DomainError::ConfidenceOutOfRange(draft.confidence));
        }
        Ok(Self {
            insight_id: draft.insight_id,
            category: draft.category,
            title: draft.title,
            description: draft.description,
            confidence: draft.confidence,
            impact_level: draft.impact_level,
            generated_at: draft.generated_at,
            related_containers: draft.related_containers,
        })
    }

    /// Basic-mode stand-in used whenever an insight could not be generated.
    pub fn fallback(tag: &str, message: &str, generated_at: DateTime<Utc>) -> Self {
        Self {
            insight_id: format!("fallback_{}_{}", tag, generated_at.format("%Y%m%d_%H%M")),
            category: InsightCategory::Error,
            title: format!("{} analysis - basic mode", tag),
            description: format!("Running in basic mode: {}", message),
            confidence: 0.5,
            impact_level: ImpactLevel::Low,
            generated_at,
            related_containers: vec![],
        }
    }

    pub fn insight_id(&self) -> &str {
        &self.insight_id
    }

    pub fn category(&self) -> InsightCategory {
        self.category
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn impact_level(&self) -> ImpactLevel {
        self.impact_level
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn related_containers(&self) -> &[String] {
        &self.related_containers
    }

    pub fn is_high_confidence(&self) -> bool {
        self.confidence >= 0.8
    }
}
