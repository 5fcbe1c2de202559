use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::analysis::Sentiment;
use crate::models::messages::ChatTurn;

/// Request for a per-client micro insight. `previous_insight` and
/// `previous_sentiment` let the engine adjust an earlier reading instead of
/// classifying from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRequest {
    pub client_id: String,
    #[serde(default)]
    pub client_profile: Map<String, Value>,
    pub messages: Vec<ChatTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_insight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_sentiment: Option<Sentiment>,
}

/// One-sentence insight plus the (possibly adjusted) sentiment reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroInsight {
    pub insight: String,
    pub sentiment: Sentiment,
}

/// Request for an aggregate portfolio report over many clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReportRequest {
    pub report_period: String,
    pub analysis_date: String,
    #[serde(default)]
    pub metrics: Map<String, Value>,
    #[serde(default)]
    pub client_summaries: Vec<String>,
}

/// Structured portfolio report. All lists are always present (possibly
/// empty); the executive summary is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub executive_summary: String,
    pub key_themes: Vec<String>,
    pub risk_highlights: Vec<String>,
    pub recommendations: Vec<String>,
}
