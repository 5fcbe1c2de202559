use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::ops::RangeInclusive;

use crate::errors::AppError;

/// Triage buckets for an inbound client message.
///
/// FLAG marks urgent or risk-bearing content for human attention, IGNORE
/// marks pure conversational filler, RESPOND is everything in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriageAction {
    Flag,
    Ignore,
    Respond,
}

impl TriageAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flag => "FLAG",
            Self::Ignore => "IGNORE",
            Self::Respond => "RESPOND",
        }
    }

    /// Parses the model's token. Matching is case-insensitive after
    /// trimming; anything outside the three-value domain is rejected.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "FLAG" => Some(Self::Flag),
            "IGNORE" => Some(Self::Ignore),
            "RESPOND" => Some(Self::Respond),
            _ => None,
        }
    }
}

impl fmt::Display for TriageAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client retention risk level. Each level owns a fixed score band; a score
/// outside its level's band is a contract violation, never silently fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Inclusive score band for this level: Low [0,39], Medium [40,69],
    /// High [70,100].
    #[must_use]
    pub const fn score_band(self) -> RangeInclusive<u8> {
        match self {
            Self::Low => 0..=39,
            Self::Medium => 40..=69,
            Self::High => 70..=100,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment of the client's latest message. The score is a concern scale,
/// not a positivity scale: Positive [0,30], Neutral [31,60], Negative
/// [61,100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Neutral => "Neutral",
            Self::Negative => "Negative",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "neutral" => Some(Self::Neutral),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }

    #[must_use]
    pub const fn score_band(self) -> RangeInclusive<u8> {
        match self {
            Self::Positive => 0..=30,
            Self::Neutral => 31..=60,
            Self::Negative => 61..=100,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fields of a detected future event (appointment, deadline,
/// meeting). All fields are free-text as extracted from the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// Event-detection outcome. Invariant: when `has_event` is false every
/// optional field is `None` (enforced at validation time, preserved here).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetection {
    pub has_event: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_details: Option<EventDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_reminder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_note: Option<String>,
}

impl EventDetection {
    /// The "nothing detected" value, also used by the fallback result.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            has_event: false,
            event_details: None,
            suggested_reminder: None,
            internal_note: None,
        }
    }
}

/// The engine's composite verdict over one inbound message.
///
/// `full_analysis` carries the raw per-task breakdown for auditing; on the
/// degraded path it instead carries an `error` marker describing why the
/// pipeline could not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAnalysis {
    pub action: TriageAction,
    pub risk_update: RiskLevel,
    pub risk_score: u8,
    pub sentiment: Sentiment,
    pub sentiment_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_to_send: Option<String>,
    pub event_detection: EventDetection,
    pub full_analysis: Value,
}

impl CompositeAnalysis {
    /// The deterministic safe default returned when the pipeline fails:
    /// flag for human attention at maximum risk, neutral sentiment, no
    /// generated reply. An inability to analyze is itself treated as a
    /// high-risk signal.
    #[must_use]
    pub fn fallback(error: &AppError) -> Self {
        Self {
            action: TriageAction::Flag,
            risk_update: RiskLevel::High,
            risk_score: 100,
            sentiment: Sentiment::Neutral,
            sentiment_score: 50,
            response_to_send: None,
            event_detection: EventDetection::none(),
            full_analysis: json!({ "error": error.to_string() }),
        }
    }

    /// True when this result came from the fallback path.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.full_analysis.get("error").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triage_parse_domain() {
        assert_eq!(TriageAction::parse(" flag \n"), Some(TriageAction::Flag));
        assert_eq!(TriageAction::parse("RESPOND"), Some(TriageAction::Respond));
        assert_eq!(TriageAction::parse("Ignore"), Some(TriageAction::Ignore));
        assert_eq!(TriageAction::parse("ESCALATE"), None);
        assert_eq!(TriageAction::parse(""), None);
    }

    #[test]
    fn test_triage_serializes_uppercase() {
        let json = serde_json::to_string(&TriageAction::Flag).unwrap();
        assert_eq!(json, "\"FLAG\"");
    }

    #[test]
    fn test_bands_cover_full_range_without_overlap() {
        for score in 0..=100u8 {
            let risk_matches = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High]
                .iter()
                .filter(|level| level.score_band().contains(&score))
                .count();
            assert_eq!(risk_matches, 1, "risk band overlap/gap at {score}");

            let sentiment_matches = [
                Sentiment::Positive,
                Sentiment::Neutral,
                Sentiment::Negative,
            ]
            .iter()
            .filter(|s| s.score_band().contains(&score))
            .count();
            assert_eq!(sentiment_matches, 1, "sentiment band overlap/gap at {score}");
        }
    }

    #[test]
    fn test_fallback_is_conservative_and_in_band() {
        let error = AppError::InferenceFailed("boom".to_string());
        let fallback = CompositeAnalysis::fallback(&error);

        assert_eq!(fallback.action, TriageAction::Flag);
        assert_eq!(fallback.risk_update, RiskLevel::High);
        assert_eq!(fallback.risk_score, 100);
        assert!(fallback.risk_update.score_band().contains(&fallback.risk_score));
        assert_eq!(fallback.sentiment, Sentiment::Neutral);
        assert_eq!(fallback.sentiment_score, 50);
        assert!(
            fallback
                .sentiment
                .score_band()
                .contains(&fallback.sentiment_score)
        );
        assert_eq!(fallback.response_to_send, None);
        assert_eq!(fallback.event_detection, EventDetection::none());
        assert!(fallback.is_degraded());
    }

    #[test]
    fn test_composite_serialization_field_names() {
        let composite = CompositeAnalysis {
            action: TriageAction::Respond,
            risk_update: RiskLevel::Low,
            risk_score: 12,
            sentiment: Sentiment::Positive,
            sentiment_score: 8,
            response_to_send: Some("Thanks for the update!".to_string()),
            event_detection: EventDetection::none(),
            full_analysis: json!({}),
        };
        let value = serde_json::to_value(&composite).unwrap();
        assert_eq!(value["action"], "RESPOND");
        assert_eq!(value["risk_update"], "Low");
        assert_eq!(value["risk_score"], 12);
        assert_eq!(value["sentiment"], "Positive");
        assert_eq!(value["sentiment_score"], 8);
        assert_eq!(value["response_to_send"], "Thanks for the update!");
        assert_eq!(value["event_detection"]["has_event"], false);
    }
}
