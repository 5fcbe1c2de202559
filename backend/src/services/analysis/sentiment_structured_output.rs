use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::analysis::Sentiment;

/// Raw sentiment verdict as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentOutput {
    pub sentiment: String,
    pub sentiment_score: i64,
}

/// Validated sentiment reading: label and an in-band concern score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentimentReading {
    pub label: Sentiment,
    pub score: u8,
}

pub fn get_sentiment_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "sentiment": {
                "type": "string",
                "enum": ["Positive", "Neutral", "Negative"],
                "description": "Sentiment of the message. Must be one of the exact values listed."
            },
            "sentiment_score": {
                "type": "integer",
                "minimum": 0,
                "maximum": 100,
                "description": "Concern score. Positive maps to 0-30, Neutral to 31-60, Negative to 61-100."
            }
        },
        "required": ["sentiment", "sentiment_score"]
    })
}

impl SentimentOutput {
    /// Same strictness as risk: domain membership, 0-100 range, and
    /// label/band agreement, with rejection instead of repair.
    pub fn validate(&self) -> Result<(), AppError> {
        let label = Sentiment::parse(&self.sentiment).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!("invalid sentiment: {:?}", self.sentiment))
        })?;

        if !(0..=100).contains(&self.sentiment_score) {
            return Err(AppError::AgentOutputInvalid(format!(
                "sentiment score {} outside 0-100",
                self.sentiment_score
            )));
        }

        let score = self.sentiment_score as u8;
        if !label.score_band().contains(&score) {
            return Err(AppError::AgentOutputInvalid(format!(
                "sentiment score {} outside band {:?} for label {}",
                score,
                label.score_band(),
                label
            )));
        }
        Ok(())
    }

    pub fn to_reading(&self) -> Result<SentimentReading, AppError> {
        self.validate()?;
        let label = Sentiment::parse(&self.sentiment).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!("invalid sentiment: {:?}", self.sentiment))
        })?;
        Ok(SentimentReading {
            label,
            score: self.sentiment_score as u8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(label: &str, score: i64) -> SentimentOutput {
        SentimentOutput {
            sentiment: label.to_string(),
            sentiment_score: score,
        }
    }

    #[test]
    fn test_band_edges_pass() {
        for (label, score, expected) in [
            ("Positive", 0, Sentiment::Positive),
            ("Positive", 30, Sentiment::Positive),
            ("Neutral", 31, Sentiment::Neutral),
            ("Neutral", 60, Sentiment::Neutral),
            ("Negative", 61, Sentiment::Negative),
            ("Negative", 100, Sentiment::Negative),
        ] {
            let reading = output(label, score).to_reading().expect("should pass");
            assert_eq!(reading.label, expected);
            assert_eq!(reading.score, score as u8);
        }
    }

    #[test]
    fn test_band_mismatch_rejected() {
        for (label, score) in [("Positive", 31), ("Neutral", 61), ("Negative", 60)] {
            assert!(
                output(label, score).validate().is_err(),
                "{label}/{score} should be rejected"
            );
        }
    }

    #[test]
    fn test_range_and_domain_violations_rejected() {
        assert!(output("Negative", 101).validate().is_err());
        assert!(output("Positive", -1).validate().is_err());
        assert!(output("Ambivalent", 50).validate().is_err());
    }
}
