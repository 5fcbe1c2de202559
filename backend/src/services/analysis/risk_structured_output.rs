use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::analysis::RiskLevel;

/// Raw risk verdict as returned by the model. The score is kept wide here
/// so out-of-range values reach `validate` instead of failing as a parse
/// error with no domain context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskOutput {
    pub risk_update: String,
    pub risk_score: i64,
}

/// Validated risk assessment: level and an in-band score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskVerdict {
    pub level: RiskLevel,
    pub score: u8,
}

pub fn get_risk_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "risk_update": {
                "type": "string",
                "enum": ["High", "Medium", "Low"],
                "description": "Client retention risk level. Must be one of the exact values listed."
            },
            "risk_score": {
                "type": "integer",
                "minimum": 0,
                "maximum": 100,
                "description": "Numeric risk score. High maps to 70-100, Medium to 40-69, Low to 0-39."
            }
        },
        "required": ["risk_update", "risk_score"]
    })
}

impl RiskOutput {
    /// Checks domain membership, the 0-100 range, and that the score sits
    /// inside the band its level implies. A mismatch is rejected outright,
    /// never repaired.
    pub fn validate(&self) -> Result<(), AppError> {
        let level = RiskLevel::parse(&self.risk_update).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!("invalid risk level: {:?}", self.risk_update))
        })?;

        if !(0..=100).contains(&self.risk_score) {
            return Err(AppError::AgentOutputInvalid(format!(
                "risk score {} outside 0-100",
                self.risk_score
            )));
        }

        let score = self.risk_score as u8;
        if !level.score_band().contains(&score) {
            return Err(AppError::AgentOutputInvalid(format!(
                "risk score {} outside band {:?} for level {}",
                score,
                level.score_band(),
                level
            )));
        }
        Ok(())
    }

    pub fn to_verdict(&self) -> Result<RiskVerdict, AppError> {
        self.validate()?;
        let level = RiskLevel::parse(&self.risk_update).ok_or_else(|| {
            AppError::AgentOutputInvalid(format!("invalid risk level: {:?}", self.risk_update))
        })?;
        Ok(RiskVerdict {
            level,
            score: self.risk_score as u8,
        })
    }
}
