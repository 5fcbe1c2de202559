use crate::errors::AppError;

use super::sentiment_structured_output::{
    SentimentOutput, SentimentReading, get_sentiment_schema,
};
use super::task::{TaskRunner, TaskSpec};

pub const SENTIMENT_TASK: &str = "sentiment";

const SENTIMENT_SYSTEM: &str = "You are an expert in sentiment analysis. Classify the sentiment \
of the message as Positive, Neutral, or Negative.\n\n\
Additionally, provide a sentiment_score from 0-100 reflecting the level of concern:\n\
- For 'Positive' sentiment: score between 0-30\n\
- For 'Neutral' sentiment: score between 31-60\n\
- For 'Negative' sentiment: score between 61-100\n\n\
The exact score should reflect the intensity of the sentiment within each category.\n\n\
Return only a JSON object with the structure: {\"sentiment\": \"Positive|Neutral|Negative\", \"sentiment_score\": number}";

/// Reads the sentiment of the latest message on the concern scale (a higher
/// score means more concerning, so Positive sits at the bottom of the range).
#[derive(Clone)]
pub struct SentimentAgent {
    runner: TaskRunner,
    spec: TaskSpec,
}

impl SentimentAgent {
    pub fn new(runner: TaskRunner) -> Self {
        Self {
            runner,
            spec: TaskSpec::json(SENTIMENT_TASK, SENTIMENT_SYSTEM, 0.0, get_sentiment_schema()),
        }
    }

    pub async fn read(&self, message: &str) -> Result<SentimentReading, AppError> {
        let prompt = format!("Message: '{message}'");
        let output: SentimentOutput = self.runner.complete_json(&self.spec, &prompt).await?;
        output.to_reading()
    }
}
