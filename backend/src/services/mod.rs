pub mod analysis;
pub mod concise;
pub mod insights;
pub mod outbound;
pub mod summarization;

pub use analysis::AnalysisOrchestrator;
pub use concise::ConciseRewriter;
pub use insights::{MicroInsightEngine, PortfolioReportEngine};
pub use outbound::{OutboundComposer, ReminderScheduler};
pub use summarization::ChatSummarizer;
