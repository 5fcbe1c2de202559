// backend/src/state.rs

use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    llm::AiClient,
    middleware::RateLimiter,
    services::{
        AnalysisOrchestrator, ChatSummarizer, ConciseRewriter, MicroInsightEngine,
        OutboundComposer, PortfolioReportEngine,
        analysis::{RetryPolicy, TaskRunner},
    },
};

// --- Shared application state ---
//
// Handlers receive this by clone; everything inside is an Arc (or built
// from Arcs), so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ai_client: Arc<dyn AiClient>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub summarizer: Arc<ChatSummarizer>,
    pub rewriter: Arc<ConciseRewriter>,
    pub insight_engine: Arc<MicroInsightEngine>,
    pub report_engine: Arc<PortfolioReportEngine>,
    pub composer: Arc<OutboundComposer>,
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Builds every service from one client and one config. Analysis-side
    /// services share the agent model; outbound drafting uses the response
    /// model.
    #[must_use]
    pub fn new(config: Config, ai_client: Arc<dyn AiClient>) -> Self {
        let retry = RetryPolicy::new(config.agent_max_retries, config.agent_backoff_factor);
        let analysis_runner = TaskRunner::new(
            Arc::clone(&ai_client),
            config.agent_model.clone(),
            retry,
        );
        let response_runner = TaskRunner::new(
            Arc::clone(&ai_client),
            config.response_model.clone(),
            retry,
        );

        let orchestrator = Arc::new(AnalysisOrchestrator::new(Arc::clone(&ai_client), &config));
        let summarizer = Arc::new(ChatSummarizer::new(analysis_runner.clone()));
        let rewriter = Arc::new(ConciseRewriter::new(analysis_runner.clone()));
        let insight_engine = Arc::new(MicroInsightEngine::new(analysis_runner.clone()));
        let report_engine = Arc::new(PortfolioReportEngine::new(analysis_runner));
        let composer = Arc::new(OutboundComposer::new(response_runner));
        let rate_limiter = Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        ));

        Self {
            config: Arc::new(config),
            ai_client,
            orchestrator,
            summarizer,
            rewriter,
            insight_engine,
            report_engine,
            composer,
            rate_limiter,
        }
    }
}
