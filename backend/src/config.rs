// backend/src/config.rs

use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Config {
    // API keys
    pub gemini_api_key: Option<String>,

    // Server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub environment: Option<String>,

    // Frontend origin allowed by CORS
    #[serde(default = "default_frontend_base_url")]
    pub frontend_base_url: String,

    // Model configuration
    #[serde(default = "default_agent_model")]
    pub agent_model: String, // Deterministic analysis tasks
    #[serde(default = "default_response_model")]
    pub response_model: String, // Client-facing text generation

    // Retry behavior for inference calls
    #[serde(default = "default_agent_max_retries")]
    pub agent_max_retries: u32,
    #[serde(default = "default_agent_backoff_factor")]
    pub agent_backoff_factor: f64, // Seconds; doubled after each attempt

    // Request throttling
    #[serde(default = "default_rate_limit_requests")]
    pub rate_limit_requests: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    // Conversation bounds
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("frontend_base_url", &self.frontend_base_url)
            .field("agent_model", &self.agent_model)
            .field("response_model", &self.response_model)
            .field("agent_max_retries", &self.agent_max_retries)
            .field("agent_backoff_factor", &self.agent_backoff_factor)
            .field("rate_limit_requests", &self.rate_limit_requests)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("max_history_messages", &self.max_history_messages)
            .field("max_message_chars", &self.max_message_chars)
            .finish()
    }
}

// Default value functions for serde
fn default_host() -> String {
    "0.0.0.0".to_string()
}
const fn default_port() -> u16 {
    8080
}
fn default_frontend_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_agent_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_response_model() -> String {
    "gemini-2.5-flash".to_string()
}
const fn default_agent_max_retries() -> u32 {
    3
}
const fn default_agent_backoff_factor() -> f64 {
    1.0
}
const fn default_rate_limit_requests() -> u32 {
    100
}
const fn default_rate_limit_window_secs() -> u64 {
    60
}
const fn default_max_history_messages() -> usize {
    500
}
const fn default_max_message_chars() -> usize {
    10_000
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `anyhow::Error` if environment variable parsing fails,
    /// such as when a variable has an invalid format.
    pub fn load() -> Result<Self, anyhow::Error> {
        envy::from_env::<Self>().map_err(anyhow::Error::from)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            host: default_host(),
            port: default_port(),
            environment: None,
            frontend_base_url: default_frontend_base_url(),
            agent_model: default_agent_model(),
            response_model: default_response_model(),
            agent_max_retries: default_agent_max_retries(),
            agent_backoff_factor: default_agent_backoff_factor(),
            rate_limit_requests: default_rate_limit_requests(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            max_history_messages: default_max_history_messages(),
            max_message_chars: default_max_message_chars(),
        }
    }
}
