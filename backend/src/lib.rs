pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod text_processing;

// Re-export AppState for convenience
pub use state::AppState;

// Compiled unconditionally so integration tests can use the mock client.
pub mod test_helpers;
