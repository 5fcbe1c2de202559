// backend/src/middleware/request_context.rs

use std::time::Instant;

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::info;
use uuid::Uuid;

/// Tags every response with a request id and its wall-clock processing
/// time in seconds, and emits one completion log line per request.
pub async fn request_context_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    let process_time = start.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&format!("{process_time:.4}")) {
        response.headers_mut().insert("x-process-time", value);
    }
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert("x-request-id", value);
    }

    info!(
        %request_id,
        %method,
        path,
        status = response.status().as_u16(),
        process_time,
        "request completed"
    );

    response
}
