use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

/// Paths polled by monitors; not worth a log line each.
const QUIET_PATHS: &[&str] = &["/"];

/// Access log: one line per proxied request, level chosen by status class.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    if QUIET_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let method = method.as_str();
    let code = status.as_u16();

    if status.is_server_error() {
        error!(method, path, status = code, elapsed_ms, "request failed");
    } else if status.is_client_error() {
        warn!(method, path, status = code, elapsed_ms, "request rejected");
    } else {
        info!(method, path, status = code, elapsed_ms, "request");
    }

    response
}
