use crate::http::AppState;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::Instrument;

const MAX_REQUEST_ID_LEN: usize = 128;

/// Caller-supplied `x-request-id`, or a fresh one when absent, blank or too long.
pub(crate) fn request_id(headers: &HeaderMap, seed: &AtomicU64) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(ToString::to_string)
        .unwrap_or_else(|| {
            let id = seed.fetch_add(1, Ordering::Relaxed);
            format!("req-{id:016x}")
        })
}

pub(crate) async fn request_tracing_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let route = request.uri().path().to_string();
    let request_id = request_id(request.headers(), &state.request_id_seed);

    let span = tracing::info_span!(
        "http.request",
        request_id = %request_id,
        method = %method,
        route = %route,
    );

    let started = Instant::now();
    let mut response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(id: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("x-request-id", HeaderValue::from_str(id).unwrap());
        h
    }

    #[test]
    fn caller_id_is_echoed() {
        let seed = AtomicU64::new(1);
        assert_eq!(request_id(&headers(" abc-123 "), &seed), "abc-123");
        assert_eq!(seed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn missing_or_oversized_ids_are_generated() {
        let seed = AtomicU64::new(1);
        assert_eq!(request_id(&HeaderMap::new(), &seed), "req-0000000000000001");
        assert_eq!(
            request_id(&headers(&"x".repeat(MAX_REQUEST_ID_LEN + 1)), &seed),
            "req-0000000000000002"
        );
        let at_limit = "y".repeat(MAX_REQUEST_ID_LEN);
        assert_eq!(request_id(&headers(&at_limit), &seed), at_limit);
    }
}
