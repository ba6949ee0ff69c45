use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use tracing::{Instrument, error, info, info_span};

use crate::response::Response;
use crate::status::Status;

/// Runs `dispatch` inside a `request` span and logs its outcome.
///
/// A handler that panics is turned into a `500` JSON error so the client
/// still receives a response and the connection survives.
pub async fn trace<F>(method: &str, path: &str, dispatch: F) -> Response
where
    F: Future<Output = Response>,
{
    let span = info_span!("request", %method, %path);
    let start = Instant::now();

    let response = match AssertUnwindSafe(dispatch).catch_unwind().instrument(span.clone()).await {
        Ok(response) => response,
        Err(_) => {
            span.in_scope(|| error!("handler panicked"));
            Response::error(Status::InternalServerError, "Internal server error")
        }
    };

    span.in_scope(|| {
        info!(
            status = response.status_code().as_u16(),
            latency_us = start.elapsed().as_micros() as u64,
            "request completed"
        );
    });
    response
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    #[tokio::test]
    async fn passes_response_through() {
        let res = trace("GET", "/healthz", async { Response::text("ok") }).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn panic_becomes_internal_error() {
        let res = trace("GET", "/boom", async {
            if true {
                panic!("boom");
            }
            Response::text("unreachable")
        })
        .await;
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
