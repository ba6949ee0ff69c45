//! Built-in health-check handlers.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? |
//! | **Readiness** | `/readyz` | Can the process serve traffic? |
//!
//! Both are generic over the router state, so they register on any router
//! once the state type is named:
//!
//! ```rust,no_run
//! use roster::{Router, health};
//!
//! let app = Router::with_state(())
//!     .get("/healthz", health::liveness::<()>)
//!     .get("/readyz", health::readiness::<()>);
//! ```

use std::sync::Arc;

use serde_json::json;

use crate::{Json, Request};

/// Liveness probe. Always `200 OK` with `{"status":"ok"}`.
pub async fn liveness<S>(_req: Request, _state: Arc<S>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe. The collection lives in memory, so once the router is
/// serving it is ready: `200 OK` with `{"status":"ready"}`.
pub async fn readiness<S>(_req: Request, _state: Arc<S>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ready" }))
}
