//! The resource collection: records, list queries, the service that owns
//! them and the HTTP handlers in front of it.
//!
//! [`routes`] mounts the conventional REST surface under a version prefix:
//!
//! | Method | Path | Success |
//! |---|---|---|
//! | GET    | `{prefix}/{resources}`      | 200, JSON array |
//! | POST   | `{prefix}/{resources}`      | 201, JSON object |
//! | GET    | `{prefix}/{resources}/{id}` | 200, JSON object |
//! | PUT    | `{prefix}/{resources}/{id}` | 200, JSON object |
//! | PATCH  | `{prefix}/{resources}/{id}` | 200, JSON object |
//! | DELETE | `{prefix}/{resources}/{id}` | 200, JSON object (deleted) |

mod error;
mod query;
mod record;
mod service;

pub mod handlers;

pub use error::ResourceError;
pub use query::{Filter, ListQuery, Pagination, Sort};
pub use record::{Collection, Field, Record};
pub use service::{Page, RecordPayload, ResourceNames, ResourceService};

use crate::{Router, health};

/// Builds the router for `service` under `prefix` (e.g. `/api/v1`), plus
/// the `/healthz` and `/readyz` probes.
pub fn routes(prefix: &str, service: ResourceService) -> Router<ResourceService> {
    let collection = format!("{}/{}", prefix.trim_end_matches('/'), service.names().plural);
    let member = format!("{collection}/{{id}}");

    Router::with_state(service)
        .get(&collection, handlers::list)
        .post(&collection, handlers::create)
        .get(&member, handlers::get)
        .put(&member, handlers::replace)
        .patch(&member, handlers::update)
        .delete(&member, handlers::delete)
        .get("/healthz", health::liveness::<ResourceService>)
        .get("/readyz", health::readiness::<ResourceService>)
}
