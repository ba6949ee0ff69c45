//! Middleware layer.
//!
//! Middleware wraps the dispatch of a request and is the right place for
//! cross-cutting concerns. The server runs every request through
//! [`trace`]: a per-request span with method, path, status and latency.

mod trace;

pub use trace::trace;
