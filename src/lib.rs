//! # roster
//!
//! A conformant REST resource server: one collection of records held in
//! memory, exposed over versioned HTTP routes with conventional methods,
//! status codes, pagination and a single JSON error shape.
//!
//! The crate has two layers:
//!
//! - A thin HTTP framework: radix-tree routing via [`matchit`], hyper for
//!   HTTP/1.1 and HTTP/2, graceful shutdown on SIGTERM / Ctrl-C, and a
//!   tracing middleware.
//! - The [`resource`] module: the collection, its service and handlers.
//!
//! What a reverse proxy or an outer layer already owns stays out: TLS,
//! rate limiting, authentication, persistence.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use roster::resource::{self, Collection, Pagination, ResourceNames, ResourceService};
//! use roster::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = ResourceService::new(
//!         ResourceNames::new("users", "User"),
//!         Pagination::default(),
//!         Collection::seeded(["John Doe", "Jane Doe"]),
//!     );
//!     let app = resource::routes("/api/v1", service);
//!
//!     Server::bind(([0, 0, 0, 0], 3000).into()).serve(app).await.unwrap();
//! }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod middleware;
pub mod resource;

pub use config::Config;
pub use error::Error;
pub use handler::Handler;
pub use method::{Method, UnknownMethod};
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
