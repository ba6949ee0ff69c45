//! HTTP status codes as a typed enum.
//!
//! Use [`Status`] anywhere a status code is accepted: `Response::status()`,
//! `Response::builder().status()`, or as a bare handler return value.
//!
//! ```rust
//! use roster::{Response, Status};
//!
//! // status-only, no body
//! Response::status(Status::NoContent);
//!
//! Response::builder()
//!     .status(Status::Created)
//!     .header("location", "/api/v1/users/42")
//!     .json(br#"{"id":42,"name":"Ann"}"#.to_vec());
//! ```

use http::StatusCode;

/// The status codes this server produces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                   // 200
    Created,              // 201
    NoContent,            // 204

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,           // 400
    NotFound,             // 404
    MethodNotAllowed,     // 405
    UnsupportedMediaType, // 415

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError,  // 500
}

impl From<Status> for StatusCode {
    fn from(s: Status) -> StatusCode {
        match s {
            Status::Ok                   => StatusCode::OK,
            Status::Created              => StatusCode::CREATED,
            Status::NoContent            => StatusCode::NO_CONTENT,
            Status::BadRequest           => StatusCode::BAD_REQUEST,
            Status::NotFound             => StatusCode::NOT_FOUND,
            Status::MethodNotAllowed     => StatusCode::METHOD_NOT_ALLOWED,
            Status::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Status::InternalServerError  => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        StatusCode::from(s).as_u16()
    }
}
