//! Infrastructure error type.

use thiserror::Error;

/// The error type returned by roster's fallible startup and serving
/// operations.
///
/// Application-level errors (404, 400, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values built from
/// [`ResourceError`](crate::resource::ResourceError), not as `Error`s. This
/// type surfaces infrastructure failures: reading configuration, binding to a
/// port or accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
