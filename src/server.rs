//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On **SIGTERM** or **SIGINT** (or when the future passed to
//! [`Server::serve_with_shutdown`] resolves) the server:
//! 1. Immediately stops `listener.accept()`; no new connections are made.
//! 2. Tells every open connection to shut down: in-flight requests finish,
//!    idle keep-alive connections close.
//! 3. Waits up to the drain timeout, then aborts whatever is still open.
//! 4. Returns from `serve`, which lets `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::error::Error;
use crate::middleware;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

enum Listen {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    listen: Listen,
    drain_timeout: Duration,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// ```rust,no_run
    /// use roster::Server;
    /// let server = Server::bind(([0, 0, 0, 0], 3000).into());
    /// ```
    pub fn bind(addr: SocketAddr) -> Self {
        Self { listen: Listen::Addr(addr), drain_timeout: DRAIN_TIMEOUT }
    }

    /// Serves on a listener that is already bound, e.g. to an ephemeral port.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self { listen: Listen::Listener(listener), drain_timeout: DRAIN_TIMEOUT }
    }

    /// How long shutdown waits for open connections before aborting them.
    /// Defaults to 30 seconds.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Starts accepting connections and dispatching them through `router`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all open connections closing or the drain timeout).
    pub async fn serve<S>(self, router: Router<S>) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
    {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops accepting when `signal`
    /// resolves instead of waiting for a process signal.
    pub async fn serve_with_shutdown<S, F>(self, router: Router<S>, signal: F) -> Result<(), Error>
    where
        S: Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let listener = match self.listen {
            Listen::Addr(addr) => TcpListener::bind(addr).await?,
            Listen::Listener(listener) => listener,
        };
        let addr = listener.local_addr()?;

        let router = Arc::new(router);

        info!(%addr, "roster listening");

        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
        let builder = ConnBuilder::new(TokioExecutor::new());
        // Signals every watched connection when shutdown starts.
        let graceful = GracefulShutdown::new();
        // Tracks every connection task so shutdown can wait for them.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown is checked first so a signal stops accepting even
                // when more connections are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let router = Arc::clone(&router);
                    let io = TokioIo::new(stream);

                    // Called once per request on the connection.
                    let svc = service_fn(move |req| {
                        let router = Arc::clone(&router);
                        async move { dispatch(router, req).await }
                    });

                    let conn = graceful.watch(builder.serve_connection(io, svc).into_owned());
                    tasks.spawn(async move {
                        if let Err(e) = conn.await {
                            error!(%peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the set stays small.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        drop(listener);

        if tokio::time::timeout(self.drain_timeout, graceful.shutdown()).await.is_err() {
            warn!(remaining = tasks.len(), "drain timeout elapsed, aborting open connections");
            tasks.abort_all();
        }
        while tasks.join_next().await.is_some() {}

        info!("roster stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers one request body, routes the request and produces one response.
///
/// Every failure becomes an HTTP response, so hyper never sees an error.
async fn dispatch<S>(
    router: Arc<Router<S>>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    S: Send + Sync + 'static,
{
    let (parts, body) = req.into_parts();
    let method = parts.method.to_string();
    let path = parts.uri.path().to_owned();

    let response = middleware::trace(&method, &path, async {
        match body.collect().await {
            Ok(collected) => {
                let req = Request::from_http(http::Request::from_parts(parts, collected.to_bytes()));
                router.handle(req).await
            }
            Err(e) => {
                warn!("failed to read request body: {e}");
                Response::error(Status::BadRequest, "Failed to read request body")
            }
        }
    })
    .await;

    Ok(response.into_inner())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C). On
/// other platforms only Ctrl-C is available. A handler that cannot be
/// installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
