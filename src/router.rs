//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler, and every handler sees the same shared state.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// One radix tree per HTTP method, plus the state handed to every handler.
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: Arc<S>,
}

impl<S: Send + Sync + 'static> Router<S> {
    /// Creates an empty router whose handlers all receive `state`.
    pub fn with_state(state: S) -> Self {
        Self { routes: HashMap::new(), state: Arc::new(state) }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use roster::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request, _: Arc<()>) -> Response { Response::text("") }
    /// # async fn create_user(_: Request, _: Arc<()>) -> Response { Response::text("") }
    /// Router::with_state(())
    ///     .on(Method::Get,  "/users/{id}", get_user)
    ///     .on(Method::Post, "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup, so this is a
    /// programming error rather than a runtime condition.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler<S>) -> Self {
        self.on(Method::Delete, path, handler)
    }

    /// Routes one request and produces one response.
    ///
    /// - `HEAD` without its own route → the `GET` handler, body dropped
    /// - path registered under other methods only → `405` with `Allow`
    /// - path not registered at all → `404`
    pub async fn handle(&self, mut req: Request) -> Response {
        if let Ok(method) = req.method().parse::<Method>() {
            if let Some((handler, params)) = self.lookup(method, req.path()) {
                req.params = params;
                return handler.call(req, Arc::clone(&self.state)).await;
            }

            if method == Method::Head {
                if let Some((handler, params)) = self.lookup(Method::Get, req.path()) {
                    req.params = params;
                    let mut res = handler.call(req, Arc::clone(&self.state)).await;
                    res.body = Bytes::new();
                    return res;
                }
            }
        }

        self.miss(req.method(), req.path())
    }

    pub(crate) fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    fn miss(&self, method: &str, path: &str) -> Response {
        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| *m)
            .collect();

        if allowed.is_empty() {
            debug!(method, path, "no route");
            return Response::error(Status::NotFound, "Route not found");
        }

        if allowed.contains(&Method::Get) && !allowed.contains(&Method::Head) {
            allowed.push(Method::Head);
        }
        allowed.sort();
        let allow = allowed.iter().map(|m| m.as_str()).collect::<Vec<_>>().join(", ");
        let mut res = Response::error(Status::MethodNotAllowed, "Method not allowed");
        if let Ok(value) = http::HeaderValue::try_from(allow) {
            res.headers.insert(http::header::ALLOW, value);
        }
        res
    }
}
