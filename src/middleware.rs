//! The buffered request middleware.
//!
//! [`Middleware`] wraps an inner handler and walks every request through the
//! same lifecycle:
//!
//! ```text
//! INIT          build the per-request logger from Settings
//!   ↓
//! LOGGER_READY  attach logger + suppression flag to the request extensions,
//!               merge request-time fields/tags
//!   ↓
//! HANDLING      delegate to the inner handler (under a flush guard)
//!   ↓
//! FINALIZING    merge response-time fields/tags from the response headers
//!   ↓
//! DONE          flush per buffering mode, stamp the response extensions,
//!               return the response untouched
//! ```
//!
//! The flush guard makes FINALIZING unconditional: a handler that panics, or
//! a host that drops the in-flight future, still gets its partially-built
//! buffer flushed instead of silently discarded.
//!
//! # How handlers are accepted
//!
//! [`Handler`] is blanket-implemented for any `async fn` (or closure) from
//! `http::Request<B>` to `http::Response<_>`. You never implement it by hand;
//! write the function, hand it to [`Middleware::new`]:
//!
//! ```rust
//! use tome::{Middleware, RequestExt, Settings};
//!
//! async fn hello(req: http::Request<()>) -> http::Response<String> {
//!     req.logger().info("saying hello");
//!     http::Response::new("Hello world!".to_owned())
//! }
//!
//! let app = Middleware::new(hello, Settings::default());
//! ```

use std::future::Future;
use std::pin::Pin;

use crate::config::Settings;
use crate::fields::{resolve_fields, resolve_tags};
use crate::logger::RequestLogger;
use crate::request::RequestInfo;

// ── Handler ───────────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future. `Pin<Box<…>>` because the runtime
/// polls it in place; `Send` so the host may move it across threads.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// The inner request handler a [`Middleware`] delegates to.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: http::Request<B>) -> http::Response<...>
/// ```
///
/// The associated `Body` is the handler's response body type — the middleware
/// never touches it.
pub trait Handler<B>: Send + Sync {
    type Body;

    fn call(&self, req: http::Request<B>) -> BoxFuture<http::Response<Self::Body>>;
}

impl<F, Fut, B, RB> Handler<B> for F
where
    F: Fn(http::Request<B>) -> Fut + Send + Sync,
    Fut: Future<Output = http::Response<RB>> + Send + 'static,
{
    type Body = RB;

    fn call(&self, req: http::Request<B>) -> BoxFuture<http::Response<RB>> {
        Box::pin(self(req))
    }
}

// ── Request extensions ────────────────────────────────────────────────────────

/// The suppression flag: tells any co-resident legacy access-logger that this
/// request is already being logged. Set on the request extensions before
/// handling and on the response extensions after, always `true`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SuppressAccessLog(pub bool);

/// Access to the logger a [`Middleware`] attached to the request.
pub trait RequestExt {
    /// The attached [`RequestLogger`], or a detached no-op handle when no
    /// middleware processed this request — callers never need to branch.
    fn logger(&self) -> RequestLogger;
}

impl<B> RequestExt for http::Request<B> {
    fn logger(&self) -> RequestLogger {
        self.extensions()
            .get::<RequestLogger>()
            .cloned()
            .unwrap_or_else(RequestLogger::detached)
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

/// The buffered request-logging middleware. Build once at startup, share
/// across requests; every request gets its own logger and buffer.
pub struct Middleware<H> {
    inner: H,
    settings: Settings,
}

impl<H> Middleware<H> {
    pub fn new(inner: H, settings: Settings) -> Self {
        Self { inner, settings }
    }

    /// Handles one request: attach, enrich, delegate, enrich again, flush.
    ///
    /// The response body is returned untouched. The response extensions gain
    /// the [`RequestLogger`] and [`SuppressAccessLog`] so an outer legacy
    /// access-logger can see this request was already logged.
    pub async fn call<B>(&self, mut req: http::Request<B>) -> http::Response<H::Body>
    where
        H: Handler<B>,
    {
        // INIT → LOGGER_READY. Disabled paths still produce a (no-op) logger.
        let logger = self.settings.request_logger();

        // LOGGER_READY → HANDLING.
        req.extensions_mut().insert(logger.clone());
        req.extensions_mut().insert(SuppressAccessLog(true));

        if self.settings.request_fields.is_some() || self.settings.request_tags.is_some() {
            let info = RequestInfo::new(&req);
            logger.merge_fields(resolve_fields(self.settings.request_fields.as_ref(), &info));
            logger.append_tags(resolve_tags(self.settings.request_tags.as_ref(), &info));
        }

        // HANDLING. The guard finalizes on every exit path — including a
        // panicking handler or a dropped future — so the buffer is flushed,
        // not discarded.
        let guard = FlushGuard(logger.clone());
        let mut res = self.inner.call(req).await;

        // HANDLING → FINALIZING. Response-time fields override same-keyed
        // request-time fields; tags concatenate, request-time first.
        logger.merge_fields(resolve_fields(self.settings.response_fields.as_ref(), res.headers()));
        logger.append_tags(resolve_tags(self.settings.response_tags.as_ref(), res.headers()));

        // FINALIZING → DONE. Exactly one flush per mode; finalize is
        // idempotent, so the explicit drop and any abnormal-path drop agree.
        drop(guard);

        res.extensions_mut().insert(logger);
        res.extensions_mut().insert(SuppressAccessLog(true));
        res
    }
}

/// Finalizes the request logger when dropped.
struct FlushGuard(RequestLogger);

impl Drop for FlushGuard {
    fn drop(&mut self) {
        self.0.finalize();
    }
}
