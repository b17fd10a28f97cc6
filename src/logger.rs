//! The logger pair: [`Logger`] (emission configuration) and
//! [`RequestLogger`] (the per-request handle your handlers talk to).
//!
//! A `Logger` is cheap to clone and carries no request state — just the
//! minimum severity and the flows (sinks) events are written to. The
//! middleware pairs it with a fresh [`Buffer`](crate::buffer) for every
//! request and stores the resulting `RequestLogger` in the request
//! extensions, where handlers retrieve it:
//!
//! ```rust,no_run
//! use tome::RequestExt;
//!
//! async fn handler(req: http::Request<()>) -> http::Response<String> {
//!     let logger = req.logger();
//!     logger.info("starting request");
//!     logger.field("user", serde_json::json!("alice"));
//!     http::Response::new("Hello world!".to_owned())
//! }
//! ```
//!
//! Every `RequestLogger` method is a no-op after the request is finalized —
//! a handle that outlives its request cannot resurrect the buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::buffer::{Buffer, BufferingMode};
use crate::event::{Event, Message};
use crate::level::Level;
use crate::sink::{Sink, Stdout};

// ── Logger ────────────────────────────────────────────────────────────────────

/// Emission configuration: where events go and the minimum severity that
/// gets through. Both are fixed at construction.
#[derive(Clone)]
pub struct Logger {
    flows: Vec<Arc<dyn Sink>>,
    level: Level,
}

impl Logger {
    /// A logger emitting to `target`, dropping messages below `level`.
    pub fn new(target: impl Sink, level: Level) -> Self {
        Self { flows: vec![Arc::new(target)], level }
    }

    /// A logger that emits nothing. Used on the disabled-logging paths so
    /// downstream code can call logging methods unconditionally.
    pub fn null() -> Self {
        Self { flows: Vec::new(), level: Level::Info }
    }

    /// A logger around an already-shared sink, for device targets.
    pub(crate) fn from_flow(flow: Arc<dyn Sink>, level: Level) -> Self {
        Self { flows: vec![flow], level }
    }

    /// Adds another flow; every emitted event is written to all of them.
    pub fn flow(mut self, sink: impl Sink) -> Self {
        self.flows.push(Arc::new(sink));
        self
    }

    /// The minimum severity this logger emits.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The configured flows, for diagnostics.
    pub fn flows(&self) -> &[Arc<dyn Sink>] {
        &self.flows
    }

    /// Writes `event` to every flow. A failing flow is reported and skipped —
    /// emission also runs in cleanup paths where propagation is impossible,
    /// and one broken sink must not starve the others.
    pub(crate) fn emit(&self, event: &Event) {
        for flow in &self.flows {
            if let Err(e) = flow.emit(event) {
                error!(error = %e, "log sink write failed");
            }
        }
    }
}

impl Default for Logger {
    /// JSON lines to standard output at `Info`.
    fn default() -> Self {
        Self::new(Stdout, Level::Info)
    }
}

// ── RequestLogger ─────────────────────────────────────────────────────────────

/// The per-request logging handle.
///
/// Owns the request's single [`Buffer`] and implements the buffering-mode
/// semantics. Clones share the same buffer, so the copy stored in the request
/// extensions and the copy held by the middleware observe the same state.
#[derive(Clone)]
pub struct RequestLogger {
    inner: Arc<Inner>,
}

struct Inner {
    logger: Logger,
    mode: BufferingMode,
    buffer: Mutex<Option<Buffer>>,
}

impl RequestLogger {
    pub(crate) fn new(logger: Logger, mode: BufferingMode) -> Self {
        Self {
            inner: Arc::new(Inner { logger, mode, buffer: Mutex::new(Some(Buffer::new())) }),
        }
    }

    /// A handle bound to no request and no sink. Returned by
    /// [`RequestExt::logger`](crate::RequestExt::logger) when no middleware
    /// attached one — every call works, nothing is emitted.
    pub fn detached() -> Self {
        Self::new(Logger::null(), BufferingMode::Full)
    }

    /// The minimum severity that gets through.
    pub fn level(&self) -> Level {
        self.inner.logger.level()
    }

    /// The buffering mode, fixed for the lifetime of the request.
    pub fn mode(&self) -> BufferingMode {
        self.inner.mode
    }

    /// The underlying flows, for diagnostics.
    pub fn flows(&self) -> Vec<Arc<dyn Sink>> {
        self.inner.logger.flows().to_vec()
    }

    // ── Leveled logging ───────────────────────────────────────────────────────

    /// Logs one message at `level`. Messages below the logger's minimum are
    /// dropped. What happens next depends on the buffering mode: `Full`
    /// accumulates, `Data` emits immediately keeping fields/tags, `None`
    /// emits immediately and clears the buffer.
    pub fn log(&self, level: Level, text: impl Into<String>) {
        if level < self.inner.logger.level() {
            return;
        }
        let message = Message::new(level, text);

        let mut guard = self.lock();
        let Some(buffer) = guard.as_mut() else {
            debug!(text = %message.text, "log call after request finalization, dropped");
            return;
        };

        match self.inner.mode {
            BufferingMode::Full => buffer.push(message),
            BufferingMode::Data => {
                let event = Event::new(vec![message], buffer.fields.clone(), buffer.tags.clone());
                drop(guard);
                self.inner.logger.emit(&event);
            }
            BufferingMode::None => {
                let event = Event::new(vec![message], buffer.fields.clone(), buffer.tags.clone());
                buffer.clear();
                drop(guard);
                self.inner.logger.emit(&event);
            }
        }
    }

    pub fn debug(&self, text: impl Into<String>) { self.log(Level::Debug, text) }
    pub fn info(&self, text: impl Into<String>)  { self.log(Level::Info, text) }
    pub fn warn(&self, text: impl Into<String>)  { self.log(Level::Warn, text) }
    pub fn error(&self, text: impl Into<String>) { self.log(Level::Error, text) }
    pub fn fatal(&self, text: impl Into<String>) { self.log(Level::Fatal, text) }

    // ── Enrichment ────────────────────────────────────────────────────────────

    /// Sets one field on the buffer, overwriting an existing key.
    pub fn field(&self, key: impl Into<String>, value: impl Into<Value>) {
        if let Some(buffer) = self.lock().as_mut() {
            buffer.fields.insert(key.into(), value.into());
        }
    }

    /// Merges a set of fields into the buffer, overwriting by key.
    pub fn merge_fields(&self, fields: Map<String, Value>) {
        if let Some(buffer) = self.lock().as_mut() {
            buffer.merge_fields(fields);
        }
    }

    /// Appends one tag after any existing ones.
    pub fn tag(&self, tag: impl Into<String>) {
        if let Some(buffer) = self.lock().as_mut() {
            buffer.tags.push(tag.into());
        }
    }

    /// Appends tags after any existing ones, preserving their order.
    pub fn append_tags(&self, tags: Vec<String>) {
        if let Some(buffer) = self.lock().as_mut() {
            buffer.append_tags(tags);
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Releases the buffer, emitting the end-of-request event in `Full` mode.
    ///
    /// Idempotent: the buffer is taken on the first call, so even when both
    /// the normal path and the flush guard reach this, exactly one event is
    /// emitted per configured mode.
    pub(crate) fn finalize(&self) {
        let Some(buffer) = self.lock().take() else { return };
        if self.inner.mode == BufferingMode::Full {
            let event = Event::new(buffer.messages, buffer.fields, buffer.tags);
            self.inner.logger.emit(&event);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Buffer>> {
        // A poisoned mutex means a panic mid-append; the buffer is still
        // structurally sound, so recover it rather than poison the flush.
        self.inner.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
