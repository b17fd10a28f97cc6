//! Typed middleware configuration.
//!
//! Everything the middleware can be told is a field on [`Settings`], applied
//! at construction — there is no process-wide mutable settings store to
//! race against. The defaults match what registration promises: JSON lines
//! to standard output, one event per request, no extra fields or tags.
//!
//! | option | type | effect |
//! |---|---|---|
//! | `target` | [`Target`] | `Disabled` turns buffered logging off; a prebuilt [`Logger`] is used directly; a device builds a new `Logger` |
//! | `level` | [`Level`] | minimum severity for device targets (default `Info`) |
//! | `buffering` | [`BufferingMode`] | flush timing, default `full` |
//! | `request_fields` / `request_tags` | spec or absent | merged before handling, against [`RequestInfo`] |
//! | `response_fields` / `response_tags` | spec or absent | merged after handling, against the response [`HeaderMap`] |
//!
//! ```rust
//! use tome::{BufferingMode, Level, Settings, TagSpec, Target};
//! use tome::sink::Stdout;
//!
//! let settings = Settings::default()
//!     .target(Target::device(Stdout))
//!     .level(Level::Debug)
//!     .buffering(BufferingMode::Data)
//!     .request_tags(["api"].into_iter().collect::<TagSpec<_>>());
//! ```

use std::sync::Arc;

use http::HeaderMap;

use crate::buffer::BufferingMode;
use crate::fields::{FieldSpec, TagSpec};
use crate::level::Level;
use crate::logger::{Logger, RequestLogger};
use crate::request::RequestInfo;
use crate::sink::{Sink, Stdout};

// ── Target ────────────────────────────────────────────────────────────────────

/// Where buffered request logs go.
#[derive(Clone)]
pub enum Target {
    /// Buffered logging is off for this app. This overrides everything else:
    /// even with logging enabled, requests get a no-op logger. The logger is
    /// still attached and the suppression flag still set — a disabled app
    /// logs nothing, not twice.
    Disabled,
    /// A prebuilt logger, used directly. Configure its level and flows
    /// yourself.
    Logger(Logger),
    /// A log device. The middleware builds a `Logger` around it at the
    /// configured level, or `Info` when none is set.
    Device(Arc<dyn Sink>),
}

impl Target {
    /// Shorthand for `Target::Device(Arc::new(sink))`.
    pub fn device(sink: impl Sink) -> Self {
        Self::Device(Arc::new(sink))
    }
}

// ── Settings ──────────────────────────────────────────────────────────────────

/// Middleware configuration. Build with [`Settings::default`] and the
/// chainable setters.
#[derive(Clone)]
pub struct Settings {
    pub(crate) logging: bool,
    pub(crate) target: Target,
    pub(crate) level: Option<Level>,
    pub(crate) buffering: BufferingMode,
    pub(crate) request_fields: Option<FieldSpec<RequestInfo>>,
    pub(crate) request_tags: Option<TagSpec<RequestInfo>>,
    pub(crate) response_fields: Option<FieldSpec<HeaderMap>>,
    pub(crate) response_tags: Option<TagSpec<HeaderMap>>,
}

impl Default for Settings {
    /// Logging enabled, JSON lines to standard output, full buffering,
    /// no field or tag specs.
    fn default() -> Self {
        Self {
            logging: true,
            target: Target::device(Stdout),
            level: None,
            buffering: BufferingMode::Full,
            request_fields: None,
            request_tags: None,
            response_fields: None,
            response_tags: None,
        }
    }
}

impl Settings {
    /// The host-level "logging enabled" switch. When off, requests still get
    /// a (no-op) logger — handlers never need to check.
    pub fn logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Minimum severity for loggers built from a device target. Ignored for
    /// `Target::Logger`, which carries its own level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    pub fn buffering(mut self, mode: BufferingMode) -> Self {
        self.buffering = mode;
        self
    }

    /// Fields merged into the buffer before the inner handler runs,
    /// resolved against the request.
    pub fn request_fields(mut self, spec: FieldSpec<RequestInfo>) -> Self {
        self.request_fields = Some(spec);
        self
    }

    /// Tags appended before the inner handler runs, resolved against the
    /// request.
    pub fn request_tags(mut self, spec: TagSpec<RequestInfo>) -> Self {
        self.request_tags = Some(spec);
        self
    }

    /// Fields merged into the buffer after the inner handler returns,
    /// resolved against the response headers. Override same-keyed request
    /// fields.
    pub fn response_fields(mut self, spec: FieldSpec<HeaderMap>) -> Self {
        self.response_fields = Some(spec);
        self
    }

    /// Tags appended after the inner handler returns, resolved against the
    /// response headers.
    pub fn response_tags(mut self, spec: TagSpec<HeaderMap>) -> Self {
        self.response_tags = Some(spec);
        self
    }

    /// Builds the per-request logger. Two independent switches gate real
    /// emission — the `logging` flag and the target, with `Target::Disabled`
    /// as an unconditional override — but a logger is always produced.
    pub(crate) fn request_logger(&self) -> RequestLogger {
        let logger = match &self.target {
            Target::Disabled => Logger::null(),
            _ if !self.logging => Logger::null(),
            Target::Logger(logger) => logger.clone(),
            Target::Device(sink) => {
                Logger::from_flow(Arc::clone(sink), self.level.unwrap_or(Level::Info))
            }
        };
        RequestLogger::new(logger, self.buffering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::Memory;

    #[test]
    fn default_target_is_stdout_full_buffering() {
        let settings = Settings::default();
        assert!(settings.logging);
        assert_eq!(settings.buffering, BufferingMode::Full);
        assert!(matches!(settings.target, Target::Device(_)));
        assert!(settings.request_fields.is_none());
        assert!(settings.response_tags.is_none());
    }

    #[test]
    fn disabled_target_builds_a_null_logger_even_with_logging_on() {
        let settings = Settings::default().logging(true).target(Target::Disabled);
        let logger = settings.request_logger();
        assert!(logger.flows().is_empty());
    }

    #[test]
    fn logging_off_builds_a_null_logger() {
        let sink = Memory::new();
        let settings = Settings::default()
            .logging(false)
            .target(Target::device(sink.clone()));
        let logger = settings.request_logger();
        assert!(logger.flows().is_empty());

        logger.error("never emitted");
        assert!(sink.is_empty());
    }

    #[test]
    fn device_target_uses_the_configured_level() {
        let settings = Settings::default()
            .target(Target::device(Memory::new()))
            .level(Level::Error);
        assert_eq!(settings.request_logger().level(), Level::Error);
    }

    #[test]
    fn device_target_defaults_to_info() {
        let settings = Settings::default().target(Target::device(Memory::new()));
        assert_eq!(settings.request_logger().level(), Level::Info);
    }

    #[test]
    fn prebuilt_logger_is_used_directly() {
        let logger = Logger::new(Memory::new(), Level::Debug);
        let settings = Settings::default().target(Target::Logger(logger)).level(Level::Fatal);
        // The prebuilt logger keeps its own level; `level` applies to devices.
        assert_eq!(settings.request_logger().level(), Level::Debug);
    }
}
