//! Silencing a co-resident legacy access-logger.
//!
//! Most hosting setups ship a default access log — one line per request,
//! Apache common-log style — installed outside your control. tome's
//! middleware already emits a structured event per request, so letting both
//! run means every request is logged twice.
//!
//! The fix is a conditional decorator, not a patch: [`apply`] wraps any
//! [`AccessLog`] so that it stays silent exactly when **both** hold for a
//! request:
//!
//! 1. the suppression flag ([`SuppressAccessLog`]) is set to `true`, and
//! 2. a [`RequestLogger`] is actually attached.
//!
//! Otherwise the wrapped logger behaves exactly as before — requests that
//! never passed through a tome middleware keep their normal access line.
//! [`apply`] is idempotent: wrapping an already-wrapped logger returns it
//! unchanged, so registration code may call it freely.

use std::io::{self, Write};
use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use http::{Extensions, Method, StatusCode, Version};
use tracing::error;

use crate::logger::RequestLogger;
use crate::middleware::SuppressAccessLog;

// ── AccessEntry ───────────────────────────────────────────────────────────────

/// Everything a legacy access-logger gets to see about a finished request.
///
/// `extensions` is the finished response's extension map — that is where the
/// buffered middleware leaves its suppression flag and logger reference.
pub struct AccessEntry<'a> {
    pub remote: Option<SocketAddr>,
    pub method: &'a Method,
    pub path: &'a str,
    pub version: Version,
    pub status: StatusCode,
    pub elapsed: Duration,
    pub extensions: &'a Extensions,
}

impl AccessEntry<'_> {
    /// True when the buffered middleware handled this request: suppression
    /// flag set and a buffered logger attached. If either is missing, a
    /// legacy logger should do its normal duty.
    fn handled_by_buffered_logger(&self) -> bool {
        self.extensions.get::<SuppressAccessLog>() == Some(&SuppressAccessLog(true))
            && self.extensions.get::<RequestLogger>().is_some()
    }
}

// ── AccessLog ─────────────────────────────────────────────────────────────────

/// A legacy per-request access-logger: one call per finished request.
pub trait AccessLog: Send + Sync + 'static {
    fn log(&self, entry: &AccessEntry<'_>);

    /// Identity check used by [`apply`] — `true` only for the silencing
    /// decorator itself. Not meant to be overridden elsewhere.
    #[doc(hidden)]
    fn silenced(&self) -> bool {
        false
    }
}

// ── CommonLog ─────────────────────────────────────────────────────────────────

/// The classic access-logger: one Apache common-log-format line per request.
///
/// ```text
/// 127.0.0.1 - - [29/Aug/2026:12:00:00 +0000] "GET / HTTP/1.1" 200 - 0.004
/// ```
///
/// This is the kind of logger [`apply`] exists to silence, but it works fine
/// standalone for apps that want nothing more.
pub struct CommonLog<W: Write + Send + 'static> {
    out: Mutex<W>,
}

impl CommonLog<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> CommonLog<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    fn write_line(&self, entry: &AccessEntry<'_>) -> io::Result<()> {
        let remote = entry
            .remote
            .map_or_else(|| "-".to_owned(), |addr| addr.ip().to_string());
        let version = match entry.version {
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_2 => "HTTP/2.0",
            _ => "HTTP/1.1",
        };
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(
            out,
            "{remote} - - [{}] \"{} {} {version}\" {} - {:.3}",
            Utc::now().format("%d/%b/%Y:%H:%M:%S %z"),
            entry.method,
            entry.path,
            entry.status.as_u16(),
            entry.elapsed.as_secs_f64(),
        )
    }
}

impl<W: Write + Send + 'static> AccessLog for CommonLog<W> {
    fn log(&self, entry: &AccessEntry<'_>) {
        if let Err(e) = self.write_line(entry) {
            error!(error = %e, "access log write failed");
        }
    }
}

// ── Silenced ──────────────────────────────────────────────────────────────────

/// The conditional decorator installed by [`apply`].
struct Silenced(Box<dyn AccessLog>);

impl AccessLog for Silenced {
    fn log(&self, entry: &AccessEntry<'_>) {
        if entry.handled_by_buffered_logger() {
            return;
        }
        self.0.log(entry);
    }

    fn silenced(&self) -> bool {
        true
    }
}

/// Wraps `log` so it stays silent for requests the buffered middleware
/// already logged. Idempotent — applying twice yields one decoration, checked
/// by identity rather than a counter.
pub fn apply(log: Box<dyn AccessLog>) -> Box<dyn AccessLog> {
    if log.silenced() {
        log
    } else {
        Box::new(Silenced(log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts emitted lines instead of writing them.
    struct Counting(Arc<AtomicUsize>);

    impl AccessLog for Counting {
        fn log(&self, _entry: &AccessEntry<'_>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn entry(extensions: &Extensions) -> AccessEntry<'_> {
        AccessEntry {
            remote: None,
            method: &Method::GET,
            path: "/",
            version: Version::HTTP_11,
            status: StatusCode::OK,
            elapsed: Duration::from_millis(4),
            extensions,
        }
    }

    fn counting() -> (Box<dyn AccessLog>, Arc<AtomicUsize>) {
        let lines = Arc::new(AtomicUsize::new(0));
        (Box::new(Counting(Arc::clone(&lines))), lines)
    }

    #[test]
    fn unmarked_requests_still_get_their_access_line() {
        let (log, lines) = counting();
        let log = apply(log);

        log.log(&entry(&Extensions::new()));
        assert_eq!(lines.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn flag_and_logger_together_silence_the_line() {
        let (log, lines) = counting();
        let log = apply(log);

        let mut extensions = Extensions::new();
        extensions.insert(SuppressAccessLog(true));
        extensions.insert(RequestLogger::detached());
        log.log(&entry(&extensions));
        assert_eq!(lines.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn flag_alone_is_not_enough() {
        let (log, lines) = counting();
        let log = apply(log);

        let mut extensions = Extensions::new();
        extensions.insert(SuppressAccessLog(true));
        log.log(&entry(&extensions));
        assert_eq!(lines.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn logger_without_flag_is_not_enough() {
        let (log, lines) = counting();
        let log = apply(log);

        let mut extensions = Extensions::new();
        extensions.insert(RequestLogger::detached());
        log.log(&entry(&extensions));
        assert_eq!(lines.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn apply_is_idempotent() {
        let (log, lines) = counting();
        let log = apply(apply(apply(log)));

        // Were the decorator stacked, this near-miss (flag without logger)
        // would still pass through each layer; one line proves one layer.
        log.log(&entry(&Extensions::new()));
        assert_eq!(lines.load(Ordering::SeqCst), 1);
        assert!(log.silenced());
    }

    #[test]
    fn common_log_writes_one_line() {
        let buf: Vec<u8> = Vec::new();
        let log = CommonLog::new(buf);
        log.log(&entry(&Extensions::new()));
        let written = log.out.lock().unwrap().clone();
        let line = String::from_utf8(written).unwrap();
        assert!(line.contains("\"GET / HTTP/1.1\" 200"));
        assert!(line.ends_with('\n'));
    }
}
