//! One-time registration wiring.
//!
//! [`register`] is the startup step that assembles the logging stack in one
//! call: it builds the [`Middleware`] around your handler and, if the host
//! environment carries its own legacy access-logger, wraps it with the
//! silencing decorator exactly once. Passing `None` for the access log is the
//! default posture — tome replaces the built-in access log rather than
//! running beside it.
//!
//! ```rust
//! use tome::{setup, Settings};
//! use tome::silence::{AccessLog, CommonLog};
//!
//! async fn handler(_req: http::Request<()>) -> http::Response<String> {
//!     http::Response::new("ok".to_owned())
//! }
//!
//! // The host insists on its own access log; register silences it for
//! // requests the middleware already logs.
//! let legacy: Box<dyn AccessLog> = Box::new(CommonLog::stdout());
//! let (app, access_log) = setup::register(handler, Settings::default(), Some(legacy));
//! # let _ = (app, access_log);
//! ```
//!
//! Both effects are idempotent and startup-scoped: settings are plain data
//! applied at construction, and re-wrapping an already-silenced access log
//! returns it unchanged.

use crate::config::Settings;
use crate::middleware::Middleware;
use crate::silence::{self, AccessLog};

/// Builds the middleware and silences the host's legacy access-logger, if any.
pub fn register<H>(
    inner: H,
    settings: Settings,
    access_log: Option<Box<dyn AccessLog>>,
) -> (Middleware<H>, Option<Box<dyn AccessLog>>) {
    (Middleware::new(inner, settings), access_log.map(silence::apply))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::silence::CommonLog;

    #[test]
    fn register_without_access_log_installs_none() {
        async fn handler(_req: http::Request<()>) -> http::Response<()> {
            http::Response::new(())
        }

        let (_, access_log) = register(handler, Settings::default(), None);
        assert!(access_log.is_none());
    }

    #[test]
    fn registering_twice_silences_once() {
        async fn handler(_req: http::Request<()>) -> http::Response<()> {
            http::Response::new(())
        }

        let legacy: Box<dyn AccessLog> = Box::new(CommonLog::new(Vec::new()));
        let (_, access_log) = register(handler, Settings::default(), Some(legacy));
        let (_, access_log) = register(handler, Settings::default(), access_log);

        assert!(access_log.unwrap().silenced());
    }
}
