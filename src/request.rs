//! Request-time resolution context.
//!
//! Computed field and tag rules run before the inner handler, but the request
//! itself must move into that handler untouched. [`RequestInfo`] is the owned
//! snapshot the rules see instead: method, path, query, version and headers —
//! everything a log rule legitimately wants, nothing it could mutate.
//!
//! The middleware builds one snapshot per request, and only when a
//! request-time spec is actually configured.

use http::{HeaderMap, Method, Version};

/// A read-only snapshot of an inbound request, handed to computed
/// `request_fields` / `request_tags` rules.
#[derive(Clone, Debug)]
pub struct RequestInfo {
    method: Method,
    path: String,
    query: Option<String>,
    version: Version,
    headers: HeaderMap,
}

impl RequestInfo {
    /// Snapshots `req`. The body is never read.
    pub fn new<B>(req: &http::Request<B>) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_owned(),
            query: req.uri().query().map(str::to_owned),
            version: req.version(),
            headers: req.headers().clone(),
        }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }

    /// Case-insensitive header lookup; non-UTF-8 values read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
