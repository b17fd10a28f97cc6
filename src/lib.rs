//! # tome
//!
//! Buffered, per-request structured logging middleware for Rust HTTP
//! services. One request, one log event. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your log aggregator wants one structured event per request — every message
//! the handler logged, plus the context that explains it (fields, tags,
//! status) — not a line-by-line stream that interleaves across concurrent
//! requests. tome buffers per request and flushes when the response is known:
//!
//! - **Per-request logger** — attached to the request extensions; handlers
//!   retrieve it with [`RequestExt::logger`] and never check whether logging
//!   is enabled.
//! - **Field/tag enrichment** — literal or computed from the request before
//!   handling and from the response headers after, with deterministic
//!   precedence: response fields override request fields, tags concatenate
//!   request-first.
//! - **Buffering modes** — `full` (one event per request, the default),
//!   `data` (event per message, context accumulates), `none` (event per
//!   message, nothing carries over).
//! - **Access-log replacement** — a co-resident legacy access-logger is
//!   silenced for exactly the requests tome logs ([`silence::apply`]), so
//!   nothing is logged twice.
//!
//! What tome intentionally ignores: routing, transport, and how your log
//! events are stored or shipped. It speaks plain [`http`] types and writes
//! JSON lines; point a [`Sink`](sink::Sink) anywhere else yourself.
//!
//! ## Quick start
//!
//! ```rust
//! use serde_json::json;
//! use tome::{FieldSpec, Middleware, RequestExt, Settings};
//!
//! async fn hello(req: http::Request<()>) -> http::Response<String> {
//!     req.logger().info("handling request");
//!     http::Response::new("Hello world!".to_owned())
//! }
//!
//! let app = Middleware::new(
//!     hello,
//!     Settings::default().request_fields(FieldSpec::from(json!({
//!         "service": "hello",
//!     }))),
//! );
//! // hand `app.call(request)` to your server loop
//! ```
//!
//! ## Settings
//!
//! | option | type | effect |
//! |---|---|---|
//! | `target` | [`Target`] | `Disabled` \| prebuilt [`Logger`] \| log device |
//! | `level` | [`Level`] | minimum severity for device targets |
//! | `buffering` | [`BufferingMode`] | `full` \| `data` \| `none` |
//! | `request_fields` / `request_tags` | [`FieldSpec`] / [`TagSpec`] | merged before handling |
//! | `response_fields` / `response_tags` | [`FieldSpec`] / [`TagSpec`] | merged after handling |

mod buffer;
mod config;
mod event;
mod fields;
mod level;
mod logger;
mod middleware;
mod request;

pub mod setup;
pub mod silence;
pub mod sink;

pub use buffer::BufferingMode;
pub use config::{Settings, Target};
pub use event::{Event, Message};
pub use fields::{resolve_fields, resolve_tags, FieldSpec, FieldValue, TagSpec, TagValue};
pub use level::Level;
pub use logger::{Logger, RequestLogger};
pub use middleware::{BoxFuture, Handler, Middleware, RequestExt, SuppressAccessLog};
pub use request::RequestInfo;
