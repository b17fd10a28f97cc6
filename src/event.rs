//! The structured log event emitted by a flush.
//!
//! An [`Event`] is a self-contained snapshot: once it leaves the buffer it
//! owns its fields and tags, so later enrichment of the request buffer never
//! mutates an event that was already emitted.
//!
//! # Wire shape
//!
//! [`Event::to_json`] produces one JSON object per event. Resolved fields sit
//! at the top level; the reserved keys are written last and therefore win
//! over a field of the same name:
//!
//! ```json
//! {"zombie":"groan","robot":1001001,"@timestamp":"2026-08-29T12:00:00Z",
//!  "message":"Hello","tags":["foo","Request"]}
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::level::Level;

// ── Message ───────────────────────────────────────────────────────────────────

/// One discrete log line with its severity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn new(level: Level, text: impl Into<String>) -> Self {
        Self { level, text: text.into() }
    }
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// A structured log event: every message flushed together, plus the fields
/// and tags that were resolved up to the moment of the flush.
#[derive(Clone, Debug)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub fields: Map<String, Value>,
    pub tags: Vec<String>,
}

impl Event {
    /// Snapshots `messages`, `fields` and `tags` into an event stamped with
    /// the current time.
    pub fn new(messages: Vec<Message>, fields: Map<String, Value>, tags: Vec<String>) -> Self {
        Self { timestamp: Utc::now(), messages, fields, tags }
    }

    /// All message texts joined with `"\n"`, in logging order.
    pub fn message(&self) -> String {
        let mut out = String::new();
        for (i, msg) in self.messages.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&msg.text);
        }
        out
    }

    /// The on-the-wire JSON object. Fields first, reserved keys
    /// (`@timestamp`, `message`, `tags`) last — reserved keys win.
    pub fn to_json(&self) -> Value {
        let mut map = self.fields.clone();
        map.insert(
            "@timestamp".to_owned(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        map.insert("message".to_owned(), Value::String(self.message()));
        map.insert(
            "tags".to_owned(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(map)
    }
}
