//! The per-request accumulator and its flush policy.
//!
//! Exactly one [`Buffer`] exists per request. It is created when the
//! middleware sees the request and released when the response is known. What
//! happens in between is governed by [`BufferingMode`]:
//!
//! | Mode | Messages | Fields / tags | Events per request |
//! |---|---|---|---|
//! | `Full` | held until the end | accumulate | exactly one |
//! | `Data` | emitted immediately | accumulate | one per log call |
//! | `None` | emitted immediately | cleared after every message | one per log call |

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::event::Message;

// ── BufferingMode ─────────────────────────────────────────────────────────────

/// When and how often the buffer flushes to emitted events.
///
/// Fixed for the lifetime of a request's logger — the mode never changes
/// mid-request.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum BufferingMode {
    /// One event at end of request containing every message, field and tag.
    /// This is the default: one request, one log event.
    #[default]
    Full,
    /// Fields and tags accumulate across the request, but every logged
    /// message emits its own event immediately, carrying whatever has been
    /// accumulated so far.
    Data,
    /// Every logged message emits immediately and the buffer is cleared right
    /// after — fields and tags do not persist across messages.
    None,
}

impl BufferingMode {
    /// Returns the lowercase configuration name (`"full"`, `"data"`, `"none"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Full => "full",
            Self::None => "none",
        }
    }
}

/// Parses a mode name, case-insensitively.
impl FromStr for BufferingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "data" => Ok(Self::Data),
            "full" => Ok(Self::Full),
            "none" => Ok(Self::None),
            _      => Err(()),
        }
    }
}

impl fmt::Display for BufferingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Buffer ────────────────────────────────────────────────────────────────────

/// The per-request accumulator: named fields, ordered tags, leveled messages.
///
/// Fields are last-write-wins on conflicting keys. Tags preserve insertion
/// order and permit duplicates. Owned exclusively by one request's logger.
#[derive(Clone, Debug, Default)]
pub(crate) struct Buffer {
    pub(crate) fields: Map<String, Value>,
    pub(crate) tags: Vec<String>,
    pub(crate) messages: Vec<Message>,
}

impl Buffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Merges `fields` in, overwriting existing keys.
    pub(crate) fn merge_fields(&mut self, fields: Map<String, Value>) {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
    }

    /// Appends `tags` after any existing ones.
    pub(crate) fn append_tags(&mut self, tags: Vec<String>) {
        self.tags.extend(tags);
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Drops everything: fields, tags and messages.
    pub(crate) fn clear(&mut self) {
        self.fields.clear();
        self.tags.clear();
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use serde_json::json;

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("full".parse(), Ok(BufferingMode::Full));
        assert_eq!("DATA".parse(), Ok(BufferingMode::Data));
        assert_eq!("none".parse(), Ok(BufferingMode::None));
        assert_eq!("buffered".parse::<BufferingMode>(), Err(()));
        assert_eq!(BufferingMode::default().to_string(), "full");
    }

    #[test]
    fn fields_are_last_write_wins() {
        let mut buffer = Buffer::new();
        let mut first = Map::new();
        first.insert("status".to_owned(), json!(200));
        first.insert("path".to_owned(), json!("/"));
        buffer.merge_fields(first);

        let mut second = Map::new();
        second.insert("status".to_owned(), json!(500));
        buffer.merge_fields(second);

        assert_eq!(buffer.fields["status"], json!(500));
        assert_eq!(buffer.fields["path"], json!("/"));
    }

    #[test]
    fn tags_preserve_order_and_duplicates() {
        let mut buffer = Buffer::new();
        buffer.append_tags(vec!["a".to_owned(), "b".to_owned()]);
        buffer.append_tags(vec!["a".to_owned()]);
        assert_eq!(buffer.tags, ["a", "b", "a"]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut buffer = Buffer::new();
        buffer.merge_fields(Map::from_iter([("k".to_owned(), json!(1))]));
        buffer.append_tags(vec!["t".to_owned()]);
        buffer.push(Message::new(Level::Info, "m"));
        buffer.clear();
        assert!(buffer.fields.is_empty());
        assert!(buffer.tags.is_empty());
        assert!(buffer.messages.is_empty());
    }
}
