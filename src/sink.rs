//! Emission targets — where flushed events go.
//!
//! A [`Sink`] is the last stop of an [`Event`]: the [`Logger`](crate::Logger)
//! hands it a finished event and the sink writes it somewhere. tome ships
//! three:
//!
//! | Sink | Writes to | Use for |
//! |---|---|---|
//! | [`Stdout`] | standard output, one JSON object per line | production (the default) |
//! | [`Memory`] | an in-process buffer, inspect via [`Memory::events`] | tests, introspection |
//! | [`Null`] | nowhere | the disabled-logging path |
//!
//! Implement [`Sink`] yourself to ship events anywhere else — a file, a
//! socket, a channel into an async exporter. The trait is one method.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::event::Event;

/// A destination for flushed log events.
///
/// `emit` is called once per event, after the event has been fully built —
/// sinks never see a half-filled buffer. I/O failures propagate to the
/// caller, which reports them without aborting the request.
pub trait Sink: Send + Sync + 'static {
    fn emit(&self, event: &Event) -> io::Result<()>;
}

// ── Stdout ────────────────────────────────────────────────────────────────────

/// Writes each event as a single JSON line to standard output.
///
/// The stdout handle is locked per event, so lines from concurrent requests
/// never interleave mid-object.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stdout;

impl Sink for Stdout {
    fn emit(&self, event: &Event) -> io::Result<()> {
        let mut out = io::stdout().lock();
        serde_json::to_writer(&mut out, &event.to_json())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

// ── Null ──────────────────────────────────────────────────────────────────────

/// Swallows every event.
///
/// Used when buffered logging is disabled: the middleware still attaches a
/// working logger so handlers can call logging methods unconditionally, but
/// nothing is ever written.
#[derive(Clone, Copy, Debug, Default)]
pub struct Null;

impl Sink for Null {
    fn emit(&self, _event: &Event) -> io::Result<()> {
        Ok(())
    }
}

// ── Memory ────────────────────────────────────────────────────────────────────

/// Captures every event in memory.
///
/// Cheap to clone — clones share the same capture buffer, so you can hand one
/// clone to a [`Logger`](crate::Logger) and keep another to assert on:
///
/// ```rust
/// use tome::sink::Memory;
///
/// let sink = Memory::new();
/// let captured = sink.clone();
/// // ... build a Logger with `sink`, run requests ...
/// assert!(captured.events().is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Memory {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every event captured so far, in emission order.
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events captured so far.
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for Memory {
    fn emit(&self, event: &Event) -> io::Result<()> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
