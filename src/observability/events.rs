//! Structured event stream for `vtshim`.
//!
//! Discrete, typed events describing transition lifecycles. Events are
//! serialized as newline-delimited JSON (JSONL) with a monotonically
//! increasing sequence number, so a run's settlement order can be
//! replayed from the file alone.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::transition::Phase;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted while transitions run.
///
/// Each variant is tagged with `"type"` when serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A transition was created by `start`.
    TransitionStarted {
        /// When the transition was created.
        timestamp: DateTime<Utc>,
        /// Coordinator-assigned id.
        transition_id: u64,
        /// Type tags at creation.
        types: Vec<String>,
    },

    /// One of a transition's signals settled.
    SignalSettled {
        /// When the settlement was observed.
        timestamp: DateTime<Utc>,
        /// Coordinator-assigned id.
        transition_id: u64,
        /// `updateCallbackDone`, `ready` or `finished`.
        signal: String,
        /// `fulfilled` or `rejected`.
        outcome: String,
        /// Rejection reason, when rejected.
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// A transition was skipped.
    TransitionSkipped {
        /// When the skip happened.
        timestamp: DateTime<Utc>,
        /// Coordinator-assigned id.
        transition_id: u64,
        /// Phase the transition was in when skipped.
        phase: Phase,
        /// Exception-style reason kind.
        reason_kind: String,
        /// Reason message.
        reason: String,
    },

    /// A transition ran to completion.
    TransitionFinished {
        /// When the transition finished.
        timestamp: DateTime<Utc>,
        /// Coordinator-assigned id.
        transition_id: u64,
        /// Frames spent animating.
        frames: u64,
    },

    /// A built-in scenario completed.
    ScenarioCompleted {
        /// When the scenario completed.
        timestamp: DateTime<Utc>,
        /// Scenario name.
        scenario: String,
        /// Frames run until the loop went idle.
        frames: u64,
        /// Whether the observed order matched the expected one.
        passed: bool,
    },
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as a single JSON line, and flushes the underlying
/// writer. Serialization or I/O failures are dropped.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates an emitter that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates an emitter that discards all events.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock() {
            if let Ok(line) = serde_json::to_string(&envelope) {
                let _ = writeln!(w, "{line}");
                let _ = w.flush();
            }
        }
    }

    /// Returns the number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
