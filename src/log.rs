//! Leveled diagnostic sink handed to the engine entry point.
//!
//! The engine never writes to a global logger; callers pass a [`LogSink`]
//! and decide where messages go. [`TracingSink`] forwards to `tracing` when
//! the `tracing` feature is enabled.

use std::fmt;
use std::sync::Mutex;

/// Severity of a diagnostic message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Progress and summary counts.
    Info,
    /// A block was skipped for a recoverable reason.
    Warn,
    /// A block failed unexpectedly.
    Error,
}

/// Receiver for engine diagnostics. Must be shareable across worker threads.
pub trait LogSink: Sync {
    /// Records a single message.
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    /// Records an info-level message.
    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    /// Records a warning.
    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    /// Records an error.
    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }
}

/// Discards every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}

/// Forwards messages to the `tracing` crate under the `depix` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    #[cfg(feature = "tracing")]
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Info => tracing::info!(target: "depix", "{}", args),
            Level::Warn => tracing::warn!(target: "depix", "{}", args),
            Level::Error => tracing::error!(target: "depix", "{}", args),
        }
    }

    #[cfg(not(feature = "tracing"))]
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded messages in arrival order.
    pub fn entries(&self) -> Vec<(Level, String)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the messages recorded at `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(lvl, _)| *lvl == level)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let message = args.to_string();
        match self.entries.lock() {
            Ok(mut guard) => guard.push((level, message)),
            Err(poisoned) => poisoned.into_inner().push((level, message)),
        }
    }
}
