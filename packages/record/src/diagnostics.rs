//! Reporting collaborator for dropped records and failed sources.
//!
//! Extraction code never configures or writes to a global logger for the
//! events a caller may want to inspect (rejected rows, unreachable
//! sources, unreadable files). It reports them to a [`Diagnostics`]
//! handle instead. [`LogDiagnostics`] forwards to the `log` facade;
//! [`MemoryDiagnostics`] keeps events for later inspection.

use std::sync::{Arc, Mutex, PoisonError};

use log::Level;

/// Receiver for leveled, human-readable events.
///
/// Implementations must be `Send + Sync` so one handle can be shared as an
/// `Arc` across a whole run.
pub trait Diagnostics: Send + Sync {
    /// Records an event.
    fn event(&self, level: Level, message: &str);

    /// Records a warning.
    fn warn(&self, message: &str) {
        self.event(Level::Warn, message);
    }

    /// Records an error.
    fn error(&self, message: &str) {
        self.event(Level::Error, message);
    }

    /// Records an informational event.
    fn info(&self, message: &str) {
        self.event(Level::Info, message);
    }
}

/// Forwards every event to the `log` facade.
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn event(&self, level: Level, message: &str) {
        log::log!(level, "{message}");
    }
}

/// Returns a shared [`LogDiagnostics`] instance.
#[must_use]
pub fn log_diagnostics() -> Arc<dyn Diagnostics> {
    Arc::new(LogDiagnostics)
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct MemoryDiagnostics {
    events: Mutex<Vec<(Level, String)>>,
}

impl MemoryDiagnostics {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of every event recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<(Level, String)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of events recorded at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn event(&self, level: Level, message: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_diagnostics_keeps_order_and_levels() {
        let diagnostics = MemoryDiagnostics::new();
        diagnostics.warn("row 3 skipped");
        diagnostics.info("read 2 rows");
        diagnostics.warn("row 5 skipped");

        let events = diagnostics.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], (Level::Warn, "row 3 skipped".to_string()));
        assert_eq!(diagnostics.count(Level::Warn), 2);
        assert_eq!(diagnostics.count(Level::Error), 0);
    }
}
