//! Injected logging interface.
//!
//! Components that report progress hold an `Rc<dyn Logger>` instead of
//! calling a global logger. [`NoopLogger`] is the default; [`TracingLogger`]
//! forwards to `tracing` under the `ensayo` target.

use std::rc::Rc;

/// Sink for human-readable training messages.
pub trait Logger {
    /// Informational message (epoch summaries, checkpoint paths).
    fn info(&self, message: &str);

    /// Low-priority message (separators, detail lines).
    fn verbose(&self, message: &str);

    /// Recoverable problem (a checkpoint that could not be written).
    fn warn(&self, message: &str);
}

/// Logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn info(&self, _message: &str) {}
    fn verbose(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
}

/// Logger backed by the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str) {
        tracing::info!(target: "ensayo", "{message}");
    }

    fn verbose(&self, message: &str) {
        tracing::debug!(target: "ensayo", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "ensayo", "{message}");
    }
}

/// Shared no-op logger used when nothing is injected.
pub(crate) fn noop() -> Rc<dyn Logger> {
    Rc::new(NoopLogger)
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingLogger;
    use super::*;

    #[test]
    fn test_noop_logger_accepts_everything() {
        let logger = noop();
        logger.info("a");
        logger.verbose("b");
        logger.warn("c");
    }

    #[test]
    fn test_tracing_logger_without_subscriber() {
        let logger = TracingLogger;
        logger.info("epoch 1");
        logger.warn("nothing installed");
    }

    #[test]
    fn test_recording_logger_levels() {
        let logger = RecordingLogger::default();
        logger.info("hello");
        logger.verbose("-");
        assert!(logger.contains("I hello"));
        assert!(logger.contains("V -"));
        assert_eq!(logger.lines.borrow().len(), 2);
    }
}
