//! User-facing progress and failure messages.
//!
//! The client reports through an injected [`Logger`] instead of printing, so
//! embedders decide where messages go and tests can capture them.

/// Sink for client messages.
pub trait Logger {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards messages to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLogger;

impl Logger for LogLogger {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}
