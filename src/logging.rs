//! Diagnostic logging
//!
//! stdout carries the JSON response, so every log line goes to stderr.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::{DEFAULT_LOG_FILTER, LOG_FILTER_ENV, LOG_FORMAT_ENV};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directives
    pub filter: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var(LOG_FILTER_ENV).ok(),
            std::env::var(LOG_FORMAT_ENV).ok(),
        )
    }

    fn from_values(filter: Option<String>, format: Option<String>) -> Self {
        Self {
            filter: filter
                .filter(|f| !f.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            json: format.is_some_and(|f| f.eq_ignore_ascii_case("json")),
        }
    }
}

/// Installs the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn init(settings: &LogSettings) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if settings.json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(writer))
            .init();
    }

    guard
}
