/*!
 * Structured Tracing
 * Logging setup and per-command spans using the tracing crate
 *
 * Features:
 * - `RUST_LOG` filtering with an `info` default
 * - JSON-formatted logs for structured parsing
 * - `log` records from the allocator bridged into the same output
 * - Per-command spans with duration and outcome fields
 */

use crate::core::limits::ENV_TRACE_JSON;
use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Commands slower than this are reported at warn level
const SLOW_COMMAND_MS: u128 = 10;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - MEMSPACE_TRACE_JSON: Enable JSON output (default: false)
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(ENV_TRACE_JSON)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
        debug!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .compact(),
            )
            .init();
        debug!("Structured tracing initialized");
    }
}

/// Span covering the execution of one shell command
pub struct CommandSpan {
    span: tracing::Span,
    start: Instant,
    command: String,
}

impl CommandSpan {
    pub fn new(command: &str, line: usize) -> Self {
        let span = span!(
            Level::DEBUG,
            "command",
            command = command,
            line = line,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
            error = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            command: command.to_string(),
        }
    }

    /// Record the command result
    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    /// Record an error
    pub fn record_error(&self, error: &str) {
        self.span.record("error", error);
        self.span.record("result", "error");
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for CommandSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if duration.as_millis() > SLOW_COMMAND_MS {
            warn!(
                command = %self.command,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow command detected"
            );
        } else {
            debug!(
                command = %self.command,
                duration_us = duration.as_micros() as u64,
                "command completed"
            );
        }
    }
}

/// Create a span for one shell command
pub fn span_command(command: &str, line: usize) -> CommandSpan {
    CommandSpan::new(command, line)
}
