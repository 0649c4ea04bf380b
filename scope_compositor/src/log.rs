//! Internal logging system for the scope compositor
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - File and line information for detailed ERROR logs

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route compositor logs into the host's own log
/// (game console, file, overlay).
///
/// # Example
///
/// ```no_run
/// use scope_compositor::scope3d::log::{Logger, LogEntry};
///
/// struct ConsoleOverlay;
///
/// impl Logger for ConsoleOverlay {
///     fn log(&self, entry: &LogEntry) {
///         // Forward to the overlay...
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source component (e.g., "scope::RegionMerger")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-object detail inside a frame (light handles, plane values)
    Trace,

    /// Per-frame information
    Debug,

    /// Lifecycle events (initialization, shutdown, reallocation)
    Info,

    /// Recoverable problems (skipped copy, skipped light)
    Warn,

    /// Catastrophic problems caught at the orchestrator boundary
    Error,
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Debug => "DEBUG".cyan(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! scope_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::scope3d::Engine::log(
            $crate::scope3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! scope_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::scope3d::Engine::log(
            $crate::scope3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! scope_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::scope3d::Engine::log(
            $crate::scope3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! scope_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::scope3d::Engine::log(
            $crate::scope3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! scope_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::scope3d::Engine::log_detailed(
            $crate::scope3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR and build a `BackendError` carrying the same message
///
/// ```ignore
/// let tex = device.create_texture(desc)
///     .map_err(|e| scope_err!("scope::Merger", "backup failed: {}", e))?;
/// ```
#[macro_export]
macro_rules! scope_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::scope3d::Engine::log_detailed(
            $crate::scope3d::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::scope3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with a `BackendError`
#[macro_export]
macro_rules! scope_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::scope_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
