//! Error types for the scope compositor
//!
//! This module defines the error types used throughout the compositor.
//! The variants follow the failure classes of a dual-pass frame: a missing
//! precondition, a resource whose size no longer matches, a host object that
//! failed its liveness check, and backend failures.

use std::fmt;

/// Result type for compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Compositor errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A precondition for the frame is not met (device, camera or scene root unavailable)
    PreconditionNotMet(String),

    /// A resource no longer matches the size of the live resource it mirrors
    SizeMismatch {
        /// Name of the resource that was being copied or merged
        resource: String,
        /// Size the compositor expected (width, height)
        expected: (u32, u32),
        /// Size the host reported (width, height)
        actual: (u32, u32),
    },

    /// A host object (light, bound, camera) failed its liveness check
    InvalidObject(String),

    /// Backend-specific error (device command or host draw failed)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, render target, geometry)
    InvalidResource(String),

    /// Initialization failed (configuration, backups, scratch textures)
    InitializationFailed(String),
}

impl Error {
    /// Whether the frame can simply be retried on the next invocation.
    ///
    /// Backend failures and memory exhaustion are the only catastrophic classes.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::BackendError(_) | Error::OutOfMemory)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PreconditionNotMet(msg) => write!(f, "Precondition not met: {}", msg),
            Error::SizeMismatch { resource, expected, actual } => write!(
                f,
                "Size mismatch on {}: expected {}x{}, got {}x{}",
                resource, expected.0, expected.1, actual.0, actual.1
            ),
            Error::InvalidObject(msg) => write!(f, "Invalid object: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
