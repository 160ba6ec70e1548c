//! Error types for the Galaxy3D compositor
//!
//! Errors fall into four families: configuration errors (raised while
//! compiling a pipeline), per-frame resource errors, frame aborts, and
//! contract violations (logic defects in the caller).

use std::fmt;

/// Result type for Galaxy3D compositor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Galaxy3D compositor errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource or invalid input (missing mesh, bad size, etc.)
    InvalidResource(String),

    /// Initialization failed (device, providers)
    InitializationFailed(String),

    /// Pipeline description rejected at compile time
    Configuration(String),

    /// An attachment could not be reclaimed from in-flight GPU work in time
    ResourceExhausted(String),

    /// The frame was cancelled before all passes were recorded
    FrameAborted(String),

    /// An API was used out of order (draw before shader, execute before prepare)
    ContractViolation(String),
}

impl Error {
    /// Whether the error must stop the current frame (as opposed to a skipped draw)
    pub fn is_frame_fatal(&self) -> bool {
        matches!(
            self,
            Error::ResourceExhausted(_)
                | Error::FrameAborted(_)
                | Error::ContractViolation(_)
                | Error::OutOfMemory
                | Error::BackendError(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::ResourceExhausted(msg) => write!(f, "Resource exhausted: {}", msg),
            Error::FrameAborted(msg) => write!(f, "Frame aborted: {}", msg),
            Error::ContractViolation(msg) => write!(f, "Contract violation: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
