//! Error handling for the groundwork library
//!
//! Every fallible container operation returns [`Result`]. Failures are
//! logged at the call site through the `log` facade and propagated to the
//! caller; a failed operation leaves its container in a valid state.

use thiserror::Error;

/// Main error type for the groundwork library
#[derive(Error, Debug)]
pub enum GroundworkError {
    /// Invalid construction parameter or argument
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the rejected parameter
        message: String,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Memory allocation failure
    #[error("Memory allocation failed: requested {size} bytes")]
    OutOfMemory {
        /// Number of bytes requested
        size: usize,
    },

    /// Internal invariant violated (defensive; unreachable in correct use)
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Description of the violated invariant
        message: String,
    },
}

impl GroundworkError {
    /// Create an invalid configuration error
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create an out of memory error
    pub fn out_of_memory(size: usize) -> Self {
        Self::OutOfMemory { size }
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(message: S) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::OutOfMemory { .. } => true,
            Self::InvalidConfig { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::InvalidState { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "config",
            Self::OutOfBounds { .. } => "bounds",
            Self::OutOfMemory { .. } => "memory",
            Self::InvalidState { .. } => "state",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GroundworkError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(GroundworkError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}
