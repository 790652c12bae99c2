//! Error handling for the fractal-collections library
//!
//! Every fallible operation in the crate returns [`Result`], carrying a
//! [`CollectionError`] that names the contract that was broken.

use thiserror::Error;

/// Main error type for the fractal-collections library
#[derive(Error, Debug)]
pub enum CollectionError {
    /// The view or store does not support the requested operation
    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation
        operation: String,
    },

    /// An argument did not designate a valid element or position
    #[error("Illegal argument: {message}")]
    IllegalArgument {
        /// Error message describing the argument
        message: String,
    },

    /// The operation is not valid in the current state
    #[error("Illegal state: {message}")]
    IllegalState {
        /// Error message describing the state
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

    /// A task of a parallel bulk operation failed or panicked
    #[error("Worker failure: {message}")]
    WorkerFailure {
        /// Failure reported by the worker
        message: String,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollectionError {
    /// Create an unsupported operation error
    pub fn unsupported<S: Into<String>>(operation: S) -> Self {
        Self::UnsupportedOperation {
            operation: operation.into(),
        }
    }

    /// Create an illegal argument error
    pub fn illegal_argument<S: Into<String>>(message: S) -> Self {
        Self::IllegalArgument {
            message: message.into(),
        }
    }

    /// Create an illegal state error
    pub fn illegal_state<S: Into<String>>(message: S) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a worker failure error
    pub fn worker_failure<S: Into<String>>(message: S) -> Self {
        Self::WorkerFailure {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::WorkerFailure { .. } => true,
            Self::UnsupportedOperation { .. } => false,
            Self::IllegalArgument { .. } => false,
            Self::IllegalState { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::UnsupportedOperation { .. } => "unsupported",
            Self::IllegalArgument { .. } => "argument",
            Self::IllegalState { .. } => "state",
            Self::OutOfBounds { .. } => "bounds",
            Self::WorkerFailure { .. } => "worker",
            Self::Configuration { .. } => "config",
            Self::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(CollectionError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a range is within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start > end {
        return Err(CollectionError::illegal_argument(format!(
            "Invalid range: start {} > end {}",
            start, end
        )));
    }
    if end > size {
        return Err(CollectionError::out_of_bounds(end, size));
    }
    Ok(())
}
