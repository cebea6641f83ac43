//! Error types for the fallible parts of the crate.
//!
//! The compute kernels themselves never fail: their preconditions are caller
//! obligations. Configuration, buffer allocation and data movement do report
//! errors, so applications can reject bad input instead of panicking.

use std::fmt;

/// Errors that can occur while configuring the kernel or managing its buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrmmError {
    /// Memory allocation failed.
    AllocationError {
        /// The size that was requested to be allocated.
        requested_size: usize,
        /// The alignment that was requested.
        requested_alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Invalid layout parameters were provided.
    LayoutError {
        /// The size parameter that caused the error.
        size: usize,
        /// The alignment parameter that caused the error.
        alignment: usize,
        /// Human-readable error message.
        message: String,
    },
    /// Input validation error (dimensions, buffer lengths, array shapes).
    ValidationError {
        /// Human-readable error message.
        message: String,
    },
    /// A kernel configuration that cannot be honoured.
    ConfigError {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for TrmmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrmmError::AllocationError {
                requested_size,
                requested_alignment,
                message,
            } => write!(
                f,
                "Memory allocation failed: {} (requested {} bytes with {} byte alignment)",
                message, requested_size, requested_alignment
            ),
            TrmmError::LayoutError {
                size,
                alignment,
                message,
            } => write!(
                f,
                "Invalid memory layout: {} (size: {}, alignment: {})",
                message, size, alignment
            ),
            TrmmError::ValidationError { message } => {
                write!(f, "Validation error: {}", message)
            }
            TrmmError::ConfigError { parameter, message } => {
                write!(f, "Invalid configuration for `{}`: {}", parameter, message)
            }
        }
    }
}

impl std::error::Error for TrmmError {}

/// Result type alias for trmm operations.
pub type Result<T> = std::result::Result<T, TrmmError>;

/// Creates an allocation error.
pub fn allocation_error(size: usize, alignment: usize, message: impl Into<String>) -> TrmmError {
    TrmmError::AllocationError {
        requested_size: size,
        requested_alignment: alignment,
        message: message.into(),
    }
}

/// Creates a layout error.
pub fn layout_error(size: usize, alignment: usize, message: impl Into<String>) -> TrmmError {
    TrmmError::LayoutError {
        size,
        alignment,
        message: message.into(),
    }
}

/// Creates a validation error.
pub fn validation_error(message: impl Into<String>) -> TrmmError {
    TrmmError::ValidationError {
        message: message.into(),
    }
}

/// Creates a configuration error.
pub fn config_error(parameter: &'static str, message: impl Into<String>) -> TrmmError {
    TrmmError::ConfigError {
        parameter,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_error_display() {
        let error = allocation_error(1024, 32, "out of memory");
        let display = format!("{}", error);
        assert!(display.contains("Memory allocation failed"));
        assert!(display.contains("1024 bytes"));
        assert!(display.contains("32 byte alignment"));
        assert!(display.contains("out of memory"));
    }

    #[test]
    fn test_layout_error_display() {
        let error = layout_error(1000, 31, "alignment must be power of two");
        let display = format!("{}", error);
        assert!(display.contains("Invalid memory layout"));
        assert!(display.contains("size: 1000"));
        assert!(display.contains("alignment: 31"));
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_error("B must hold m * n elements");
        let display = format!("{}", error);
        assert!(display.contains("Validation error"));
        assert!(display.contains("B must hold m * n elements"));
    }

    #[test]
    fn test_config_error_display() {
        let error = config_error("block_size", "must be positive");
        let display = format!("{}", error);
        assert!(display.contains("`block_size`"));
        assert!(display.contains("must be positive"));
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(
            config_error("order", "x"),
            config_error("order", "x")
        );
        assert_ne!(
            allocation_error(1024, 32, "test"),
            allocation_error(2048, 32, "test")
        );
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = validation_error("test error");
        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
