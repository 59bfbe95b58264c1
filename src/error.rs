//! Error types for bgemm operations.
//!
//! Only malformed inputs at the API boundary are reported through [`BgemmError`]: a slice that
//! is too short for the shape it claims, a leading dimension smaller than the row count, or a
//! block configuration the kernel cannot run. Contract violations inside the kernel itself
//! (odd depth blocks, packed panels over capacity) are assertions and panic.

use thiserror::Error;

/// Errors that can occur while setting up a bgemm call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BgemmError {
    /// The backing slice does not cover the declared matrix shape.
    #[error("Invalid matrix view: {message} (rows: {rows}, cols: {cols}, ld: {ld}, len: {len})")]
    ShapeError {
        rows: usize,
        cols: usize,
        ld: usize,
        len: usize,
        /// Human-readable error message.
        message: String,
    },
    /// The cache blocking parameters cannot be used by the inner kernel.
    #[error("Invalid block configuration: {message} (kc: {kc}, mc: {mc})")]
    ConfigError {
        kc: usize,
        mc: usize,
        /// Human-readable error message.
        message: String,
    },
}

/// Result type alias for bgemm operations.
pub type Result<T> = std::result::Result<T, BgemmError>;

/// Creates a shape error.
pub fn shape_error(
    rows: usize,
    cols: usize,
    ld: usize,
    len: usize,
    message: impl Into<String>,
) -> BgemmError {
    BgemmError::ShapeError {
        rows,
        cols,
        ld,
        len,
        message: message.into(),
    }
}

/// Creates a block configuration error.
pub fn config_error(kc: usize, mc: usize, message: impl Into<String>) -> BgemmError {
    BgemmError::ConfigError {
        kc,
        mc,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_error_display() {
        let error = shape_error(9, 7, 8, 40, "leading dimension smaller than rows");
        let display = format!("{}", error);
        assert!(display.contains("Invalid matrix view"));
        assert!(display.contains("rows: 9"));
        assert!(display.contains("ld: 8"));
        assert!(display.contains("len: 40"));
        assert!(display.contains("leading dimension smaller than rows"));
    }

    #[test]
    fn test_config_error_display() {
        let error = config_error(31, 32, "kc must be even");
        let display = format!("{}", error);
        assert!(display.contains("Invalid block configuration"));
        assert!(display.contains("kc: 31"));
        assert!(display.contains("mc: 32"));
        assert!(display.contains("kc must be even"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = config_error(0, 32, "test");
        let error2 = config_error(0, 32, "test");
        let error3 = config_error(2, 32, "test");

        assert_eq!(error1, error2);
        assert_ne!(error1, error3);
    }

    #[test]
    fn test_error_trait_implementation() {
        let error = shape_error(1, 1, 1, 0, "test error");

        let _: &dyn std::error::Error = &error;
        assert!(std::error::Error::source(&error).is_none());
    }
}
