//! Error types for lazy values
//!
//! Loader errors are generic and never pass through this type; `LazyError`
//! only covers the crate's own configuration handling.

use thiserror::Error;

// == Lazy Error Enum ==
/// Errors raised by the crate itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LazyError {
    /// An environment variable holds a value that cannot be parsed
    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv {
        /// Name of the offending variable
        var: &'static str,
        /// Raw value found in the environment
        value: String,
    },
}

// == Result Type Alias ==
/// Convenience Result type for configuration handling.
pub type Result<T> = std::result::Result<T, LazyError>;

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_env_message() {
        let err = LazyError::InvalidEnv {
            var: "LAZY_TTL_MS",
            value: "soon".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid value for LAZY_TTL_MS: \"soon\"");
    }

    #[test]
    fn test_lazy_error_converts_into_anyhow() {
        let err: anyhow::Error = LazyError::InvalidEnv {
            var: "LAZY_RESET_TTL_ON_FAILURE",
            value: "maybe".to_string(),
        }
        .into();
        assert!(err.downcast_ref::<LazyError>().is_some());
    }
}
