//! Error types for the stockrank workspace.
//!
//! The scoring core itself is total and never fails; these errors cover the
//! boundary: reading configuration and snapshots, validating options, and
//! writing reports.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using the stockrank error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for stockrank crates.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Snapshot could not be read or understood
    #[error("Invalid snapshot: {0}")]
    Snapshot(String),

    /// Invalid input or request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Check if this error came from configuration loading or validation.
    pub fn is_config(&self) -> bool {
        match self {
            Self::Config(_) | Self::Validation(_) => true,
            Self::WithContext { source, .. } => source.is_config(),
            _ => false,
        }
    }

    /// Process exit code for the command line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) => 78,
            Self::Snapshot(_) | Self::InvalidInput(_) | Self::Json(_) => 65,
            Self::Io(_) => 74,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(Error::Config("bad".into()).exit_code(), 78);
        assert_eq!(Error::Snapshot("bad".into()).exit_code(), 65);
        assert_eq!(Error::InvalidInput("bad".into()).exit_code(), 65);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert_eq!(Error::from(io).exit_code(), 74);
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::Config("portfolio_size".into());
        let with_ctx = err.with_context("loading config.json");
        assert!(matches!(with_ctx, Error::WithContext { .. }));
        assert!(with_ctx.is_config());
        assert_eq!(with_ctx.exit_code(), 78);
        assert!(with_ctx.to_string().starts_with("loading config.json"));
    }

    #[test]
    fn test_result_ext_context() {
        let parsed: std::result::Result<u32, serde_json::Error> = serde_json::from_str("nope");
        let err = parsed.context("parsing snapshot").unwrap_err();
        assert!(!err.is_config());
        assert!(err.to_string().contains("parsing snapshot"));
    }
}
