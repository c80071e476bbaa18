//! Error types for the Kino level selector

use thiserror::Error;

/// Result type alias for level selector operations
pub type Result<T> = std::result::Result<T, Error>;

/// Level selector error types
#[derive(Error, Debug)]
pub enum Error {
    /// A callback-shaped option is present but cannot be invoked
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Configuration loading errors
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error for a callback option that is not invocable
    pub fn not_invocable(option: &str, detail: &str) -> Self {
        Error::InvalidConfig(format!("{option} must be a function ({detail})"))
    }

    /// Returns true if this error came from configuration (as opposed to IO)
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidConfig(_) | Error::ConfigParse(_))
    }

    /// Returns a stable error code for reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::ConfigParse(_) => "CONFIG_PARSE",
            Error::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_invocable_message() {
        let err = Error::not_invocable("labelCallback", "found number");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: labelCallback must be a function (found number)"
        );
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(err.is_config_error());
    }

    #[test]
    fn test_io_is_not_config_error() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(!err.is_config_error());
        assert_eq!(err.error_code(), "IO");
    }
}
