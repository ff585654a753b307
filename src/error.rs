//! Error types for tour optimization.

use thiserror::Error;

/// Errors raised by tour primitives, operators and solver configuration.
///
/// Exhausting an iteration budget or failing to find an improving move is
/// never an error; those outcomes are reported through return values.
#[derive(Debug, Error)]
pub enum TourError {
    /// A tour mutation that cannot be applied (unknown predecessor,
    /// duplicate visit, removal of a fixed endpoint).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// An argument that does not match the problem it is used with.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Invalid solver configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for tour operations.
pub type Result<T> = std::result::Result<T, TourError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = TourError::InvalidOperation("visit 3 already in tour".into());
        assert_eq!(e.to_string(), "invalid operation: visit 3 already in tour");

        let e = TourError::Argument("tour is open".into());
        assert_eq!(e.to_string(), "invalid argument: tour is open");
    }

    #[test]
    fn test_toml_error_converts() {
        let err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let e: TourError = err.into();
        assert!(matches!(e, TourError::Toml(_)));
    }
}
