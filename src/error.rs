//! Error types for the fallible outer shell
//!
//! Generation passes never fail; only loading configuration, validating
//! world dimensions and writing outputs can.

use thiserror::Error;

/// Errors surfaced by configuration and export.
#[derive(Error, Debug)]
pub enum GenError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for `Config`.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// World too small for the fixed ocean and underworld bands.
    #[error("invalid world dimensions {width}x{height} (minimum {min_width}x{min_height})")]
    InvalidDimensions {
        width: i32,
        height: i32,
        min_width: i32,
        min_height: i32,
    },

    /// Writing the preview image failed.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),

    /// Serializing the summary failed.
    #[error("summary export failed: {0}")]
    Summary(#[from] serde_json::Error),

    /// Writing an output file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_error_message() {
        let err = GenError::InvalidDimensions {
            width: 10,
            height: 20,
            min_width: 1000,
            min_height: 600,
        };
        assert_eq!(
            err.to_string(),
            "invalid world dimensions 10x20 (minimum 1000x600)"
        );
    }

    #[test]
    fn test_parse_error_converts() {
        let parsed: std::result::Result<toml::Value, _> = toml::from_str("not = [valid");
        let err: GenError = parsed.unwrap_err().into();
        assert!(matches!(err, GenError::ConfigParse(_)));
    }
}
