//! Global error handling for snapfs
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Global error type for snapfs operations
#[derive(Error, Debug)]
pub enum SnapFsError {
    /// File system errors tied to a specific path
    #[error("IO error at {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal errors, including symbolic link loops
    #[error("Traversal error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Refusal to run in the current environment
    #[error("Refused: {0}")]
    Refused(String),

    /// Writer errors
    #[error("Writer error: {0}")]
    Writer(String),
}

/// Specialized Result type for snapfs operations
pub type Result<T> = std::result::Result<T, SnapFsError>;

/// Creates a SnapFsError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::SnapFsError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

/// Extension trait for attaching a path to IO errors
pub trait ResultExt<T> {
    /// Wrap an IO error together with the path it occurred at
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path<P: Into<PathBuf>>(self, path: P) -> Result<T> {
        self.map_err(|source| SnapFsError::Io {
            path: path.into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refuse(env: &str) -> Result<()> {
        ensure!(env != "production", Refused, "snapshot is disabled in {}", env);
        Ok(())
    }

    #[test]
    fn test_ensure_macro() {
        assert!(refuse("local").is_ok());
        let err = refuse("production").unwrap_err();
        assert_eq!(err.to_string(), "Refused: snapshot is disabled in production");
    }

    #[test]
    fn test_with_path() {
        let res: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = res.with_path("app/missing.php").unwrap_err();
        assert_eq!(err.to_string(), "IO error at app/missing.php: gone");
    }
}
