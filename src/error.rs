//! The crate-wide error type.
//!
//! Every fallible boundary in this crate returns [`Error`]; external error
//! types (`std::io::Error`, format-specific parse failures) are wrapped into
//! one of these variants at the point they cross into our code, never
//! propagated raw.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Config(String),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Format { path: PathBuf, message: String },

    #[error("{0}")]
    Geometry(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn geometry(message: impl Into<String>) -> Self {
        Error::Geometry(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal(message.into())
    }

    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Error::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_bare_message() {
        let err = Error::config("width must be positive");
        assert_eq!(err.to_string(), "width must be positive");
    }

    #[test]
    fn format_error_includes_path() {
        let err = Error::format("tile.las", "unsupported LAS version 2.0");
        assert!(err.to_string().starts_with("tile.las: "));
    }
}
