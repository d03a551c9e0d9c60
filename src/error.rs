//! Error types for documentation requests
//!
//! Every failure a documentation request can end in is a `DocError`. Callers
//! only need to tell "not found" and bad input apart from everything else.

use thiserror::Error;

/// Main error type for fetch and build operations
#[derive(Error, Debug)]
pub enum DocError {
    /// No archive exists for any prefix of the requested path
    #[error("module {module}@{version} not found")]
    NotFound { module: String, version: String },

    /// Transport failure or unexpected status on a required call
    #[error("fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Corrupt or truncated zip archive
    #[error("archive error: {message}")]
    Archive { message: String },

    /// Malformed Go source file in the requested package
    #[error("parse error in file {file}: {message}")]
    Parse { file: String, message: String },

    /// Malformed go.mod file
    #[error("go.mod parse error in {file}:{line}: {message}")]
    ManifestParse {
        file: String,
        line: usize,
        message: String,
    },

    /// Malformed module path
    #[error("malformed module path {path:?}: {message}")]
    PathEncoding { path: String, message: String },

    /// IO errors on the temporary workspace
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker task panicked or was cancelled
    #[error("task error: {message}")]
    Task { message: String },
}

/// Result type alias for documentation operations
pub type DocResult<T> = Result<T, DocError>;

impl DocError {
    /// Whether the error should be reported as a missing module
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocError::NotFound { .. })
    }

    /// Whether the error was caused by the request itself rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(self, DocError::PathEncoding { .. })
    }
}

impl From<std::io::Error> for DocError {
    fn from(err: std::io::Error) -> Self {
        DocError::Io {
            source: err,
            message: "IO operation failed".to_string(),
        }
    }
}

impl From<zip::result::ZipError> for DocError {
    fn from(err: zip::result::ZipError) -> Self {
        DocError::Archive {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for DocError {
    fn from(err: tokio::task::JoinError) -> Self {
        DocError::Task {
            message: err.to_string(),
        }
    }
}

/// Helper trait for converting IO errors with context
pub trait IoContext<T> {
    fn with_io_context(self, message: &str) -> DocResult<T>;
}

impl<T> IoContext<T> for Result<T, std::io::Error> {
    fn with_io_context(self, message: &str) -> DocResult<T> {
        self.map_err(|e| DocError::Io {
            message: message.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let not_found = DocError::NotFound {
            module: "example.com/a".to_string(),
            version: "v1.0.0".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_client_error());

        let bad_path = DocError::PathEncoding {
            path: "!!".to_string(),
            message: "invalid escape".to_string(),
        };
        assert!(bad_path.is_client_error());
        assert!(!bad_path.is_not_found());

        let parse = DocError::Parse {
            file: "a.go".to_string(),
            message: "syntax error".to_string(),
        };
        assert!(!parse.is_not_found());
        assert!(!parse.is_client_error());
    }

    #[test]
    fn test_io_context_message() {
        let result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        let err = result.with_io_context("Failed to write archive").unwrap_err();
        assert_eq!(err.to_string(), "IO error: Failed to write archive");
    }
}
