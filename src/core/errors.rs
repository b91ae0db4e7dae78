use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("path escapes the root directory: {0}")]
    PathTraversal(String),
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: Box<Error>,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("root directory unavailable: {}", .0.display())]
    RootUnavailable(PathBuf),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Wraps a failure of a mutating operation on `path`.
    pub fn invalid_path(path: impl Into<String>, source: Error) -> Self {
        Error::InvalidPath {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, looking through `InvalidPath` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::InvalidPath { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn is_traversal(&self) -> bool {
        matches!(self.root_cause(), Error::PathTraversal(_))
    }

    pub fn is_io(&self) -> bool {
        matches!(self.root_cause(), Error::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_sees_through_nested_wrappers() {
        let inner = Error::PathTraversal("../etc".to_string());
        let err = Error::invalid_path("a", Error::invalid_path("b", inner));
        assert!(err.is_traversal());
        assert!(!err.is_io());
    }

    #[test]
    fn io_errors_are_classified() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        let err = Error::invalid_path("upload.bin", Error::from(io));
        assert!(err.is_io());
        assert!(err.to_string().contains("upload.bin"));
    }
}
