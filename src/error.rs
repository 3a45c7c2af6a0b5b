//! Error types for the generator

use std::path::PathBuf;
use thiserror::Error;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GenError>;

/// Generator errors
#[derive(Error, Debug)]
pub enum GenError {
    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Invalid input {path}: {reason}")]
    InvalidInput { path: PathBuf, reason: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File is empty: {0}")]
    EmptyFile(PathBuf),

    #[error("Cyclic dependency between components: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("TypeScript parser error: {0}")]
    Parser(String),

    #[error("Conversion failed for {name}: {reason}")]
    Convert { name: String, reason: String },
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidInput { path: path.into(), reason: reason.into() }
    }
}
