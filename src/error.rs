//! Fatal error taxonomy for script generation
//!
//! The core components return these instead of terminating the process;
//! only `main` maps them to exit codes.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Path '{0}' is not valid or does not exist")]
    InvalidPath(PathBuf),
    #[error("Manifest directory '{0}' is not valid or does not exist")]
    InvalidManifestDir(PathBuf),
    #[error("Could not find manifest file '{name}' at '{dir}'")]
    ManifestNotFound { name: String, dir: PathBuf },
    #[error("Failed to deserialize manifest file '{path}': {source}")]
    ManifestParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unrecognizable file '{0}'. Expected a file with a '.zip' or '.tar.gz' extension")]
    UnsupportedArchive(String),
    #[error("Could not read directory '{path}': {source}")]
    UnreadableDirectory {
        path: PathBuf,
        source: anyhow::Error,
    },
    #[error("Could not write script to '{path}': {source}")]
    ScriptWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl GeneratorError {
    /// Process exit status for this failure class. Each fatal configuration
    /// error terminates with its own code so callers can tell them apart.
    pub fn exit_code(&self) -> i32 {
        match self {
            GeneratorError::InvalidPath(_) => 2,
            GeneratorError::InvalidManifestDir(_) | GeneratorError::ManifestNotFound { .. } => 3,
            GeneratorError::ManifestParse { .. } => 4,
            GeneratorError::UnsupportedArchive(_) => 5,
            GeneratorError::UnreadableDirectory { .. } => 6,
            GeneratorError::ScriptWrite { .. } => 1,
        }
    }
}
