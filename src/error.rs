use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while saving or loading a project file
#[derive(Debug, Error)]
pub enum ProjectFileError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid project file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported project version {found} (this build reads {supported}.x)")]
    UnsupportedVersion { found: String, supported: u64 },

    #[error("Path cannot be stored in a project file: {0}")]
    InvalidPath(PathBuf),
}

impl ProjectFileError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type ProjectFileResult<T> = Result<T, ProjectFileError>;

/// Errors that prevent emitting valid Python
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("'{name}' is not a valid Python identifier ({context})")]
    InvalidIdentifier { name: String, context: String },

    #[error("Parameter '{name}' is used more than once")]
    DuplicateParameter { name: String },

    #[error("'{name}' clashes with a name used inside the generated function")]
    ReservedName { name: String },
}
