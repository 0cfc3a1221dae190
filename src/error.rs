use std::path::PathBuf;
use thiserror::Error;

/// The main error type for yoloedit operations.
///
/// Every variant is recoverable at the call site that produced it: a failed
/// class edit is a no-op, a malformed record is skipped, and a failed file
/// operation only aborts the one image it was working on.
#[derive(Debug, Error)]
pub enum YoloEditError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access label file {path}: {source}")]
    LabelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to access class list {path}: {source}")]
    ClassesIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Class list {0} could not be read; refusing to rewrite labels")]
    ClassesUnavailable(PathBuf),

    #[error("Failed to read image dimensions for {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Class '{0}' already exists")]
    DuplicateClass(String),

    #[error("Class name must not be empty")]
    EmptyClassName,

    #[error("Unknown class: {0}")]
    UnknownClass(String),

    #[error("Malformed record on line {line}: {message}")]
    MalformedRecord { line: usize, message: String },

    #[error("Image is not part of the session: {0}")]
    ImageNotInSession(String),

    #[error("No image directory has been opened")]
    NoSessionRoot,

    #[error("Failed to traverse {path}: {message}")]
    Scan { path: PathBuf, message: String },
}
