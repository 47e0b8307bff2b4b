use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("result directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("no result files in {}", .0.display())]
    EmptyResultSet(PathBuf),
    #[error("malformed segment '{segment}' in '{filename}': expected exactly one '='")]
    MalformedSegment { filename: String, segment: String },
    #[error("parameter '{name}' appears more than once in '{filename}'")]
    DuplicateParameter { filename: String, name: String },
    #[error("inconsistent result label in '{filename}': expected '{expected}', found '{found}'")]
    InconsistentLabel {
        filename: String,
        expected: String,
        found: String,
    },
    #[error("unknown plot variant '{0}'")]
    UnknownVariant(String),
    #[error("extraction of {tag} from {} failed: {reason}", .path.display())]
    Extraction {
        path: PathBuf,
        tag: String,
        reason: String,
    },
    #[error("render of {} failed: {reason}", .output.display())]
    Render { output: PathBuf, reason: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
