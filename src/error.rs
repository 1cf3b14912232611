use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid status '{0}': should be a number between 100 and 599")]
    InvalidStatus(String),
    #[error("Can't parse '{0}' as number")]
    InvalidDelay(String),
    #[error("{}: {}", path.display(), describe_io(source))]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed responses document: {0}")]
    MalformedDocument(#[source] serde_json::Error),
    #[error("No responses has been saved")]
    MissingResponse,
    #[error("Unknown view: {0}")]
    UnknownView(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AppError::FileAccess { path: path.into(), source }
    }
}

fn describe_io(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "file not found".to_string(),
        io::ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => err.to_string(),
    }
}
