use crate::result::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Underlying causes carried by a failed [`OperationResult`](crate::result::OperationResult).
///
/// Each variant maps to exactly one [`ErrorCode`], so a cause alone is enough to
/// build the full result.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Item not found: {}", .0.display())]
    ItemNotFound(PathBuf),

    #[error("The item referenced by this canvas was not found: {}", .0.display())]
    ReferencedItemNotFound(PathBuf),

    #[error("The folder associated with this collection was not found: {}", .0.display())]
    CollectionFolderNotFound(PathBuf),

    #[error("Malformed reference file: {0}")]
    MalformedReference(String),

    #[error("Item is not a file: {}", .0.display())]
    ItemIsNotAFile(PathBuf),

    #[error("Displaying content for folders is not yet supported")]
    FoldersNotSupported,

    #[error("Couldn't display content for this file")]
    NoViewerAvailable,

    #[error("Couldn't retrieve clipboard data: {0}")]
    ClipboardUnavailable(String),

    #[error("Pasting {0} items at once is not supported")]
    MultipleItems(usize),

    #[error("Remote content can't be pasted directly: {0}")]
    RemoteContentUnsupported(String),

    #[error("Content is still being written: {}", .0.display())]
    InProgress(PathBuf),

    #[error("Operation was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl CanvasError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CanvasError::ItemNotFound(_)
            | CanvasError::ReferencedItemNotFound(_)
            | CanvasError::CollectionFolderNotFound(_) => ErrorCode::NotFound,
            CanvasError::ClipboardUnavailable(_) => ErrorCode::AccessUnauthorized,
            CanvasError::ItemIsNotAFile(_)
            | CanvasError::FoldersNotSupported
            | CanvasError::NoViewerAvailable
            | CanvasError::MultipleItems(_)
            | CanvasError::RemoteContentUnsupported(_) => ErrorCode::InvalidOperation,
            CanvasError::InProgress(_) => ErrorCode::InProgress,
            CanvasError::Cancelled => ErrorCode::Cancelled,
            CanvasError::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::NotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::AccessUnauthorized,
                std::io::ErrorKind::AlreadyExists => ErrorCode::AlreadyExists,
                _ => ErrorCode::Generic,
            },
            CanvasError::MalformedReference(_)
            | CanvasError::Serialization(_)
            | CanvasError::Config(_) => ErrorCode::Generic,
        }
    }
}

pub type Result<T> = std::result::Result<T, CanvasError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_kinds_map_to_codes() {
        let not_found = CanvasError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(not_found.code(), ErrorCode::NotFound);

        let denied = CanvasError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(denied.code(), ErrorCode::AccessUnauthorized);

        let other = CanvasError::Io(io::Error::other("disk on fire"));
        assert_eq!(other.code(), ErrorCode::Generic);
    }

    #[test]
    fn test_stale_reference_is_not_found() {
        let err = CanvasError::ReferencedItemNotFound(PathBuf::from("/tmp/x"));
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
