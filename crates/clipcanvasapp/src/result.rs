//! # Operation Results
//!
//! Expected failures travel as values, not panics or opaque errors. Every
//! collaborator call and every engine operation reports an [`OperationResult`]:
//! a code, a human readable message and (optionally) the [`CanvasError`] that
//! caused it.
//!
//! [`OperationResult::is_success`] is the one success predicate. There is no
//! conversion to `bool`; call sites spell out what they check.
//!
//! Operations that also produce a value return [`Outcome<T>`], a plain `Result`
//! whose error side is always a non-success `OperationResult`, so `?` works as
//! usual.

use crate::error::CanvasError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    Success,
    NotFound,
    AccessUnauthorized,
    InvalidOperation,
    InProgress,
    AlreadyExists,
    Cancelled,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::Success => "Success",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::AccessUnauthorized => "AccessUnauthorized",
            ErrorCode::InvalidOperation => "InvalidOperation",
            ErrorCode::InProgress => "InProgress",
            ErrorCode::AlreadyExists => "AlreadyExists",
            ErrorCode::Cancelled => "Cancelled",
            ErrorCode::Generic => "Generic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct OperationResult {
    code: ErrorCode,
    message: String,
    cause: Option<Arc<CanvasError>>,
}

pub type Outcome<T> = std::result::Result<T, OperationResult>;

impl OperationResult {
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: String::new(),
            cause: None,
        }
    }

    /// A failure without an underlying cause.
    pub fn failure(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    /// A failure with an explicit message, keeping `cause` for callers that
    /// need to tell failures with the same code apart.
    pub fn with_cause(code: ErrorCode, message: impl Into<String>, cause: CanvasError) -> Self {
        Self {
            code,
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn cancelled() -> Self {
        CanvasError::Cancelled.into()
    }

    pub fn is_success(&self) -> bool {
        self.code == ErrorCode::Success
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&CanvasError> {
        self.cause.as_deref()
    }

    /// True when the failure means a reference file points at something that
    /// no longer exists, as opposed to the item itself being gone.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self.cause(), Some(CanvasError::ReferencedItemNotFound(_)))
    }

    pub fn is_collection_folder_missing(&self) -> bool {
        matches!(self.cause(), Some(CanvasError::CollectionFolderNotFound(_)))
    }

    /// Turns a status into an `Outcome`, for chaining with `?`.
    pub fn into_outcome(self) -> Outcome<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<CanvasError> for OperationResult {
    fn from(err: CanvasError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            cause: Some(Arc::new(err)),
        }
    }
}

impl From<std::io::Error> for OperationResult {
    fn from(err: std::io::Error) -> Self {
        CanvasError::Io(err).into()
    }
}

impl<T> From<Outcome<T>> for OperationResult {
    fn from(outcome: Outcome<T>) -> Self {
        match outcome {
            Ok(_) => OperationResult::success(),
            Err(result) => result,
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_success() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} (Error: {})", self.message, self.code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_success_predicate() {
        assert!(OperationResult::success().is_success());
        assert!(!OperationResult::failure(ErrorCode::Generic, "boom").is_success());
    }

    #[test]
    fn test_from_error_keeps_cause_and_code() {
        let result: OperationResult =
            CanvasError::ReferencedItemNotFound(PathBuf::from("/gone.png")).into();
        assert_eq!(result.code(), ErrorCode::NotFound);
        assert!(result.is_stale_reference());
        assert!(!result.is_collection_folder_missing());
        assert!(result.message().contains("/gone.png"));
    }

    #[test]
    fn test_outcome_conversion() {
        let ok: Outcome<u32> = Ok(3);
        assert!(OperationResult::from(ok).is_success());

        let err: Outcome<u32> = Err(OperationResult::cancelled());
        assert_eq!(OperationResult::from(err).code(), ErrorCode::Cancelled);
    }

    #[test]
    fn test_into_outcome() {
        assert!(OperationResult::success().into_outcome().is_ok());
        let failed = OperationResult::failure(ErrorCode::InProgress, "busy").into_outcome();
        assert_eq!(failed.unwrap_err().code(), ErrorCode::InProgress);
    }

    #[test]
    fn test_display_includes_code() {
        let result = OperationResult::failure(ErrorCode::NotFound, "Canvas missing");
        assert_eq!(result.to_string(), "Canvas missing (Error: NotFound)");
    }
}
