//! Inbound paste payloads.
//!
//! A payload is whatever a paste action hands over: a bitmap, some text, or a
//! list of storage items. Where it comes from (system clipboard, drag and drop,
//! a test) is the host's business; the engine only sees [`PayloadSource`].

use crate::error::CanvasError;
use crate::result::{OperationResult, Outcome};
use crate::store::StorageHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    Bitmap,
    Text,
    StorageItems,
}

pub trait PayloadSource {
    fn contains(&self, format: PayloadFormat) -> bool;

    fn get_text(&self) -> Outcome<String>;

    fn get_storage_items(&self) -> Outcome<Vec<StorageHandle>>;

    /// Encoded image bytes (PNG for the system clipboard).
    fn get_bitmap(&self) -> Outcome<Vec<u8>>;
}

/// A payload held in memory. Used by hosts that already have the data, and by tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryPayload {
    text: Option<String>,
    bitmap: Option<Vec<u8>>,
    items: Option<Vec<StorageHandle>>,
    failure: Option<OperationResult>,
}

impl MemoryPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn bitmap(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bitmap: Some(bytes.into()),
            ..Default::default()
        }
    }

    pub fn items(items: Vec<StorageHandle>) -> Self {
        Self {
            items: Some(items),
            ..Default::default()
        }
    }

    /// Every getter fails with `failure` while `contains` keeps answering, as
    /// when another application holds the clipboard.
    pub fn failing_with(mut self, failure: OperationResult) -> Self {
        self.failure = Some(failure);
        self
    }

    fn get<T: Clone>(&self, value: &Option<T>, format: &str) -> Outcome<T> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        value
            .clone()
            .ok_or_else(|| CanvasError::ClipboardUnavailable(format!("no {} data", format)).into())
    }
}

impl PayloadSource for MemoryPayload {
    fn contains(&self, format: PayloadFormat) -> bool {
        match format {
            PayloadFormat::Bitmap => self.bitmap.is_some(),
            PayloadFormat::Text => self.text.is_some(),
            PayloadFormat::StorageItems => self.items.is_some(),
        }
    }

    fn get_text(&self) -> Outcome<String> {
        self.get(&self.text, "text")
    }

    fn get_storage_items(&self) -> Outcome<Vec<StorageHandle>> {
        self.get(&self.items, "storage item")
    }

    fn get_bitmap(&self) -> Outcome<Vec<u8>> {
        self.get(&self.bitmap, "bitmap")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorCode;

    #[test]
    fn test_formats() {
        let payload = MemoryPayload::text("hi");
        assert!(payload.contains(PayloadFormat::Text));
        assert!(!payload.contains(PayloadFormat::Bitmap));
        assert_eq!(payload.get_text().unwrap(), "hi");
        assert_eq!(
            payload.get_bitmap().unwrap_err().code(),
            ErrorCode::AccessUnauthorized
        );
    }

    #[test]
    fn test_failure_is_returned_unchanged() {
        let failure = OperationResult::failure(ErrorCode::Generic, "clipboard locked");
        let payload = MemoryPayload::text("hi").failing_with(failure);
        let err = payload.get_text().unwrap_err();
        assert_eq!(err.code(), ErrorCode::Generic);
        assert_eq!(err.message(), "clipboard locked");
    }
}
