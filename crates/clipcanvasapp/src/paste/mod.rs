//! # Paste Models
//!
//! One model per content kind. A model holds the in-memory representation of a
//! canvas and knows how to fill it from storage ([`PasteModel::load_existing`]),
//! from an inbound payload ([`PasteModel::set_from_payload`]) and how to write
//! it back ([`PasteModel::save`]).
//!
//! Models never swallow failures: storage and payload errors come back as the
//! same [`OperationResult`] the collaborator produced.
//!
//! [`CanvasDisplay`] sits on top. It picks the model for a classified item, and
//! it drives a paste from payload to a new canvas in the collection.

mod display;
mod fallback;
mod image;
mod media;
mod text;
mod web;

pub use display::CanvasDisplay;
pub use fallback::FallbackModel;
pub use image::ImageModel;
pub use media::MediaModel;
pub use text::{MarkdownModel, TextModel};
pub use web::WebViewModel;

use crate::content_type::ContentType;
use crate::error::CanvasError;
use crate::payload::{PayloadFormat, PayloadSource};
use crate::reference::ReferenceFile;
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};
use serde::Serialize;
use std::path::PathBuf;

/// What a loaded canvas shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasView {
    Text(String),
    Markdown { source: String, html: String },
    Image { size: usize, extension: String },
    Media { path: PathBuf },
    Html(String),
    Website(String),
    File { path: PathBuf },
}

pub trait PasteModel {
    fn content_type(&self) -> ContentType;

    /// Extension (leading dot) for a new canvas holding this content.
    fn file_extension(&self) -> String;

    /// Read an existing canvas. Folders are rejected with `ItemIsNotAFile`.
    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult;

    /// Take the content from a payload that has not been stored yet.
    fn set_from_payload(
        &mut self,
        fs: &dyn FileSystem,
        payload: &dyn PayloadSource,
    ) -> OperationResult;

    /// Write the content to `file`.
    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult;

    fn view(&self) -> CanvasView;
}

/// The model for a classified content type. `Invalid` has none.
pub fn model_for(content_type: &ContentType) -> Option<Box<dyn PasteModel>> {
    match content_type {
        ContentType::Text => Some(Box::new(TextModel::default())),
        ContentType::Markdown => Some(Box::new(MarkdownModel::default())),
        ContentType::Image => Some(Box::new(ImageModel::default())),
        ContentType::Media => Some(Box::new(MediaModel::default())),
        ContentType::WebView { mode } => Some(Box::new(WebViewModel::new(*mode))),
        ContentType::Fallback => Some(Box::new(FallbackModel::default())),
        ContentType::Invalid { .. } => None,
    }
}

pub(crate) fn ensure_file(handle: &StorageHandle) -> Outcome<()> {
    if handle.is_folder() {
        return Err(CanvasError::ItemIsNotAFile(handle.path().to_path_buf()).into());
    }
    Ok(())
}

/// The payload's storage item, if it carries exactly one. More than one is an
/// error here; callers that accept several look at the payload themselves.
pub(crate) fn single_storage_item(payload: &dyn PayloadSource) -> Outcome<Option<StorageHandle>> {
    if !payload.contains(PayloadFormat::StorageItems) {
        return Ok(None);
    }
    let mut items = payload.get_storage_items()?;
    match items.len() {
        0 => Err(CanvasError::ClipboardUnavailable("no items to paste".to_string()).into()),
        1 => Ok(items.pop()),
        n => Err(CanvasError::MultipleItems(n).into()),
    }
}

/// Follow a pasted item to the file whose content it stands for.
pub(crate) fn payload_source_file(
    fs: &dyn FileSystem,
    item: &StorageHandle,
) -> Outcome<StorageHandle> {
    let source = if ReferenceFile::is_reference_file(item) {
        ReferenceFile::resolve(fs, item)?
    } else {
        item.clone()
    };
    if source.is_folder() {
        return Err(CanvasError::FoldersNotSupported.into());
    }
    Ok(source)
}

/// Bytes decoded as text, invalid sequences replaced.
pub(crate) fn read_lossy(fs: &dyn FileSystem, file: &StorageHandle) -> Outcome<String> {
    let bytes = fs.read_bytes(file, None)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::WebViewMode;
    use crate::payload::MemoryPayload;
    use crate::result::ErrorCode;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn test_every_valid_kind_has_a_model() {
        let kinds = [
            ContentType::Text,
            ContentType::Markdown,
            ContentType::Image,
            ContentType::Media,
            ContentType::WebView {
                mode: WebViewMode::ReadHtml,
            },
            ContentType::Fallback,
        ];
        for kind in kinds {
            let model = model_for(&kind).unwrap();
            assert_eq!(model.content_type().to_string(), kind.to_string());
        }
        assert!(model_for(&ContentType::invalid(OperationResult::success())).is_none());
    }

    #[test]
    fn test_every_model_rejects_folders() {
        let fs = MemBackend::new();
        let folder = fs.add_folder("/c");
        for kind in [
            ContentType::Text,
            ContentType::Markdown,
            ContentType::Image,
            ContentType::Media,
            ContentType::WebView {
                mode: WebViewMode::ReadWebsite,
            },
            ContentType::Fallback,
        ] {
            let mut model = model_for(&kind).unwrap();
            let result = model.load_existing(&fs, &folder);
            assert_eq!(result.code(), ErrorCode::InvalidOperation);
            assert!(matches!(result.cause(), Some(CanvasError::ItemIsNotAFile(_))));
        }
    }

    #[test]
    fn test_single_storage_item() {
        let a = StorageHandle::file("/c/a.txt");
        let b = StorageHandle::file("/c/b.txt");
        assert!(single_storage_item(&MemoryPayload::text("x")).unwrap().is_none());
        assert_eq!(
            single_storage_item(&MemoryPayload::items(vec![a.clone()])).unwrap(),
            Some(a.clone())
        );
        let err = single_storage_item(&MemoryPayload::items(vec![a, b])).unwrap_err();
        assert!(matches!(err.cause(), Some(CanvasError::MultipleItems(2))));
    }
}
