//! # API Facade
//!
//! [`CanvasApi`] is the single entry point a UI talks to. It plays the display
//! coordinator: it owns the collection, the canvas display and the cancellation
//! token of the navigation in flight.
//!
//! ## Role and Responsibilities
//!
//! - **Serializes navigation**: every navigation cancels the previous token
//!   before issuing a new one, so at most one load is live per collection.
//! - **Guards preconditions**: `back`/`next` are checked with
//!   `has_back`/`has_next` before the collection is asked to move.
//! - **Normalizes inputs**: display indexes are 1-based, oldest canvas first.
//! - **Returns structured types**: [`OperationResult`], [`Outcome`],
//!   [`NavigationState`], [`CanvasSummary`]. Never strings for a terminal.
//!
//! ## Generic Over FileSystem
//!
//! `CanvasApi<F: FileSystem>`:
//! - Production: `CanvasApi<FsBackend>`
//! - Testing: `CanvasApi<MemBackend>`

use crate::collection::{CollectionConfiguration, CollectionModel};
use crate::config::CanvasConfig;
use crate::content_type::{classify_handle, ContentType};
use crate::error::CanvasError;
use crate::events::CollectionEvent;
use crate::paste::{CanvasDisplay, CanvasView};
use crate::payload::PayloadSource;
use crate::result::{ErrorCode, OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};
use async_channel::Receiver;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Where the cursor stands, for enabling navigation controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationState {
    /// 1-based index of the open canvas; `None` on the new canvas.
    pub current: Option<usize>,
    pub total: usize,
    pub has_back: bool,
    pub has_next: bool,
}

/// One row of a collection listing.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasSummary {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
    pub created_at: Option<DateTime<Utc>>,
    pub content_type: String,
    pub is_reference: bool,
    pub is_current: bool,
}

pub struct CanvasApi<F: FileSystem> {
    collection: CollectionModel<F>,
    display: CanvasDisplay,
    navigation: CancellationToken,
}

impl<F: FileSystem> CanvasApi<F> {
    pub fn new(collection: CollectionModel<F>, display: CanvasDisplay) -> Self {
        Self {
            collection,
            display,
            navigation: CancellationToken::new(),
        }
    }

    /// Open the collection at `collection` with settings from `config`.
    pub fn open(fs: F, collection: CollectionConfiguration, config: &CanvasConfig) -> Self {
        Self::new(
            CollectionModel::open(fs, collection),
            CanvasDisplay::from_config(config),
        )
    }

    pub fn collection(&self) -> &CollectionModel<F> {
        &self.collection
    }

    pub fn display(&self) -> &CanvasDisplay {
        &self.display
    }

    pub fn subscribe(&self) -> Receiver<CollectionEvent> {
        self.collection.subscribe()
    }

    /// Cancel whatever navigation is in flight and hand out a fresh token.
    fn begin_navigation(&mut self) -> CancellationToken {
        self.navigation.cancel();
        self.navigation = CancellationToken::new();
        self.navigation.clone()
    }

    /// The token of the current navigation, for hosts that cancel from elsewhere.
    pub fn navigation_token(&self) -> CancellationToken {
        self.navigation.clone()
    }

    fn ensure_available(&self) -> Outcome<()> {
        if self.collection.is_available() {
            return Ok(());
        }
        Err(self.collection.collection_error().cloned().unwrap_or_else(|| {
            CanvasError::CollectionFolderNotFound(self.collection.path().to_path_buf()).into()
        }))
    }

    fn settle_display(&mut self) {
        if self.collection.is_on_new_canvas() {
            self.display.clear();
        }
    }

    pub fn navigation_state(&self) -> NavigationState {
        NavigationState {
            current: (!self.collection.is_on_new_canvas()).then(|| self.collection.cursor() + 1),
            total: self.collection.len(),
            has_back: self.collection.has_back(),
            has_next: self.collection.has_next(),
        }
    }

    pub fn current_view(&self) -> Option<CanvasView> {
        self.display.view()
    }

    pub fn current_item(&self) -> Option<&StorageHandle> {
        self.display.current_item()
    }

    // --- Navigation ---

    /// Jump to the new canvas at the end.
    pub fn navigate_first(&mut self) {
        self.begin_navigation();
        self.collection.navigate_first();
        self.display.clear();
    }

    pub fn navigate_next(&mut self) -> OperationResult {
        if let Err(result) = self.ensure_available() {
            return result;
        }
        if !self.collection.has_next() {
            return OperationResult::failure(ErrorCode::InvalidOperation, "Already on the new canvas");
        }
        let cancel = self.begin_navigation();
        let result = self.collection.navigate_next(&mut self.display, &cancel);
        self.settle_display();
        result
    }

    pub fn navigate_back(&mut self) -> OperationResult {
        if let Err(result) = self.ensure_available() {
            return result;
        }
        if !self.collection.has_back() {
            return OperationResult::failure(ErrorCode::InvalidOperation, "No older canvas");
        }
        let cancel = self.begin_navigation();
        let result = self.collection.navigate_back(&mut self.display, &cancel);
        self.settle_display();
        result
    }

    /// Jump to the oldest canvas.
    pub fn navigate_last(&mut self) -> OperationResult {
        if let Err(result) = self.ensure_available() {
            return result;
        }
        let cancel = self.begin_navigation();
        let result = self.collection.navigate_last(&mut self.display, &cancel);
        self.settle_display();
        result
    }

    /// Open the canvas at a 1-based display index.
    pub fn open_canvas(&mut self, index: usize) -> OperationResult {
        let handle = match self.item_at(index) {
            Ok(handle) => handle,
            Err(result) => return result,
        };
        let cancel = self.begin_navigation();
        let result = self.collection.load(&mut self.display, Some(&handle), &cancel);
        self.settle_display();
        result
    }

    /// Put the cursor back on a canvas remembered from an earlier session.
    /// Unknown paths land on the new canvas.
    pub fn restore_position(&mut self, path: Option<&Path>) {
        let handle = path.and_then(|p| {
            self.collection
                .find_item(p)
                .map(|item| item.associated().clone())
        });
        self.collection.update_index(handle.as_ref());
        debug!(cursor = self.collection.cursor(), "restored position");
    }

    /// Re-read the collection folder.
    pub fn reload(&mut self) -> OperationResult {
        self.begin_navigation();
        let result = self.collection.reload();
        self.settle_display();
        result
    }

    // --- Content ---

    /// Paste `payload` as a new canvas at the end and open it.
    pub fn paste(&mut self, payload: &dyn PayloadSource) -> Outcome<StorageHandle> {
        self.ensure_available()?;
        let cancel = self.begin_navigation();
        self.display.paste(&mut self.collection, payload, &cancel)
    }

    /// Add a canvas that references `target` without copying it, and open it.
    pub fn link(&mut self, target: &Path) -> Outcome<StorageHandle> {
        self.ensure_available()?;
        let target = self.collection.fs().get_item(target)?;
        if target.is_folder() {
            return Err(CanvasError::FoldersNotSupported.into());
        }
        let handle = self.collection.create_reference(&target)?;
        let cancel = self.begin_navigation();
        self.collection
            .load(&mut self.display, Some(&handle), &cancel)
            .into_outcome()?;
        Ok(handle)
    }

    /// Delete the canvas at a 1-based display index.
    pub fn delete(&mut self, index: usize) -> OperationResult {
        let handle = match self.item_at(index) {
            Ok(handle) => handle,
            Err(result) => return result,
        };
        let result = self.collection.delete_item(&handle);
        if result.is_success() && self.display.current_item() == Some(&handle) {
            self.display.clear();
        }
        result
    }

    /// Classify any file or folder, inside the collection or not.
    pub fn classify_path(&self, path: &Path) -> ContentType {
        match self.collection.fs().get_item(path) {
            Ok(handle) => classify_handle(self.collection.fs(), &handle, self.display.settings()),
            Err(result) => ContentType::invalid(result),
        }
    }

    /// Every canvas, oldest first, classified.
    pub fn list(&mut self) -> Outcome<Vec<CanvasSummary>> {
        self.ensure_available()?;
        let cursor = self.collection.cursor();
        let settings = *self.display.settings();
        let handles: Vec<StorageHandle> = self
            .collection
            .items()
            .iter()
            .map(|item| item.associated().clone())
            .collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for (i, handle) in handles.into_iter().enumerate() {
            let Some(content_type) = self.collection.classify_at(i, &settings) else {
                continue;
            };
            let is_reference = self.collection.items()[i].canvas().is_reference();
            summaries.push(CanvasSummary {
                index: i + 1,
                name: handle.name(),
                path: handle.path().to_path_buf(),
                created_at: self.collection.fs().created_at(&handle).ok(),
                content_type: content_type.to_string(),
                is_reference,
                is_current: i == cursor,
            });
        }
        Ok(summaries)
    }

    fn item_at(&self, index: usize) -> Outcome<StorageHandle> {
        self.ensure_available()?;
        index
            .checked_sub(1)
            .and_then(|i| self.collection.items().get(i))
            .map(|item| item.associated().clone())
            .ok_or_else(|| {
                OperationResult::failure(
                    ErrorCode::NotFound,
                    format!("No canvas at index {}", index),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::drain;
    use crate::payload::MemoryPayload;
    use crate::store::mem_backend::MemBackend;

    fn api_with(names: &[(&str, &str)]) -> CanvasApi<MemBackend> {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        for (name, content) in names {
            fs.add_file(Path::new("/c").join(name), content);
        }
        CanvasApi::open(fs, CollectionConfiguration::new("/c"), &CanvasConfig::default())
    }

    #[test]
    fn test_starts_on_new_canvas() {
        let api = api_with(&[("a.txt", "a")]);
        assert_eq!(
            api.navigation_state(),
            NavigationState {
                current: None,
                total: 1,
                has_back: true,
                has_next: false
            }
        );
        assert!(api.current_view().is_none());
    }

    #[test]
    fn test_back_and_forth() {
        let mut api = api_with(&[("a.txt", "alpha"), ("b.md", "# beta")]);

        assert!(api.navigate_back().is_success());
        assert_eq!(api.navigation_state().current, Some(2));
        assert!(matches!(api.current_view(), Some(CanvasView::Markdown { .. })));

        assert!(api.navigate_back().is_success());
        assert_eq!(api.current_view(), Some(CanvasView::Text("alpha".into())));
        assert_eq!(api.navigate_back().code(), ErrorCode::InvalidOperation);

        assert!(api.navigate_next().is_success());
        assert!(api.navigate_next().is_success());
        assert_eq!(api.navigation_state().current, None);
        assert!(api.current_view().is_none());
        assert_eq!(api.navigate_next().code(), ErrorCode::InvalidOperation);
    }

    #[test]
    fn test_navigation_cancels_previous_token() {
        let mut api = api_with(&[("a.txt", "a"), ("b.txt", "b")]);
        api.navigate_back();
        let first = api.navigation_token();
        api.navigate_back();
        assert!(first.is_cancelled());
        assert!(!api.navigation_token().is_cancelled());
    }

    #[test]
    fn test_open_canvas_by_index() {
        let mut api = api_with(&[("a.txt", "alpha"), ("b.txt", "beta")]);
        assert!(api.open_canvas(1).is_success());
        assert_eq!(api.navigation_state().current, Some(1));
        assert_eq!(api.open_canvas(0).code(), ErrorCode::NotFound);
        assert_eq!(api.open_canvas(3).code(), ErrorCode::NotFound);
    }

    #[test]
    fn test_paste_opens_new_canvas() {
        let mut api = api_with(&[]);
        let rx = api.subscribe();
        let handle = api.paste(&MemoryPayload::text("hello")).unwrap();

        assert_eq!(api.current_item(), Some(&handle));
        assert_eq!(api.navigation_state().current, Some(1));
        assert!(drain(&rx)
            .iter()
            .any(|e| matches!(e, CollectionEvent::ItemAdded(h) if *h == handle)));
    }

    #[test]
    fn test_link_references_target() {
        let mut api = api_with(&[]);
        api.collection().fs().add_file("/pics/cat.png", [1u8, 2]);

        let handle = api.link(Path::new("/pics/cat.png")).unwrap();
        assert!(handle.name().ends_with(".ccref"));
        assert_eq!(api.current_item(), Some(&handle));
        assert!(matches!(api.current_view(), Some(CanvasView::Image { .. })));

        api.collection().fs().add_folder("/pics/album");
        assert_eq!(
            api.link(Path::new("/pics/album")).unwrap_err().code(),
            ErrorCode::InvalidOperation
        );
        assert_eq!(
            api.link(Path::new("/pics/none.png")).unwrap_err().code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_delete_current_clears_display() {
        let mut api = api_with(&[("a.txt", "a")]);
        api.open_canvas(1);
        assert!(api.delete(1).is_success());
        assert!(api.current_view().is_none());
        assert_eq!(api.navigation_state().total, 0);
    }

    #[test]
    fn test_list_classifies() {
        let mut api = api_with(&[("a.txt", "a"), ("b.png", "png"), ("c.md", "c")]);
        let rows = api.list().unwrap();
        let kinds: Vec<&str> = rows.iter().map(|r| r.content_type.as_str()).collect();
        assert_eq!(kinds, vec!["text", "image", "markdown"]);
        assert_eq!(rows[0].index, 1);
        assert!(rows.iter().all(|r| !r.is_current));
    }

    #[test]
    fn test_restore_position() {
        let mut api = api_with(&[("a.txt", "a"), ("b.txt", "b")]);
        api.restore_position(Some(Path::new("/c/a.txt")));
        assert_eq!(api.navigation_state().current, Some(1));
        api.restore_position(Some(Path::new("/c/gone.txt")));
        assert_eq!(api.navigation_state().current, None);
    }

    #[test]
    fn test_unavailable_collection() {
        let mut api = CanvasApi::open(
            MemBackend::new(),
            CollectionConfiguration::new("/missing"),
            &CanvasConfig::default(),
        );
        assert!(api.navigate_last().is_collection_folder_missing());
        assert!(api
            .paste(&MemoryPayload::text("x"))
            .unwrap_err()
            .is_collection_folder_missing());
        assert!(api.list().is_err());
    }

    #[test]
    fn test_classify_path_outside_collection() {
        let api = api_with(&[]);
        api.collection().fs().add_file("/tmp/x.mp4", "");
        assert!(matches!(
            api.classify_path(Path::new("/tmp/x.mp4")),
            ContentType::Media
        ));
        assert!(api.classify_path(Path::new("/tmp/none.txt")).is_invalid());
    }
}
