//! # Collections
//!
//! A collection is a folder viewed as an ordered sequence of canvases, oldest
//! first, with a cursor. The cursor ranges over `[0, len]`; `cursor == len` is the
//! empty "new canvas" slot at the end, not an error.
//!
//! ```text
//!   items:   [ a.txt ][ b.png ][ c.md ]  ·new·
//!   cursor:      0        1       2        3
//!            <── back              next ──>
//! ```
//!
//! ## Loading and recovery
//!
//! The folder can change underneath us at any time. When loading a canvas
//! reports that the item itself is gone (a `NotFound` that is not a stale
//! reference), the collection:
//!
//! 1. checks the folder still exists; if not, the collection is marked
//!    unavailable and [`CollectionEvent::ReturnToParent`] is emitted,
//! 2. otherwise re-enumerates the folder, keeping the cursor at the same
//!    position relative to the end,
//! 3. steps past the gap in the direction of travel,
//! 4. retries the load exactly once and reports whatever that yields.
//!
//! Every load takes a [`CancellationToken`]. A cancelled load restores items,
//! cursor and direction as they were before the navigation started and reports
//! `Cancelled`.

use crate::canvas_item::CollectionItem;
use crate::content_type::{classify_item, ClassifierSettings, ContentType};
use crate::error::CanvasError;
use crate::events::{CollectionEvent, EventBus};
use crate::reference::ReferenceFile;
use crate::result::{ErrorCode, OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};
use async_channel::Receiver;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const RELOAD_TIP: &str =
    "We've noticed some items went missing. We're reloading the collection for you.";

/// Format of generated canvas names, local time.
pub const CANVAS_NAME_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// What a host persists to reopen a collection later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfiguration {
    pub collection_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl CollectionConfiguration {
    pub fn new(collection_path: impl Into<PathBuf>) -> Self {
        Self {
            collection_path: collection_path.into(),
            display_name: None,
        }
    }

    /// Explicit name, else the folder name.
    pub fn display_name(&self) -> String {
        self.display_name.clone().unwrap_or_else(|| {
            self.collection_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.collection_path.display().to_string())
        })
    }
}

/// Loads one existing canvas for display.
pub trait CanvasLoader {
    fn try_load_existing(
        &mut self,
        fs: &dyn FileSystem,
        item: &mut CollectionItem,
        cancel: &CancellationToken,
    ) -> OperationResult;
}

/// Clamp `wanted` into `[0, count - 1]` (0 when empty).
pub fn fit_bounds(count: usize, wanted: usize) -> usize {
    if count == 0 {
        0
    } else {
        wanted.min(count - 1)
    }
}

/// Name for a new canvas created now.
pub fn new_canvas_name(extension: &str) -> String {
    format!("{}{}", Local::now().format(CANVAS_NAME_FORMAT), extension)
}

struct Snapshot {
    cursor: usize,
    direction: Direction,
    items: Option<Vec<CollectionItem>>,
}

enum Recovery {
    Retried(OperationResult),
    Failed(OperationResult),
    NewCanvas,
    Cancelled,
}

pub struct CollectionModel<F: FileSystem> {
    fs: F,
    config: CollectionConfiguration,
    folder: Option<StorageHandle>,
    items: Vec<CollectionItem>,
    cursor: usize,
    direction: Direction,
    available: bool,
    initialized: bool,
    initializing: bool,
    error: Option<OperationResult>,
    events: EventBus<CollectionEvent>,
}

impl<F: FileSystem> CollectionModel<F> {
    pub fn new(fs: F, config: CollectionConfiguration) -> Self {
        Self {
            fs,
            config,
            folder: None,
            items: Vec::new(),
            cursor: 0,
            direction: Direction::Forward,
            available: false,
            initialized: false,
            initializing: false,
            error: None,
            events: EventBus::new(),
        }
    }

    /// `new` followed by [`reload`](Self::reload). The model is returned even
    /// when the folder is missing; check [`is_available`](Self::is_available).
    pub fn open(fs: F, config: CollectionConfiguration) -> Self {
        let mut collection = Self::new(fs, config);
        collection.reload();
        collection
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn configuration(&self) -> &CollectionConfiguration {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.collection_path
    }

    pub fn display_name(&self) -> String {
        self.config.display_name()
    }

    pub fn items(&self) -> &[CollectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn collection_error(&self) -> Option<&OperationResult> {
        self.error.as_ref()
    }

    pub fn subscribe(&self) -> Receiver<CollectionEvent> {
        self.events.subscribe()
    }

    fn folder_missing(&self) -> OperationResult {
        CanvasError::CollectionFolderNotFound(self.config.collection_path.clone()).into()
    }

    fn folder(&self) -> Outcome<&StorageHandle> {
        self.folder.as_ref().ok_or_else(|| self.folder_missing())
    }

    fn mark_unavailable(&mut self, result: OperationResult) {
        self.available = false;
        self.folder = None;
        self.error = Some(result);
    }

    // --- Initialization ---

    /// Resolve the backing folder. On failure the collection becomes
    /// unavailable and `CollectionErrorRaised` is emitted.
    pub fn initialize_folder(&mut self) -> OperationResult {
        let path = self.config.collection_path.clone();
        let result = match self.fs.get_item(&path) {
            Ok(handle) if handle.is_folder() => {
                self.folder = Some(handle);
                self.available = true;
                self.error = None;
                return OperationResult::success();
            }
            Ok(_) => self.folder_missing(),
            Err(result) if result.code() == ErrorCode::NotFound => self.folder_missing(),
            Err(result) => result,
        };

        error!(path = %path.display(), %result, "collection folder unavailable");
        self.mark_unavailable(result.clone());
        self.events
            .emit(CollectionEvent::CollectionErrorRaised(result.clone()));
        result
    }

    /// Enumerate the folder into `items`, oldest first, and rebalance the
    /// cursor: `clamp(max(c, c - (old_len - new_len)), 0, new_len)`.
    pub fn initialize_items(&mut self) -> OperationResult {
        let folder = match self.folder() {
            Ok(folder) => folder.clone(),
            Err(result) => return result,
        };

        self.initializing = true;
        self.events.emit(CollectionEvent::ItemsInitializationStarted);

        let children = match self.fs.enumerate_children(&folder) {
            Ok(children) => children,
            Err(result) => {
                warn!(path = %folder.path().display(), %result, "couldn't enumerate collection");
                self.initializing = false;
                self.events
                    .emit(CollectionEvent::ItemsInitializationFinished);
                if result.code() == ErrorCode::NotFound {
                    let missing = self.folder_missing();
                    self.mark_unavailable(missing.clone());
                    return missing;
                }
                return result;
            }
        };

        let mut dated: Vec<(DateTime<Utc>, StorageHandle)> = children
            .into_iter()
            .filter_map(|child| match self.fs.created_at(&child) {
                Ok(created) => Some((created, child)),
                Err(result) => {
                    debug!(path = %child.path().display(), %result, "skipping item that vanished during enumeration");
                    None
                }
            })
            .collect();
        dated.sort_by(|(a_time, a), (b_time, b)| a_time.cmp(b_time).then_with(|| a.path().cmp(b.path())));

        let old_cursor = self.cursor as i64;
        let old_len = self.items.len() as i64;
        self.items = dated
            .into_iter()
            .map(|(_, handle)| CollectionItem::new(handle))
            .collect();
        let new_len = self.items.len() as i64;
        let wanted = old_cursor.max(old_cursor - (old_len - new_len));
        self.cursor = wanted.clamp(0, new_len) as usize;

        info!(
            collection = %self.display_name(),
            items = self.items.len(),
            cursor = self.cursor,
            "collection items initialized"
        );

        self.initializing = false;
        self.initialized = true;
        self.events
            .emit(CollectionEvent::ItemsInitializationFinished);
        OperationResult::success()
    }

    /// Folder, then items.
    pub fn reload(&mut self) -> OperationResult {
        let result = self.initialize_folder();
        if !result.is_success() {
            return result;
        }
        self.initialize_items()
    }

    // --- Cursor ---

    pub fn is_on_new_canvas(&self) -> bool {
        self.cursor == self.items.len()
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.items.len()
    }

    pub fn has_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn current_item(&self) -> Option<&CollectionItem> {
        self.items.get(self.cursor)
    }

    pub fn set_cursor_on_new_canvas(&mut self) {
        self.cursor = self.items.len();
    }

    /// Point the cursor at `handle`; unknown handles land on the new canvas.
    pub fn update_index(&mut self, handle: Option<&StorageHandle>) {
        match handle.and_then(|h| self.index_of(h)) {
            Some(index) => self.cursor = index,
            None => self.set_cursor_on_new_canvas(),
        }
    }

    pub fn is_on_opened_canvas(&self, handle: &StorageHandle) -> bool {
        self.index_of(handle) == Some(self.cursor)
    }

    pub fn index_of(&self, handle: &StorageHandle) -> Option<usize> {
        self.items.iter().position(|item| item.associated() == handle)
    }

    pub fn find_item(&self, path: &Path) -> Option<&CollectionItem> {
        self.items
            .iter()
            .find(|item| item.associated().path() == path)
    }

    pub fn find_item_mut(&mut self, handle: &StorageHandle) -> Option<&mut CollectionItem> {
        self.items
            .iter_mut()
            .find(|item| item.associated() == handle)
    }

    /// Classify the item at `index`, caching the verdict on the item.
    pub fn classify_at(
        &mut self,
        index: usize,
        settings: &ClassifierSettings,
    ) -> Option<ContentType> {
        let item = self.items.get_mut(index)?;
        Some(classify_item(&self.fs, item, settings))
    }

    // --- Navigation ---

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cursor,
            direction: self.direction,
            items: None,
        }
    }

    pub fn navigate_first(&mut self) {
        self.cursor = self.items.len();
        self.direction = Direction::Forward;
        debug!("navigate first");
        self.events.emit(CollectionEvent::OpenNewCanvas);
    }

    pub fn navigate_next(
        &mut self,
        loader: &mut dyn CanvasLoader,
        cancel: &CancellationToken,
    ) -> OperationResult {
        if !self.has_next() {
            return OperationResult::failure(ErrorCode::InvalidOperation, "Already on the new canvas");
        }
        let snapshot = self.snapshot();
        self.cursor += 1;
        self.direction = Direction::Forward;
        debug!(cursor = self.cursor, "navigate next");

        if self.is_on_new_canvas() {
            self.events.emit(CollectionEvent::OpenNewCanvas);
            return OperationResult::success();
        }
        self.load_from(snapshot, loader, None, cancel)
    }

    pub fn navigate_back(
        &mut self,
        loader: &mut dyn CanvasLoader,
        cancel: &CancellationToken,
    ) -> OperationResult {
        if !self.has_back() {
            return OperationResult::failure(ErrorCode::InvalidOperation, "Already on the first canvas");
        }
        let snapshot = self.snapshot();
        self.cursor -= 1;
        self.direction = Direction::Backward;
        debug!(cursor = self.cursor, "navigate back");
        self.load_from(snapshot, loader, None, cancel)
    }

    pub fn navigate_last(
        &mut self,
        loader: &mut dyn CanvasLoader,
        cancel: &CancellationToken,
    ) -> OperationResult {
        let snapshot = self.snapshot();
        self.cursor = 0;
        self.direction = Direction::Backward;
        debug!("navigate last");
        self.load_from(snapshot, loader, None, cancel)
    }

    /// Load the canvas under the cursor, or `target` (which then becomes the
    /// cursor position).
    pub fn load(
        &mut self,
        loader: &mut dyn CanvasLoader,
        target: Option<&StorageHandle>,
        cancel: &CancellationToken,
    ) -> OperationResult {
        let snapshot = self.snapshot();
        self.load_from(snapshot, loader, target, cancel)
    }

    fn restore(&mut self, snapshot: Snapshot) -> OperationResult {
        debug!(cursor = snapshot.cursor, "load cancelled; restoring navigation state");
        if let Some(items) = snapshot.items {
            self.items = items;
        }
        self.cursor = snapshot.cursor.min(self.items.len());
        self.direction = snapshot.direction;
        OperationResult::cancelled()
    }

    fn try_load(
        &mut self,
        loader: &mut dyn CanvasLoader,
        index: usize,
        cancel: &CancellationToken,
    ) -> OperationResult {
        let item = &mut self.items[index];
        debug!(index, path = %item.associated().path().display(), "loading canvas");
        loader.try_load_existing(&self.fs, item, cancel)
    }

    fn load_from(
        &mut self,
        mut snapshot: Snapshot,
        loader: &mut dyn CanvasLoader,
        target: Option<&StorageHandle>,
        cancel: &CancellationToken,
    ) -> OperationResult {
        if cancel.is_cancelled() {
            return self.restore(snapshot);
        }
        if self.folder.is_none() {
            let result = self.folder_missing();
            self.events
                .emit(CollectionEvent::CanvasLoadFailed(result.clone()));
            return result;
        }

        if self.items.is_empty()
            || (self.direction == Direction::Forward && self.is_on_new_canvas() && target.is_none())
        {
            self.cursor = self.items.len();
            self.events.emit(CollectionEvent::OpenNewCanvas);
            return OperationResult::success();
        }

        self.cursor = fit_bounds(self.items.len(), self.cursor);
        let requested = match target {
            None => self.items[self.cursor].associated().clone(),
            Some(handle) => {
                if let Some(index) = self.index_of(handle) {
                    self.cursor = index;
                }
                handle.clone()
            }
        };

        let mut result = match self.index_of(&requested) {
            Some(index) => self.try_load(loader, index, cancel),
            None => CanvasError::ItemNotFound(requested.path().to_path_buf()).into(),
        };
        if cancel.is_cancelled() {
            return self.restore(snapshot);
        }

        if result.code() == ErrorCode::NotFound && !result.is_stale_reference() {
            match self.recover(&mut snapshot, loader, &requested, cancel) {
                Recovery::Retried(retried) | Recovery::Failed(retried) => result = retried,
                Recovery::NewCanvas => return OperationResult::success(),
                Recovery::Cancelled => return self.restore(snapshot),
            }
        }

        if !result.is_success() {
            warn!(path = %requested.path().display(), %result, "canvas load failed");
            self.events
                .emit(CollectionEvent::CanvasLoadFailed(result.clone()));
        }
        result
    }

    fn recover(
        &mut self,
        snapshot: &mut Snapshot,
        loader: &mut dyn CanvasLoader,
        requested: &StorageHandle,
        cancel: &CancellationToken,
    ) -> Recovery {
        let folder_present = self
            .fs
            .get_item(&self.config.collection_path)
            .is_ok_and(|handle| handle.is_folder());
        if !folder_present {
            let fatal = self.folder_missing();
            error!(collection = %self.config.collection_path.display(), "collection folder vanished");
            self.mark_unavailable(fatal.clone());
            self.events.emit(CollectionEvent::ReturnToParent);
            return Recovery::Failed(fatal);
        }

        warn!(missing = %requested.path().display(), "canvas vanished; reloading collection");
        self.events
            .emit(CollectionEvent::TipTextUpdateRequested(RELOAD_TIP.to_string()));
        snapshot.items = Some(self.items.clone());

        let reloaded = self.initialize_items();
        if cancel.is_cancelled() {
            return Recovery::Cancelled;
        }
        if !reloaded.is_success() {
            return Recovery::Failed(reloaded);
        }

        if self.items.is_empty() {
            self.events.emit(CollectionEvent::OpenNewCanvas);
            return Recovery::NewCanvas;
        }

        match self.direction {
            Direction::Forward => {
                if self.has_next() {
                    self.cursor += 1;
                }
            }
            Direction::Backward => {
                if self.has_back() {
                    self.cursor -= 1;
                }
            }
        }

        if let Some(index) = self.index_of(requested) {
            self.cursor = index;
        }
        if self.cursor < self.items.len() {
            info!(cursor = self.cursor, "retrying load after reload");
            let retried = self.try_load(loader, self.cursor, cancel);
            if cancel.is_cancelled() {
                return Recovery::Cancelled;
            }
            Recovery::Retried(retried)
        } else {
            self.events.emit(CollectionEvent::OpenNewCanvas);
            Recovery::NewCanvas
        }
    }

    // --- Creation and deletion ---

    fn add_item(&mut self, handle: StorageHandle) -> &mut CollectionItem {
        self.events
            .emit(CollectionEvent::ItemAdded(handle.clone()));
        self.items.push(CollectionItem::new(handle));
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Create an empty file named `name` (made unique) and append it.
    pub fn create_item(&mut self, name: &str) -> Outcome<StorageHandle> {
        let folder = self.folder()?.clone();
        let handle = self.fs.create_file(&folder, name)?;
        debug!(path = %handle.path().display(), "created canvas item");
        self.add_item(handle.clone());
        Ok(handle)
    }

    /// Create a timestamp-named file with `extension` (leading dot) and append it.
    pub fn create_item_from_extension(&mut self, extension: &str) -> Outcome<StorageHandle> {
        self.create_item(&new_canvas_name(extension))
    }

    pub fn create_folder(&mut self, name: &str) -> Outcome<StorageHandle> {
        let folder = self.folder()?.clone();
        let handle = self.fs.create_folder(&folder, name)?;
        self.add_item(handle.clone());
        Ok(handle)
    }

    /// Append a timestamp-named reference file pointing at `target`.
    pub fn create_reference(&mut self, target: &StorageHandle) -> Outcome<StorageHandle> {
        let folder = self.folder()?.clone();
        let stem = new_canvas_name("");
        let handle = ReferenceFile::create(&self.fs, &folder, &stem, target.path())?;
        self.add_item(handle.clone())
            .canvas_mut()
            .dangerous_update(handle.clone(), Some(target.clone()));
        Ok(handle)
    }

    /// Delete from storage first; the in-memory entry goes only if that worked.
    pub fn delete_item(&mut self, handle: &StorageHandle) -> OperationResult {
        if let Err(result) = self.fs.delete(handle) {
            warn!(path = %handle.path().display(), %result, "couldn't delete canvas");
            return result;
        }
        if let Some(index) = self.index_of(handle) {
            self.items.remove(index);
            if index < self.cursor {
                self.cursor -= 1;
            }
            self.cursor = self.cursor.min(self.items.len());
        }
        self.events
            .emit(CollectionEvent::ItemRemoved(handle.clone()));
        OperationResult::success()
    }
}
