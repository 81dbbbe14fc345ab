use super::{model_for, payload_source_file, single_storage_item, CanvasView, PasteModel};
use crate::canvas_item::CollectionItem;
use crate::collection::{CanvasLoader, CollectionModel};
use crate::config::CanvasConfig;
use crate::content_type::{classify_item, classify_payload, ClassifierSettings, ContentType, PayloadKind};
use crate::error::CanvasError;
use crate::payload::PayloadSource;
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The canvas currently on screen.
///
/// Loads existing canvases for a [`CollectionModel`] and turns payloads into
/// new ones. Whatever was loaded or pasted last stays available through
/// [`view`](Self::view) until the next load or [`clear`](Self::clear).
pub struct CanvasDisplay {
    settings: ClassifierSettings,
    paste_files_as_reference: bool,
    current: Option<Box<dyn PasteModel>>,
    current_item: Option<StorageHandle>,
}

impl CanvasDisplay {
    pub fn new(settings: ClassifierSettings, paste_files_as_reference: bool) -> Self {
        Self {
            settings,
            paste_files_as_reference,
            current: None,
            current_item: None,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.classifier_settings(), config.paste_files_as_reference)
    }

    pub fn settings(&self) -> &ClassifierSettings {
        &self.settings
    }

    pub fn view(&self) -> Option<CanvasView> {
        self.current.as_ref().map(|model| model.view())
    }

    pub fn content_type(&self) -> Option<ContentType> {
        self.current.as_ref().map(|model| model.content_type())
    }

    pub fn current_item(&self) -> Option<&StorageHandle> {
        self.current_item.as_ref()
    }

    /// Back to the empty new canvas.
    pub fn clear(&mut self) {
        self.current = None;
        self.current_item = None;
    }

    fn show(&mut self, model: Box<dyn PasteModel>, item: StorageHandle) {
        self.current = Some(model);
        self.current_item = Some(item);
    }

    /// Store `payload` as a new canvas at the end of `collection` and show it.
    ///
    /// A single pasted file becomes a reference file when configured so;
    /// everything else is copied into a new timestamp-named canvas. If writing
    /// the new canvas fails it is deleted again and the write failure is
    /// returned as-is. Several files at once are refused with nothing written.
    pub fn paste<F: FileSystem>(
        &mut self,
        collection: &mut CollectionModel<F>,
        payload: &dyn PayloadSource,
        cancel: &CancellationToken,
    ) -> Outcome<StorageHandle> {
        if cancel.is_cancelled() {
            return Err(OperationResult::cancelled());
        }

        let content_type = match classify_payload(collection.fs(), payload, &self.settings) {
            PayloadKind::MultipleItems(items) => {
                return Err(CanvasError::MultipleItems(items.len()).into())
            }
            PayloadKind::Content(ContentType::Invalid { result, .. }) => return Err(result),
            PayloadKind::Content(content_type) => content_type,
        };
        debug!(%content_type, "pasting");

        let mut model = model_for(&content_type).ok_or(CanvasError::NoViewerAvailable)?;
        model
            .set_from_payload(collection.fs(), payload)
            .into_outcome()?;
        if cancel.is_cancelled() {
            return Err(OperationResult::cancelled());
        }

        let reference_target = match single_storage_item(payload)? {
            Some(item) if self.paste_files_as_reference => {
                Some(payload_source_file(collection.fs(), &item)?)
            }
            _ => None,
        };

        let handle = match reference_target {
            Some(target) => collection.create_reference(&target)?,
            None => {
                let handle = collection.create_item_from_extension(&model.file_extension())?;
                Self::write_new(collection, model.as_ref(), &handle)?;
                handle
            }
        };

        if let Some(item) = collection.find_item_mut(&handle) {
            item.set_content_type(content_type);
        }
        collection.update_index(Some(&handle));
        info!(path = %handle.path().display(), "pasted new canvas");
        self.show(model, handle.clone());
        Ok(handle)
    }

    fn write_new<F: FileSystem>(
        collection: &mut CollectionModel<F>,
        model: &dyn PasteModel,
        handle: &StorageHandle,
    ) -> Outcome<()> {
        if let Some(item) = collection.find_item_mut(handle) {
            item.set_operation_in_progress(true);
        }
        let saved = model.save(collection.fs(), handle);
        if let Some(item) = collection.find_item_mut(handle) {
            item.set_operation_in_progress(false);
        }

        if !saved.is_success() {
            warn!(path = %handle.path().display(), result = %saved, "couldn't write new canvas; removing it");
            let removed = collection.delete_item(handle);
            if !removed.is_success() {
                warn!(result = %removed, "couldn't remove unfinished canvas");
            }
            return Err(saved);
        }
        Ok(())
    }
}

impl CanvasLoader for CanvasDisplay {
    fn try_load_existing(
        &mut self,
        fs: &dyn FileSystem,
        item: &mut CollectionItem,
        cancel: &CancellationToken,
    ) -> OperationResult {
        if cancel.is_cancelled() {
            return OperationResult::cancelled();
        }
        let associated = item.associated().clone();
        if item.is_operation_in_progress() {
            return CanvasError::InProgress(associated.path().to_path_buf()).into();
        }
        if !fs.exists(associated.path()) {
            return CanvasError::ItemNotFound(associated.path().to_path_buf()).into();
        }

        let content_type = classify_item(fs, item, &self.settings);
        if let ContentType::Invalid { result, .. } = &content_type {
            return result.clone();
        }
        let Some(mut model) = model_for(&content_type) else {
            return CanvasError::NoViewerAvailable.into();
        };
        let source = match item.canvas_mut().source(fs) {
            Ok(source) => source,
            Err(result) => return result,
        };

        let result = model.load_existing(fs, &source);
        if cancel.is_cancelled() {
            return OperationResult::cancelled();
        }
        if result.is_success() {
            debug!(path = %associated.path().display(), %content_type, "canvas loaded");
            self.show(model, associated);
        }
        result
    }
}
