use crate::content_type::ContentType;
use crate::reference::ReferenceFile;
use crate::result::Outcome;
use crate::store::{FileSystem, StorageHandle};
use tracing::debug;

/// One stored unit of pasted content.
///
/// `associated` is what physically sits in the collection slot, possibly a
/// reference file. `source` is what the content actually is: resolved lazily on
/// first use and cached for the item's lifetime. Folders are scanned in bulk and
/// most items are never opened, so nothing is resolved up front.
#[derive(Debug, Clone)]
pub struct CanvasItem {
    associated: StorageHandle,
    source: Option<StorageHandle>,
}

impl CanvasItem {
    pub fn new(associated: StorageHandle) -> Self {
        Self {
            associated,
            source: None,
        }
    }

    pub fn associated(&self) -> &StorageHandle {
        &self.associated
    }

    /// The cached source, if it has been resolved already.
    pub fn cached_source(&self) -> Option<&StorageHandle> {
        self.source.as_ref()
    }

    pub fn is_reference(&self) -> bool {
        ReferenceFile::is_reference_file(&self.associated)
    }

    /// Resolve (once) and return the source item. A failed resolution is not
    /// cached, so a transient failure can be retried.
    pub fn source(&mut self, fs: &dyn FileSystem) -> Outcome<StorageHandle> {
        if let Some(source) = &self.source {
            return Ok(source.clone());
        }

        let source = if self.is_reference() {
            ReferenceFile::resolve(fs, &self.associated)?
        } else {
            self.associated.clone()
        };
        debug!(
            associated = %self.associated.path().display(),
            source = %source.path().display(),
            "resolved canvas source"
        );
        self.source = Some(source.clone());
        Ok(source)
    }

    /// Replace both handles at once. Nothing is resolved here; whoever calls
    /// this re-triggers classification.
    pub fn dangerous_update(&mut self, associated: StorageHandle, source: Option<StorageHandle>) {
        self.associated = associated;
        self.source = source;
    }
}

/// A canvas item as held by a collection: the item plus the state the
/// collection keeps next to it.
#[derive(Debug, Clone)]
pub struct CollectionItem {
    canvas: CanvasItem,
    content_type: Option<ContentType>,
    in_progress: bool,
}

impl CollectionItem {
    pub fn new(associated: StorageHandle) -> Self {
        Self {
            canvas: CanvasItem::new(associated),
            content_type: None,
            in_progress: false,
        }
    }

    pub fn canvas(&self) -> &CanvasItem {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut CanvasItem {
        &mut self.canvas
    }

    pub fn associated(&self) -> &StorageHandle {
        self.canvas.associated()
    }

    pub fn content_type(&self) -> Option<&ContentType> {
        self.content_type.as_ref()
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = Some(content_type);
    }

    pub fn is_operation_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn set_operation_in_progress(&mut self, in_progress: bool) {
        self.in_progress = in_progress;
    }

    /// Swap the backing handles and forget the cached classification.
    pub fn dangerous_update(&mut self, associated: StorageHandle, source: Option<StorageHandle>) {
        self.canvas.dangerous_update(associated, source);
        self.content_type = None;
    }
}
