use super::{ensure_file, payload_source_file, single_storage_item, CanvasView, PasteModel};
use crate::content_type::ContentType;
use crate::error::CanvasError;
use crate::payload::PayloadSource;
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};

/// Audio or video. Only the location is held; the player streams the file.
#[derive(Debug, Default)]
pub struct MediaModel {
    file: Option<StorageHandle>,
}

impl MediaModel {
    fn take_payload(&mut self, fs: &dyn FileSystem, payload: &dyn PayloadSource) -> Outcome<()> {
        let item = single_storage_item(payload)?.ok_or(CanvasError::NoViewerAvailable)?;
        self.file = Some(payload_source_file(fs, &item)?);
        Ok(())
    }
}

/// Copy `from` into `to`, byte for byte.
pub(super) fn copy_file(
    fs: &dyn FileSystem,
    from: Option<&StorageHandle>,
    to: &StorageHandle,
) -> OperationResult {
    let Some(from) = from else {
        return CanvasError::NoViewerAvailable.into();
    };
    fs.read_bytes(from, None)
        .and_then(|bytes| fs.write_bytes(to, &bytes))
        .into()
}

impl PasteModel for MediaModel {
    fn content_type(&self) -> ContentType {
        ContentType::Media
    }

    fn file_extension(&self) -> String {
        self.file
            .as_ref()
            .map(|f| f.extension())
            .unwrap_or_default()
    }

    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        if let Err(result) = ensure_file(file) {
            return result;
        }
        if !fs.exists(file.path()) {
            return CanvasError::ItemNotFound(file.path().to_path_buf()).into();
        }
        self.file = Some(file.clone());
        OperationResult::success()
    }

    fn set_from_payload(
        &mut self,
        fs: &dyn FileSystem,
        payload: &dyn PayloadSource,
    ) -> OperationResult {
        self.take_payload(fs, payload).into()
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        copy_file(fs, self.file.as_ref(), file)
    }

    fn view(&self) -> CanvasView {
        CanvasView::Media {
            path: self
                .file
                .as_ref()
                .map(|f| f.path().to_path_buf())
                .unwrap_or_default(),
        }
    }
}
