use super::media::copy_file;
use super::{ensure_file, payload_source_file, single_storage_item, CanvasView, PasteModel};
use crate::content_type::ContentType;
use crate::error::CanvasError;
use crate::payload::PayloadSource;
use crate::result::OperationResult;
use crate::store::{FileSystem, StorageHandle};

/// Any file without a dedicated viewer. Shown as a file to open externally.
#[derive(Debug, Default)]
pub struct FallbackModel {
    file: Option<StorageHandle>,
}

impl PasteModel for FallbackModel {
    fn content_type(&self) -> ContentType {
        ContentType::Fallback
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
        match fs.get_item(file.path()) {
            Ok(found) => {
                self.file = Some(found);
                OperationResult::success()
            }
            Err(result) => result,
        }
    }

    fn set_from_payload(
        &mut self,
        fs: &dyn FileSystem,
        payload: &dyn PayloadSource,
    ) -> OperationResult {
        let item = match single_storage_item(payload) {
            Ok(Some(item)) => item,
            Ok(None) => return CanvasError::NoViewerAvailable.into(),
            Err(result) => return result,
        };
        match payload_source_file(fs, &item) {
            Ok(source) => {
                self.file = Some(source);
                OperationResult::success()
            }
            Err(result) => result,
        }
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        copy_file(fs, self.file.as_ref(), file)
    }

    fn view(&self) -> CanvasView {
        CanvasView::File {
            path: self
                .file
                .as_ref()
                .map(|f| f.path().to_path_buf())
                .unwrap_or_default(),
        }
    }
}
