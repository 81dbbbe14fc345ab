use super::{ensure_file, payload_source_file, single_storage_item, CanvasView, PasteModel};
use crate::content_type::{parse_url, ContentType};
use crate::error::CanvasError;
use crate::payload::{PayloadFormat, PayloadSource};
use crate::result::{OperationResult, Outcome};
use crate::store::{FileSystem, StorageHandle};

const CLIPBOARD_IMAGE_EXTENSION: &str = ".png";

/// Encoded image bytes. Decoding is the viewer's job.
#[derive(Debug, Default)]
pub struct ImageModel {
    bytes: Vec<u8>,
    extension: Option<String>,
}

impl ImageModel {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn take_payload(&mut self, fs: &dyn FileSystem, payload: &dyn PayloadSource) -> Outcome<()> {
        if payload.contains(PayloadFormat::Bitmap) {
            self.bytes = payload.get_bitmap()?;
            self.extension = Some(CLIPBOARD_IMAGE_EXTENSION.to_string());
            return Ok(());
        }
        if let Some(item) = single_storage_item(payload)? {
            let source = payload_source_file(fs, &item)?;
            self.bytes = fs.read_bytes(&source, None)?;
            self.extension = Some(source.extension());
            return Ok(());
        }

        let text = payload.get_text()?;
        match parse_url(&text) {
            Some(url) => Err(CanvasError::RemoteContentUnsupported(url.to_string()).into()),
            None => Err(CanvasError::NoViewerAvailable.into()),
        }
    }
}

impl PasteModel for ImageModel {
    fn content_type(&self) -> ContentType {
        ContentType::Image
    }

    fn file_extension(&self) -> String {
        match &self.extension {
            Some(ext) if !ext.is_empty() => ext.clone(),
            _ => CLIPBOARD_IMAGE_EXTENSION.to_string(),
        }
    }

    fn load_existing(&mut self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        match ensure_file(file).and_then(|_| fs.read_bytes(file, None)) {
            Ok(bytes) => {
                self.bytes = bytes;
                self.extension = Some(file.extension());
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
        self.take_payload(fs, payload).into()
    }

    fn save(&self, fs: &dyn FileSystem, file: &StorageHandle) -> OperationResult {
        fs.write_bytes(file, &self.bytes).into()
    }

    fn view(&self) -> CanvasView {
        CanvasView::Image {
            size: self.bytes.len(),
            extension: self.file_extension(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::MemoryPayload;
    use crate::result::ErrorCode;
    use crate::store::mem_backend::MemBackend;

    #[test]
    fn test_bitmap_payload_is_png() {
        let fs = MemBackend::new();
        let mut model = ImageModel::default();
        assert!(model
            .set_from_payload(&fs, &MemoryPayload::bitmap(vec![0x89, b'P', b'N', b'G']))
            .is_success());
        assert_eq!(model.file_extension(), ".png");
        assert_eq!(model.bytes().len(), 4);
    }

    #[test]
    fn test_file_payload_keeps_its_extension() {
        let fs = MemBackend::new();
        let photo = fs.add_file("/pics/Photo.JPG", [1u8, 2, 3]);
        let mut model = ImageModel::default();
        assert!(model
            .set_from_payload(&fs, &MemoryPayload::items(vec![photo]))
            .is_success());
        assert_eq!(model.file_extension(), ".jpg");
    }

    #[test]
    fn test_remote_image_is_not_downloaded() {
        let fs = MemBackend::new();
        let result = ImageModel::default()
            .set_from_payload(&fs, &MemoryPayload::text("https://example.com/cat.png"));
        assert_eq!(result.code(), ErrorCode::InvalidOperation);
        assert!(matches!(
            result.cause(),
            Some(CanvasError::RemoteContentUnsupported(_))
        ));
    }
}
