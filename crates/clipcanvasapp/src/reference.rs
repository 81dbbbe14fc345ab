//! # Reference Files
//!
//! Instead of copying a pasted file into the collection, a canvas may store a
//! small pointer to it. A reference file has the fixed extension
//! [`REFERENCE_FILE_EXTENSION`] and a JSON body with a single field:
//!
//! ```text
//! {"path": "/home/me/Pictures/cat.png"}
//! ```
//!
//! Resolution follows exactly one level of indirection. It distinguishes a
//! stale pointer (`ReferencedItemNotFound`) from a broken file
//! (`MalformedReference`) and from the reference file itself being gone
//! (`ItemNotFound`), so the navigation layer only reloads the collection when
//! the canvas itself disappeared.

use crate::error::CanvasError;
use crate::result::{ErrorCode, Outcome};
use crate::store::{normalize_extension, FileSystem, StorageHandle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const REFERENCE_FILE_EXTENSION: &str = ".ccref";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceFile {
    #[serde(rename = "path")]
    referenced_path: PathBuf,
}

impl ReferenceFile {
    pub fn new(referenced_path: impl Into<PathBuf>) -> Self {
        Self {
            referenced_path: referenced_path.into(),
        }
    }

    pub fn referenced_path(&self) -> &Path {
        &self.referenced_path
    }

    /// Recognized by format (extension) alone; the body is not inspected.
    pub fn is_reference_file(handle: &StorageHandle) -> bool {
        handle.is_file() && normalize_extension(handle.path()) == REFERENCE_FILE_EXTENSION
    }

    /// Parse a reference file body. Anything but a JSON object with a
    /// non-empty `path` is `MalformedReference`.
    pub fn parse(body: &str) -> Outcome<Self> {
        let reference: ReferenceFile = serde_json::from_str(body)
            .map_err(|e| CanvasError::MalformedReference(e.to_string()))?;
        if reference.referenced_path.as_os_str().is_empty() {
            return Err(CanvasError::MalformedReference("empty path".to_string()).into());
        }
        Ok(reference)
    }

    pub fn read(fs: &dyn FileSystem, handle: &StorageHandle) -> Outcome<Self> {
        let bytes = fs.read_bytes(handle, None)?;
        let body = String::from_utf8(bytes)
            .map_err(|e| CanvasError::MalformedReference(e.to_string()))?;
        Self::parse(&body)
    }

    /// Follow the reference to the item it points at. Never touches the target
    /// beyond observing it.
    pub fn resolve(fs: &dyn FileSystem, handle: &StorageHandle) -> Outcome<StorageHandle> {
        let reference = Self::read(fs, handle)?;
        fs.get_item(reference.referenced_path()).map_err(|result| {
            if result.code() != ErrorCode::NotFound {
                return result;
            }
            warn!(
                reference = %handle.path().display(),
                target = %reference.referenced_path().display(),
                "reference points at a missing item"
            );
            CanvasError::ReferencedItemNotFound(reference.referenced_path.clone()).into()
        })
    }

    /// Create a new reference file named `name` (extension appended) in
    /// `folder`, pointing at `target`.
    pub fn create(
        fs: &dyn FileSystem,
        folder: &StorageHandle,
        name: &str,
        target: &Path,
    ) -> Outcome<StorageHandle> {
        let handle = fs.create_file(folder, &format!("{}{}", name, REFERENCE_FILE_EXTENSION))?;
        if let Err(e) = Self::new(target).write(fs, &handle) {
            let _ = fs.delete(&handle);
            return Err(e);
        }
        Ok(handle)
    }

    pub fn write(&self, fs: &dyn FileSystem, handle: &StorageHandle) -> Outcome<()> {
        let body = serde_json::to_string(self).map_err(CanvasError::Serialization)?;
        fs.write_text(handle, &body)
    }
}
