//! # Storage Layer
//!
//! A collection is a plain folder and every canvas is one child of it. The
//! folder is the only source of truth: there is no sidecar index, and anything
//! may change underneath the application at any time (external deletion,
//! renames, sync conflicts, partial writes).
//!
//! The engine never touches `std::fs` directly. It talks to a [`FileSystem`]
//! collaborator that reports every failure as an
//! [`OperationResult`](crate::result::OperationResult) instead of raising.
//!
//! ## Handles
//!
//! A [`StorageHandle`] is an observation, not a lock: it names a path and the
//! kind of item found there when it was observed. Equality is by path only. The
//! engine never assumes a handle stays valid after it was obtained.
//!
//! ## Implementations
//!
//! - [`fs_backend::FsBackend`]: real folders, atomic writes, unique naming.
//! - [`mem_backend::MemBackend`]: in-memory tree for tests, with a
//!   deterministic creation clock, read counters and failure simulation.

use crate::result::Outcome;
use chrono::{DateTime, Utc};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

pub mod fs_backend;
pub mod mem_backend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    File,
    Folder,
}

#[derive(Debug, Clone)]
pub struct StorageHandle {
    path: PathBuf,
    kind: ItemKind,
}

impl StorageHandle {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::File,
        }
    }

    pub fn folder(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: ItemKind::Folder,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == ItemKind::File
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The extension with its leading dot, ASCII-lowercased (`"Photo.PNG"` → `".png"`).
    /// Empty when the name has no extension.
    pub fn extension(&self) -> String {
        normalize_extension(&self.path)
    }
}

impl PartialEq for StorageHandle {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for StorageHandle {}

impl Hash for StorageHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// Extension matching rule used everywhere in the crate: leading dot, ASCII lowercase.
pub fn normalize_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Abstract interface for the folder-backed store.
///
/// All methods take `&self`; backends handle their own interior state. Every
/// failure comes back as an `OperationResult` (through [`Outcome`]) and is
/// never swallowed by the engine.
pub trait FileSystem {
    /// Observe the item at `path`. Fails with `NotFound` if nothing is there.
    fn get_item(&self, path: &Path) -> Outcome<StorageHandle>;

    fn exists(&self, path: &Path) -> bool;

    /// Create an empty file inside `folder`. If `name` is taken, a unique
    /// variant (`name (2).ext`, ...) is used instead.
    fn create_file(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle>;

    /// Create a folder inside `folder`, with the same unique-name rule.
    fn create_folder(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle>;

    /// Permanently remove a file or a folder (recursively).
    fn delete(&self, item: &StorageHandle) -> Outcome<()>;

    fn read_text(&self, file: &StorageHandle) -> Outcome<String>;

    /// Read at most `limit` bytes (all of them when `None`).
    fn read_bytes(&self, file: &StorageHandle, limit: Option<usize>) -> Outcome<Vec<u8>>;

    /// Replace the file's content. Must be atomic: readers never observe a
    /// half-written file.
    fn write_text(&self, file: &StorageHandle, text: &str) -> Outcome<()>;

    fn write_bytes(&self, file: &StorageHandle, bytes: &[u8]) -> Outcome<()>;

    /// Direct children of `folder`, in no particular order.
    fn enumerate_children(&self, folder: &StorageHandle) -> Outcome<Vec<StorageHandle>>;

    fn created_at(&self, item: &StorageHandle) -> Outcome<DateTime<Utc>>;
}

/// `stem (n).ext` candidates for unique naming; `n` starts at 2.
pub(crate) fn numbered_name(name: &str, n: usize) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());
    match path.extension() {
        Some(ext) => format!("{} ({}).{}", stem, n, ext.to_string_lossy()),
        None => format!("{} ({})", stem, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality_is_by_path() {
        let a = StorageHandle::file("/c/a.txt");
        let b = StorageHandle::folder("/c/a.txt");
        assert_eq!(a, b);
        assert_ne!(a, StorageHandle::file("/c/b.txt"));
    }

    #[test]
    fn test_extension_is_lowercased_with_dot() {
        assert_eq!(StorageHandle::file("/c/Photo.PNG").extension(), ".png");
        assert_eq!(StorageHandle::file("/c/notes.Md").extension(), ".md");
        assert_eq!(StorageHandle::file("/c/README").extension(), "");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("clip.txt", 2), "clip (2).txt");
        assert_eq!(numbered_name("folder", 3), "folder (3)");
    }
}
