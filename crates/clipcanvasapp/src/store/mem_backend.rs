use super::{numbered_name, FileSystem, ItemKind, StorageHandle};
use crate::error::CanvasError;
use crate::result::{OperationResult, Outcome};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Clone)]
struct Node {
    kind: ItemKind,
    content: Vec<u8>,
    created: DateTime<Utc>,
}

/// In-memory folder tree for testing.
///
/// Uses `RefCell`/`Cell` for interior mutability since a collection is driven
/// from a single logical sequence. Creation times come from a deterministic
/// clock that ticks one second per created item, so enumeration order is the
/// creation order.
pub struct MemBackend {
    nodes: RefCell<BTreeMap<PathBuf, Node>>,
    clock: Cell<i64>,
    reads: Cell<usize>,
    simulate_write_error: Cell<bool>,
    denied: RefCell<HashSet<PathBuf>>,
}

impl Default for MemBackend {
    fn default() -> Self {
        Self {
            nodes: RefCell::new(BTreeMap::new()),
            clock: Cell::new(0),
            reads: Cell::new(0),
            simulate_write_error: Cell::new(false),
            denied: RefCell::new(HashSet::new()),
        }
    }
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.get();
        self.clock.set(n + 1);
        let epoch = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        epoch + Duration::seconds(n)
    }

    /// Test helper: create a folder (and any missing ancestors are NOT created).
    pub fn add_folder(&self, path: impl Into<PathBuf>) -> StorageHandle {
        let path = path.into();
        let created = self.tick();
        self.nodes.borrow_mut().insert(
            path.clone(),
            Node {
                kind: ItemKind::Folder,
                content: Vec::new(),
                created,
            },
        );
        StorageHandle::folder(path)
    }

    /// Test helper: create a file with the given content.
    pub fn add_file(&self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) -> StorageHandle {
        let path = path.into();
        let created = self.tick();
        self.nodes.borrow_mut().insert(
            path.clone(),
            Node {
                kind: ItemKind::File,
                content: content.as_ref().to_vec(),
                created,
            },
        );
        StorageHandle::file(path)
    }

    /// Test helper: remove an item (and its descendants) behind the engine's back.
    pub fn remove_externally(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mut nodes = self.nodes.borrow_mut();
        let existed = nodes.remove(path).is_some();
        nodes.retain(|p, _| !p.starts_with(path));
        existed
    }

    /// Make content writes fail. Creating empty items still works, so a
    /// half-finished paste can be observed.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Lookups, reads and deletes of `path` fail with `PermissionDenied`.
    pub fn deny_access(&self, path: impl Into<PathBuf>) {
        self.denied.borrow_mut().insert(path.into());
    }

    /// Number of content reads served so far.
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    fn check_access(&self, path: &Path) -> Outcome<()> {
        if self.denied.borrow().contains(path) {
            return Err(CanvasError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("access denied: {}", path.display()),
            ))
            .into());
        }
        Ok(())
    }

    fn read_node(&self, file: &StorageHandle) -> Outcome<Vec<u8>> {
        self.check_access(file.path())?;
        self.reads.set(self.reads.get() + 1);
        let nodes = self.nodes.borrow();
        match nodes.get(file.path()) {
            None => Err(CanvasError::ItemNotFound(file.path().to_path_buf()).into()),
            Some(node) if node.kind == ItemKind::Folder => {
                Err(CanvasError::ItemIsNotAFile(file.path().to_path_buf()).into())
            }
            Some(node) => Ok(node.content.clone()),
        }
    }

    fn write_node(&self, file: &StorageHandle, bytes: &[u8]) -> Outcome<()> {
        if self.simulate_write_error.get() {
            return Err(CanvasError::Io(io::Error::other("Simulated write error")).into());
        }
        if file.is_folder() {
            return Err(CanvasError::ItemIsNotAFile(file.path().to_path_buf()).into());
        }
        let parent_ok = file
            .path()
            .parent()
            .is_some_and(|p| self.is_folder(p));
        if !parent_ok {
            return Err(CanvasError::ItemNotFound(file.path().to_path_buf()).into());
        }

        let created = match self.nodes.borrow().get(file.path()) {
            Some(node) if node.kind == ItemKind::Folder => {
                return Err(CanvasError::ItemIsNotAFile(file.path().to_path_buf()).into());
            }
            Some(node) => Some(node.created),
            None => None,
        };
        let created = created.unwrap_or_else(|| self.tick());
        self.nodes.borrow_mut().insert(
            file.path().to_path_buf(),
            Node {
                kind: ItemKind::File,
                content: bytes.to_vec(),
                created,
            },
        );
        Ok(())
    }

    fn is_folder(&self, path: &Path) -> bool {
        self.nodes
            .borrow()
            .get(path)
            .is_some_and(|n| n.kind == ItemKind::Folder)
    }

    fn create_node(&self, folder: &StorageHandle, name: &str, kind: ItemKind) -> Outcome<StorageHandle> {
        if !self.is_folder(folder.path()) {
            return Err(CanvasError::ItemNotFound(folder.path().to_path_buf()).into());
        }

        let mut attempt = 1;
        let path = loop {
            let candidate = if attempt == 1 {
                name.to_string()
            } else {
                numbered_name(name, attempt)
            };
            let path = folder.path().join(candidate);
            if !self.nodes.borrow().contains_key(&path) {
                break path;
            }
            attempt += 1;
        };

        let created = self.tick();
        self.nodes.borrow_mut().insert(
            path.clone(),
            Node {
                kind,
                content: Vec::new(),
                created,
            },
        );
        Ok(match kind {
            ItemKind::File => StorageHandle::file(path),
            ItemKind::Folder => StorageHandle::folder(path),
        })
    }
}

impl FileSystem for MemBackend {
    fn get_item(&self, path: &Path) -> Outcome<StorageHandle> {
        self.check_access(path)?;
        match self.nodes.borrow().get(path) {
            Some(node) if node.kind == ItemKind::Folder => Ok(StorageHandle::folder(path)),
            Some(_) => Ok(StorageHandle::file(path)),
            None => Err(CanvasError::ItemNotFound(path.to_path_buf()).into()),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    fn create_file(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle> {
        self.create_node(folder, name, ItemKind::File)
    }

    fn create_folder(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle> {
        self.create_node(folder, name, ItemKind::Folder)
    }

    fn delete(&self, item: &StorageHandle) -> Outcome<()> {
        self.check_access(item.path())?;
        if self.remove_externally(item.path()) {
            Ok(())
        } else {
            Err(CanvasError::ItemNotFound(item.path().to_path_buf()).into())
        }
    }

    fn read_text(&self, file: &StorageHandle) -> Outcome<String> {
        let bytes = self.read_node(file)?;
        String::from_utf8(bytes).map_err(|e| {
            OperationResult::from(CanvasError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
        })
    }

    fn read_bytes(&self, file: &StorageHandle, limit: Option<usize>) -> Outcome<Vec<u8>> {
        let mut bytes = self.read_node(file)?;
        if let Some(limit) = limit {
            bytes.truncate(limit);
        }
        Ok(bytes)
    }

    fn write_text(&self, file: &StorageHandle, text: &str) -> Outcome<()> {
        self.write_node(file, text.as_bytes())
    }

    fn write_bytes(&self, file: &StorageHandle, bytes: &[u8]) -> Outcome<()> {
        self.write_node(file, bytes)
    }

    fn enumerate_children(&self, folder: &StorageHandle) -> Outcome<Vec<StorageHandle>> {
        self.check_access(folder.path())?;
        if !self.is_folder(folder.path()) {
            return Err(CanvasError::ItemNotFound(folder.path().to_path_buf()).into());
        }
        let nodes = self.nodes.borrow();
        Ok(nodes
            .iter()
            .filter(|(path, _)| path.parent() == Some(folder.path()))
            .map(|(path, node)| match node.kind {
                ItemKind::File => StorageHandle::file(path),
                ItemKind::Folder => StorageHandle::folder(path),
            })
            .collect())
    }

    fn created_at(&self, item: &StorageHandle) -> Outcome<DateTime<Utc>> {
        self.nodes
            .borrow()
            .get(item.path())
            .map(|node| node.created)
            .ok_or_else(|| CanvasError::ItemNotFound(item.path().to_path_buf()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorCode;

    #[test]
    fn test_clock_orders_creation() {
        let fs = MemBackend::new();
        let root = fs.add_folder("/c");
        let a = fs.create_file(&root, "a.txt").unwrap();
        let b = fs.create_file(&root, "b.txt").unwrap();
        assert!(fs.created_at(&a).unwrap() < fs.created_at(&b).unwrap());
    }

    #[test]
    fn test_rewrite_keeps_creation_time() {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        let a = fs.add_file("/c/a.txt", "one");
        let before = fs.created_at(&a).unwrap();
        fs.write_text(&a, "two").unwrap();
        assert_eq!(fs.created_at(&a).unwrap(), before);
        assert_eq!(fs.read_text(&a).unwrap(), "two");
    }

    #[test]
    fn test_remove_externally_drops_descendants() {
        let fs = MemBackend::new();
        let root = fs.add_folder("/c");
        fs.add_file("/c/a.txt", "a");
        assert!(fs.remove_externally("/c"));
        assert!(!fs.exists(Path::new("/c/a.txt")));
        assert_eq!(
            fs.enumerate_children(&root).unwrap_err().code(),
            ErrorCode::NotFound
        );
    }

    #[test]
    fn test_simulated_write_error() {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        let a = fs.add_file("/c/a.txt", "a");
        fs.set_simulate_write_error(true);
        assert_eq!(fs.write_text(&a, "b").unwrap_err().code(), ErrorCode::Generic);
    }

    #[test]
    fn test_denied_access() {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        let a = fs.add_file("/c/a.txt", "a");
        fs.deny_access("/c/a.txt");
        assert_eq!(
            fs.read_text(&a).unwrap_err().code(),
            ErrorCode::AccessUnauthorized
        );
        assert!(fs.delete(&a).is_err());
        assert_eq!(
            fs.get_item(Path::new("/c/a.txt")).unwrap_err().code(),
            ErrorCode::AccessUnauthorized
        );
    }

    #[test]
    fn test_read_counter() {
        let fs = MemBackend::new();
        fs.add_folder("/c");
        let a = fs.add_file("/c/a.txt", "a");
        fs.read_text(&a).unwrap();
        fs.read_bytes(&a, Some(1)).unwrap();
        assert_eq!(fs.read_count(), 2);
    }
}
