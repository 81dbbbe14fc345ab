use super::{numbered_name, FileSystem, StorageHandle};
use crate::error::CanvasError;
use crate::result::{OperationResult, Outcome};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{self, Read};
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;
use uuid::Uuid;

const TMP_PREFIX: &str = ".~";
const TMP_SUFFIX: &str = ".tmp";
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// Production backend over real folders.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBackend;

impl FsBackend {
    pub fn new() -> Self {
        Self
    }

    /// Leftovers of an interrupted atomic write. Never reported as items.
    pub fn is_write_artifact(name: &str) -> bool {
        name.starts_with(TMP_PREFIX) && name.ends_with(TMP_SUFFIX)
    }

    fn write_atomic(&self, file: &StorageHandle, bytes: &[u8]) -> Outcome<()> {
        if file.is_folder() {
            return Err(CanvasError::ItemIsNotAFile(file.path().to_path_buf()).into());
        }
        let parent = file
            .path()
            .parent()
            .ok_or_else(|| CanvasError::ItemNotFound(file.path().to_path_buf()))?;
        if !parent.exists() {
            return Err(CanvasError::ItemNotFound(parent.to_path_buf()).into());
        }

        let tmp_path = parent.join(format!("{}{}{}", TMP_PREFIX, Uuid::new_v4(), TMP_SUFFIX));
        fs::write(&tmp_path, bytes).map_err(|e| io_failure(&tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, file.path()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_failure(file.path(), e));
        }
        Ok(())
    }

    fn create_unique<F>(&self, folder: &StorageHandle, name: &str, mut create: F) -> Outcome<StorageHandle>
    where
        F: FnMut(&Path) -> io::Result<StorageHandle>,
    {
        if !folder.path().is_dir() {
            return Err(CanvasError::ItemNotFound(folder.path().to_path_buf()).into());
        }

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let candidate = if attempt == 1 {
                name.to_string()
            } else {
                numbered_name(name, attempt)
            };
            let path = folder.path().join(&candidate);
            match create(&path) {
                Ok(handle) => {
                    debug!(path = %path.display(), "created item");
                    return Ok(handle);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_failure(&path, e)),
            }
        }

        Err(CanvasError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", name, folder.path().display()),
        ))
        .into())
    }
}

/// Missing paths become `ItemNotFound` so callers can tell them apart from
/// other I/O trouble; everything else keeps the raw `io::Error`.
fn io_failure(path: &Path, err: io::Error) -> OperationResult {
    if err.kind() == io::ErrorKind::NotFound {
        CanvasError::ItemNotFound(path.to_path_buf()).into()
    } else {
        CanvasError::Io(err).into()
    }
}

fn file_handle(file: &StorageHandle) -> Outcome<&Path> {
    if file.is_folder() {
        return Err(CanvasError::ItemIsNotAFile(file.path().to_path_buf()).into());
    }
    Ok(file.path())
}

impl FileSystem for FsBackend {
    fn get_item(&self, path: &Path) -> Outcome<StorageHandle> {
        let meta = fs::metadata(path).map_err(|e| io_failure(path, e))?;
        if meta.is_dir() {
            Ok(StorageHandle::folder(path))
        } else {
            Ok(StorageHandle::file(path))
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_file(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle> {
        self.create_unique(folder, name, |path| {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map(|_| StorageHandle::file(path))
        })
    }

    fn create_folder(&self, folder: &StorageHandle, name: &str) -> Outcome<StorageHandle> {
        self.create_unique(folder, name, |path| {
            fs::create_dir(path).map(|_| StorageHandle::folder(path))
        })
    }

    fn delete(&self, item: &StorageHandle) -> Outcome<()> {
        let path = item.path();
        let meta = fs::symlink_metadata(path).map_err(|e| io_failure(path, e))?;
        if meta.is_dir() {
            fs::remove_dir_all(path).map_err(|e| io_failure(path, e))
        } else {
            fs::remove_file(path).map_err(|e| io_failure(path, e))
        }
    }

    fn read_text(&self, file: &StorageHandle) -> Outcome<String> {
        let path = file_handle(file)?;
        fs::read_to_string(path).map_err(|e| io_failure(path, e))
    }

    fn read_bytes(&self, file: &StorageHandle, limit: Option<usize>) -> Outcome<Vec<u8>> {
        let path = file_handle(file)?;
        match limit {
            None => fs::read(path).map_err(|e| io_failure(path, e)),
            Some(limit) => {
                let handle = fs::File::open(path).map_err(|e| io_failure(path, e))?;
                let mut buf = Vec::with_capacity(limit.min(64 * 1024));
                handle
                    .take(limit as u64)
                    .read_to_end(&mut buf)
                    .map_err(|e| io_failure(path, e))?;
                Ok(buf)
            }
        }
    }

    fn write_text(&self, file: &StorageHandle, text: &str) -> Outcome<()> {
        self.write_atomic(file, text.as_bytes())
    }

    fn write_bytes(&self, file: &StorageHandle, bytes: &[u8]) -> Outcome<()> {
        self.write_atomic(file, bytes)
    }

    fn enumerate_children(&self, folder: &StorageHandle) -> Outcome<Vec<StorageHandle>> {
        let path = folder.path();
        let entries = fs::read_dir(path).map_err(|e| io_failure(path, e))?;

        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_failure(path, e))?;
            let name = entry.file_name();
            if Self::is_write_artifact(&name.to_string_lossy()) {
                continue;
            }
            // An entry can vanish between read_dir and file_type
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                children.push(StorageHandle::folder(entry.path()));
            } else {
                children.push(StorageHandle::file(entry.path()));
            }
        }
        Ok(children)
    }

    fn created_at(&self, item: &StorageHandle) -> Outcome<DateTime<Utc>> {
        let path = item.path();
        let meta = fs::metadata(path).map_err(|e| io_failure(path, e))?;
        // Not every filesystem records birth time
        let stamp = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::now());
        Ok(stamp.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ErrorCode;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FsBackend, StorageHandle) {
        let dir = TempDir::new().unwrap();
        let folder = StorageHandle::folder(dir.path());
        (dir, FsBackend::new(), folder)
    }

    #[test]
    fn test_create_file_generates_unique_names() {
        let (_dir, fs, folder) = setup();
        let first = fs.create_file(&folder, "clip.txt").unwrap();
        let second = fs.create_file(&folder, "clip.txt").unwrap();
        assert_eq!(first.name(), "clip.txt");
        assert_eq!(second.name(), "clip (2).txt");
    }

    #[test]
    fn test_write_leaves_no_artifacts() {
        let (dir, fs, folder) = setup();
        let file = fs.create_file(&folder, "a.txt").unwrap();
        fs.write_text(&file, "hello").unwrap();
        assert_eq!(fs.read_text(&file).unwrap(), "hello");

        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().into_owned();
            assert!(!FsBackend::is_write_artifact(&name), "leftover {}", name);
        }
    }

    #[test]
    fn test_enumerate_skips_write_artifacts() {
        let (dir, fs, folder) = setup();
        std::fs::write(dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(dir.path().join(".~123.tmp"), "partial").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let mut names: Vec<String> = fs
            .enumerate_children(&folder)
            .unwrap()
            .iter()
            .map(|h| h.name())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "sub"]);
    }

    #[test]
    fn test_missing_file_reports_not_found() {
        let (dir, fs, _folder) = setup();
        let ghost = StorageHandle::file(dir.path().join("ghost.txt"));
        let err = fs.read_text(&ghost).unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(matches!(err.cause(), Some(CanvasError::ItemNotFound(_))));
    }

    #[test]
    fn test_read_bytes_respects_limit() {
        let (_dir, fs, folder) = setup();
        let file = fs.create_file(&folder, "big.bin").unwrap();
        fs.write_bytes(&file, &[7u8; 100]).unwrap();
        assert_eq!(fs.read_bytes(&file, Some(10)).unwrap().len(), 10);
        assert_eq!(fs.read_bytes(&file, None).unwrap().len(), 100);
    }

    #[test]
    fn test_folder_handles_are_rejected_for_content() {
        let (_dir, fs, folder) = setup();
        let err = fs.read_text(&folder).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidOperation);
    }

    #[test]
    fn test_delete_folder_recursively() {
        let (_dir, fs, folder) = setup();
        let sub = fs.create_folder(&folder, "canvas").unwrap();
        let inner = fs.create_file(&sub, "x.txt").unwrap();
        fs.write_text(&inner, "x").unwrap();
        fs.delete(&sub).unwrap();
        assert!(!fs.exists(sub.path()));
    }
}
