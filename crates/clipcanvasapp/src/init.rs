//! # Startup
//!
//! Everything clipcanvas keeps for itself lives in one data directory:
//!
//! ```text
//! <data dir>/
//!   clipcanvas.toml        # settings, see crate::config
//!   state.json             # last opened canvas (written by the CLI)
//!   Default Collection/    # used when no collection is given
//! ```
//!
//! ## Data Directory Resolution
//!
//! 1. `CLIPCANVAS_DATA`, if set. Mostly for tests, to isolate state.
//! 2. The OS data directory for the app (via the `directories` crate).
//!
//! ## Collection Resolution
//!
//! 1. The explicit override passed to [`initialize`].
//! 2. `default_collection` from the config.
//! 3. `<data dir>/Default Collection`, created on first use.
//!
//! Explicitly named collections are never created: opening a folder that does
//! not exist yields an unavailable collection, same as one deleted later.

use crate::api::CanvasApi;
use crate::collection::CollectionConfiguration;
use crate::config::CanvasConfig;
use crate::error::{CanvasError, Result};
use crate::store::fs_backend::FsBackend;
use clapfig::{Clapfig, SearchMode, SearchPath};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DATA_DIR_ENV: &str = "CLIPCANVAS_DATA";
pub const CONFIG_FILE_NAME: &str = "clipcanvas.toml";

pub struct CanvasContext {
    pub api: CanvasApi<FsBackend>,
    pub config: CanvasConfig,
    pub data_dir: PathBuf,
}

/// The data directory, honoring `CLIPCANVAS_DATA`.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "clipcanvas", "clipcanvas")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| CanvasError::Config("Could not determine the data directory".into()))
}

/// Load settings from `<data_dir>/clipcanvas.toml`, falling back to defaults.
pub fn load_config(data_dir: &Path) -> CanvasConfig {
    Clapfig::builder()
        .app_name("clipcanvas")
        .file_name(CONFIG_FILE_NAME)
        .search_paths(vec![SearchPath::Path(data_dir.to_path_buf())])
        .search_mode(SearchMode::Merge)
        .load()
        .unwrap_or_default()
}

/// Resolve the data directory and open the collection.
pub fn initialize(collection_override: Option<PathBuf>) -> Result<CanvasContext> {
    initialize_in(data_dir()?, collection_override)
}

/// [`initialize`] with an explicit data directory.
pub fn initialize_in(
    data_dir: PathBuf,
    collection_override: Option<PathBuf>,
) -> Result<CanvasContext> {
    let config = load_config(&data_dir);
    debug!(data_dir = %data_dir.display(), ?config, "loaded config");

    let collection_path = match collection_override {
        Some(path) => path,
        None => {
            let path = config.default_collection(&data_dir);
            if config.default_collection.is_none() && !path.exists() {
                info!(path = %path.display(), "creating default collection");
                std::fs::create_dir_all(&path)?;
            }
            path
        }
    };

    let api = CanvasApi::open(
        FsBackend::new(),
        CollectionConfiguration::new(collection_path),
        &config,
    );

    Ok(CanvasContext {
        api,
        config,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_collection_is_created() {
        let temp = TempDir::new().unwrap();
        let ctx = initialize_in(temp.path().to_path_buf(), None).unwrap();

        let expected = temp.path().join("Default Collection");
        assert!(expected.is_dir());
        assert_eq!(ctx.api.collection().path(), expected);
        assert!(ctx.api.collection().is_available());
        assert_eq!(ctx.config, CanvasConfig::default());
    }

    #[test]
    fn test_override_is_not_created() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let ctx = initialize_in(temp.path().to_path_buf(), Some(missing.clone())).unwrap();

        assert!(!missing.exists());
        assert!(!ctx.api.collection().is_available());
    }

    #[test]
    fn test_config_file_is_read() {
        let temp = TempDir::new().unwrap();
        let clips = temp.path().join("clips");
        fs::create_dir(&clips).unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            format!(
                "prioritize_markdown_over_text = true\ndefault_collection = {:?}\n",
                clips.to_string_lossy()
            ),
        )
        .unwrap();

        let ctx = initialize_in(temp.path().to_path_buf(), None).unwrap();
        assert!(ctx.config.prioritize_markdown_over_text);
        assert_eq!(ctx.api.collection().path(), clips);
        assert!(!temp.path().join("Default Collection").exists());
    }
}
