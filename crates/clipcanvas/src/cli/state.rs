//! Where each collection was left, so consecutive runs navigate like one session.
//!
//! Stored as `<data dir>/state.json`:
//!
//! ```text
//! {"positions": {"/home/me/clips": "/home/me/clips/2024-05-01 10.00.00.txt"}}
//! ```
//!
//! A collection on its new canvas has no entry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const STATE_FILE_NAME: &str = "state.json";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliState {
    #[serde(default)]
    positions: BTreeMap<PathBuf, PathBuf>,
}

impl CliState {
    /// Read the state file. A missing or unreadable file starts fresh.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(STATE_FILE_NAME);
        let Ok(body) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&body).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "ignoring unreadable state file");
            Self::default()
        })
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;
        let path = data_dir.join(STATE_FILE_NAME);
        let body = serde_json::to_string_pretty(self)?;
        fs::write(&path, body).with_context(|| format!("writing {}", path.display()))
    }

    pub fn position(&self, collection: &Path) -> Option<&Path> {
        self.positions.get(collection).map(PathBuf::as_path)
    }

    pub fn remember(&mut self, collection: &Path, current: Option<&Path>) {
        match current {
            Some(item) => {
                self.positions
                    .insert(collection.to_path_buf(), item.to_path_buf());
            }
            None => {
                self.positions.remove(collection);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_through_disk() {
        let temp = TempDir::new().unwrap();
        let mut state = CliState::default();
        state.remember(Path::new("/clips"), Some(Path::new("/clips/a.txt")));
        state.save(temp.path()).unwrap();

        let loaded = CliState::load(temp.path());
        assert_eq!(
            loaded.position(Path::new("/clips")),
            Some(Path::new("/clips/a.txt"))
        );
    }

    #[test]
    fn test_new_canvas_forgets_position() {
        let mut state = CliState::default();
        state.remember(Path::new("/clips"), Some(Path::new("/clips/a.txt")));
        state.remember(Path::new("/clips"), None);
        assert_eq!(state.position(Path::new("/clips")), None);
    }

    #[test]
    fn test_garbage_file_starts_fresh() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(STATE_FILE_NAME), "not json").unwrap();
        assert_eq!(CliState::load(temp.path()), CliState::default());
    }
}
