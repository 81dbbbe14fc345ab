//! # Configuration
//!
//! Managed by [`clapfig`]: layered loading from TOML files, then environment
//! variables.
//!
//! ## Storage Hierarchy
//!
//! Resolved in priority order:
//! 1. **Environment variables**: `CLIPCANVAS__PRIORITIZE_MARKDOWN_OVER_TEXT`, etc.
//! 2. **Data directory config**: `<data dir>/clipcanvas.toml`.
//! 3. **Compiled defaults**: via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `prioritize_markdown_over_text` | `false` | Pasted text and links become markdown canvases |
//! | `paste_files_as_reference` | `true` | A pasted file is linked, not copied |
//! | `text_probe_limit` | `8192` | Bytes read when guessing whether an unknown file is text |
//! | `default_collection` | `<data dir>/Default Collection` | Folder opened when none is given |

use crate::content_type::ClassifierSettings;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_COLLECTION_NAME: &str = "Default Collection";

/// Configuration for clipcanvas, stored in `clipcanvas.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Store pasted text and links as markdown instead of plain text / website links.
    #[config(default = false)]
    pub prioritize_markdown_over_text: bool,

    /// When a single file is pasted, store a reference to it instead of a copy.
    #[config(default = true)]
    pub paste_files_as_reference: bool,

    /// How many bytes to read when checking whether an unknown file is text.
    #[config(default = 8192)]
    pub text_probe_limit: usize,

    /// Collection folder used when none is given explicitly.
    pub default_collection: Option<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            prioritize_markdown_over_text: false,
            paste_files_as_reference: true,
            text_probe_limit: 8192,
            default_collection: None,
        }
    }
}

impl CanvasConfig {
    pub fn classifier_settings(&self) -> ClassifierSettings {
        ClassifierSettings {
            prioritize_markdown_over_text: self.prioritize_markdown_over_text,
            text_probe_limit: self.text_probe_limit.max(1),
        }
    }

    /// The configured default collection, or `Default Collection` under `data_dir`.
    pub fn default_collection(&self, data_dir: &std::path::Path) -> PathBuf {
        self.default_collection
            .clone()
            .unwrap_or_else(|| data_dir.join(DEFAULT_COLLECTION_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = CanvasConfig::default();
        assert!(!config.prioritize_markdown_over_text);
        assert!(config.paste_files_as_reference);
        assert_eq!(config.classifier_settings(), ClassifierSettings::default());
    }

    #[test]
    fn test_default_collection_under_data_dir() {
        let config = CanvasConfig::default();
        assert_eq!(
            config.default_collection(Path::new("/data")),
            Path::new("/data/Default Collection")
        );

        let config = CanvasConfig {
            default_collection: Some(PathBuf::from("/clips")),
            ..Default::default()
        };
        assert_eq!(config.default_collection(Path::new("/data")), Path::new("/clips"));
    }

    #[test]
    fn test_zero_probe_limit_is_clamped() {
        let config = CanvasConfig {
            text_probe_limit: 0,
            ..Default::default()
        };
        assert_eq!(config.classifier_settings().text_probe_limit, 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let toml = r#"
prioritize_markdown_over_text = true
paste_files_as_reference = false
text_probe_limit = 1024
"#;
        let config: CanvasConfig = toml::from_str(toml).unwrap();
        assert!(config.prioritize_markdown_over_text);
        assert!(!config.paste_files_as_reference);
        assert_eq!(config.text_probe_limit, 1024);
        assert!(config.default_collection.is_none());
    }
}
