use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::export::{DuplicatePolicy, ExportFormat};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub format: ExportFormat,
    pub on_duplicate: DuplicatePolicy,
    pub export_metadata: bool,
    pub preset_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            format: ExportFormat::Png,
            on_duplicate: DuplicatePolicy::Overwrite,
            export_metadata: false,
            preset_file: PathBuf::from("presets.json"),
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yml::from_str(yaml).map_err(|e| {
            crate::error::OctExtractError::config(format!("Failed to parse settings YAML: {e}"))
        })
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }
}
