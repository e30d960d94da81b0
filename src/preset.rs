// Named crop presets, persisted as a single JSON mapping (name -> rect).
// The whole file is rewritten on every mutation; writes go to a temporary
// name first and are renamed into place.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{OctExtractError, Result};
use crate::transform::CropRect;

/// One saved crop preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub crop: CropRect,
}

/// Process-wide store of crop presets, loaded once at startup and flushed
/// synchronously on every mutation. Names are unique; `save` replaces.
pub struct PresetStore {
    path: PathBuf,
    presets: BTreeMap<String, CropRect>,
}

impl PresetStore {
    /// Load the store from `path`. A missing file yields an empty store;
    /// a present but unreadable or malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let presets = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| OctExtractError::preset_store(e.to_string()))?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };
        debug!(path = %path.display(), count = presets.len(), "preset store loaded");
        Ok(Self { path, presets })
    }

    /// Insert or replace by name, then persist. Idempotent.
    pub fn save(&mut self, name: impl Into<String>, crop: CropRect) -> Result<()> {
        let name = name.into();
        info!(preset = %name, "saving crop preset");
        self.presets.insert(name, crop);
        self.persist()
    }

    /// Remove a preset. Deleting an absent name is a no-op, not an error;
    /// nothing is rewritten in that case.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if self.presets.remove(name).is_some() {
            info!(preset = %name, "deleted crop preset");
            self.persist()?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Preset> {
        self.presets
            .get(name)
            .map(|crop| Preset {
                name: name.to_string(),
                crop: *crop,
            })
            .ok_or_else(|| OctExtractError::PresetNotFound(name.to_string()))
    }

    /// All presets, ordered by name.
    pub fn list(&self) -> Vec<Preset> {
        self.presets
            .iter()
            .map(|(name, crop)| Preset {
                name: name.clone(),
                crop: *crop,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| OctExtractError::preset_store(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.presets)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json.as_bytes())
            .map_err(|e| OctExtractError::preset_store(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            OctExtractError::preset_store(e.to_string())
        })?;
        Ok(())
    }
}
