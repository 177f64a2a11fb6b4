//! File-backed save handler
//!
//! Writes the opaque per-tree state as JSON to
//! `<state_dir>/<storage>/<tree_id>.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::SaveHandler;
use crate::application::SaveError;
use crate::domain::{SavedData, StorageHandle};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

#[derive(Clone)]
pub struct JsonFileSaveHandler {
    fs: Arc<dyn FileSystem>,
    state_dir: PathBuf,
}

impl JsonFileSaveHandler {
    pub fn new(fs: Arc<dyn FileSystem>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            state_dir: state_dir.into(),
        }
    }

    pub fn state_path(&self, storage: StorageHandle, tree_id: &str) -> PathBuf {
        let file_name: String = tree_id
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.state_dir
            .join(storage.to_string())
            .join(format!("{file_name}.json"))
    }

    /// Saved state of a tree, None if it was never saved.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, storage: StorageHandle, tree_id: &str) -> InfraResult<Option<SavedData>> {
        let path = self.state_path(storage, tree_id);
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        let data = serde_json::from_str(&content).map_err(|e| InfraError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(data))
    }

    #[instrument(level = "debug", skip(self, state))]
    pub fn write(
        &self,
        storage: StorageHandle,
        tree_id: &str,
        state: &SavedData,
    ) -> InfraResult<PathBuf> {
        let path = self.state_path(storage, tree_id);
        let json = serde_json::to_string_pretty(state).map_err(|e| InfraError::Serialize {
            tree_id: tree_id.to_string(),
            message: e.to_string(),
        })?;
        self.fs
            .ensure_parent(&path)
            .map_err(|e| InfraError::io(format!("create parent of {}", path.display()), e))?;

        // Write then rename so readers never see a truncated file
        let tmp = path.with_extension("json.tmp");
        self.fs
            .write(&tmp, &json)
            .map_err(|e| InfraError::io(format!("write {}", tmp.display()), e))?;
        self.fs
            .rename(&tmp, &path)
            .map_err(|e| InfraError::io(format!("rename to {}", path.display()), e))?;
        debug!("wrote {}", path.display());
        Ok(path)
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

impl SaveHandler for JsonFileSaveHandler {
    fn save(
        &self,
        storage: StorageHandle,
        tree_id: &str,
        state: &SavedData,
    ) -> Result<(), SaveError> {
        self.write(storage, tree_id, state)?;
        Ok(())
    }
}
