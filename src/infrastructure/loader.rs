//! Loading tree definitions from TOML files

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use crate::domain::{SkillTree, SkillTreeBuilder, TreeDef};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{InfraError, InfraResult};

/// File extension of tree definition files.
pub const TREE_FILE_EXTENSION: &str = "toml";

pub struct TreeLoader {
    fs: Arc<dyn FileSystem>,
}

impl TreeLoader {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a definition without building the forest.
    pub fn read_def(&self, path: &Path) -> InfraResult<TreeDef> {
        let content = self
            .fs
            .read_to_string(path)
            .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| InfraError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    #[instrument(level = "debug", skip(self))]
    pub fn load_file(&self, path: &Path) -> InfraResult<SkillTree> {
        let def = self.read_def(path)?;
        let tree = SkillTreeBuilder::new().build(&def)?;
        debug!("loaded {} from {}", tree.tree_id, path.display());
        Ok(tree)
    }

    /// Every `*.toml` below `dir` except hidden files, ordered by path.
    pub fn definition_files(&self, dir: &Path) -> InfraResult<Vec<PathBuf>> {
        if !self.fs.is_dir(dir) {
            return Err(InfraError::io(
                format!("not a directory: {}", dir.display()),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let context = format!("scan {}", dir.display());
                match e.into_io_error() {
                    Some(io) => InfraError::io(context, io),
                    None => InfraError::io(context, std::io::Error::other("filesystem loop")),
                }
            })?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            let is_def = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == TREE_FILE_EXTENSION);
            if entry.file_type().is_file() && is_def && !hidden {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Load every definition below `dir`; the first broken file aborts.
    #[instrument(level = "debug", skip(self))]
    pub fn load_directory(&self, dir: &Path) -> InfraResult<Vec<SkillTree>> {
        let files = self.definition_files(dir)?;
        if files.is_empty() {
            warn!("no tree definitions found in {}", dir.display());
        }
        files.iter().map(|f| self.load_file(f)).collect()
    }
}
