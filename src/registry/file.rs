use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{RegistryDocument, RegistryError, TaskRegistry};
use crate::kernel::record::TaskRecord;

/// Registry backed by a JSON document the registrar rewrites in place.
///
/// The document is re-read on every snapshot; nothing is cached between cycles.
#[derive(Debug)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    /// Opens the registry, failing when the document cannot be read or parsed.
    pub fn open(path: &Path) -> Result<Self, RegistryError> {
        let registry = Self {
            path: path.to_path_buf(),
        };
        let document = registry.load()?;
        debug!(path = %path.display(), tasks = document.tasks.len(), "registry opened");
        Ok(registry)
    }

    fn load(&self) -> Result<RegistryDocument, RegistryError> {
        let content = fs::read_to_string(&self.path).map_err(|source| RegistryError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

impl TaskRegistry for FileRegistry {
    fn snapshot(&self) -> Result<Vec<TaskRecord>, RegistryError> {
        Ok(self.load()?.tasks)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
