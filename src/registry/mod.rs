//! Read-only access to the externally maintained task registry.
//!
//! The registrar owns every entry. Nothing in this crate inserts, rewrites or
//! removes records, including records whose task has died.

pub mod file;
pub mod memory;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::record::TaskRecord;

pub use file::FileRegistry;
pub use memory::InMemoryRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry {path} unavailable: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk shape of the registry document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

/// Handle to a task registry. Iteration order is backend-defined.
pub trait TaskRegistry: Send + Sync {
    /// Every record currently in the registry.
    fn snapshot(&self) -> Result<Vec<TaskRecord>, RegistryError>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Opens the file-backed registry at `path`. Failure here is fatal to the caller.
pub fn open(path: &Path) -> Result<Box<dyn TaskRegistry>, RegistryError> {
    Ok(Box::new(FileRegistry::open(path)?))
}
