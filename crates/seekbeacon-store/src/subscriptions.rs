//! Subscription registry file
//!
//! A single JSON object mapping stream id to an array of listener ids.
//! Writes go to a sibling temp file which is then persisted over the target,
//! so readers see either the old registry or the new one, never a torn file.
//!
//! Entries whose value is not an array of strings are skipped on load and
//! counted; the rest of the registry stays usable. Only invalid JSON or a
//! non-object root makes the whole file `Malformed`.
//!
//! Read-modify-write is not isolated across processes. Two listeners that
//! claim the same stream concurrently may both land in its list, or one
//! claim may be lost to the later write. No lock is taken.

use crate::error::{Result, StoreError};
use seekbeacon_core::SubscriptionRegistry;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, Clone)]
pub struct SubscriptionStore {
    path: PathBuf,
}

impl SubscriptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file is an empty registry. Bad entries are dropped silently;
    /// use [`load_counted`](Self::load_counted) to learn how many.
    pub fn load(&self) -> Result<SubscriptionRegistry> {
        self.load_counted().map(|(registry, _)| registry)
    }

    /// Load the registry and the number of entries skipped as malformed.
    pub fn load_counted(&self) -> Result<(SubscriptionRegistry, usize)> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok((SubscriptionRegistry::new(), 0)),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };
        match serde_json::from_str::<Value>(&data) {
            Ok(Value::Object(map)) => Ok(SubscriptionRegistry::from_lenient(map)),
            Ok(_) => Err(StoreError::malformed(&self.path, "root is not an object")),
            Err(e) => Err(StoreError::malformed(&self.path, e.to_string())),
        }
    }

    /// Replace the registry file atomically.
    pub fn save(&self, registry: &SubscriptionRegistry) -> Result<()> {
        let mut json = serde_json::to_string_pretty(registry)?;
        json.push('\n');

        let dir = match self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            Some(d) => {
                fs::create_dir_all(d).map_err(|e| StoreError::io(d, e))?;
                d.to_path_buf()
            }
            None => PathBuf::from("."),
        };

        // Dropped (and removed) on any early return.
        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::io(tmp.path().to_path_buf(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}
