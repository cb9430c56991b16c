//! Snapshot file persistence.
//!
//! The whole snapshot is serialized in memory before the file is touched,
//! so a serialization error never clobbers the previous file.

pub mod error;

use std::path::{Path, PathBuf};

pub use error::{PersistError, PersistResult};

use crate::market_data::PriceSnapshot;

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "./priceData.json";

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub path: PathBuf,
    pub bytes: usize,
}

/// Writes snapshots to one fixed file, replacing its content each time.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the file with compact JSON. Not retried on failure.
    pub fn save(&self, snapshot: &PriceSnapshot) -> PersistResult<PersistReport> {
        let json = serde_json::to_vec(snapshot)?;

        std::fs::write(&self.path, &json).map_err(|source| PersistError::Write {
            path: self.path.clone(),
            source,
        })?;

        Ok(PersistReport {
            path: self.path.clone(),
            bytes: json.len(),
        })
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}
