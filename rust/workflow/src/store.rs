// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Persistence of the last manual and automatic alignment.
//!
//! Each kind lives in one JSON file under the storage directory, keyed by a
//! fixed name. Loading never fails: a missing or unreadable entry is `None`.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::error::StoreError;
use crate::platform::Transformation;

/// Which alignment a stored entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentKind {
    /// Set by the user through manual adjustment.
    Manual,
    /// Produced by the auto-alignment calculator.
    Automatic,
}

impl AlignmentKind {
    pub fn storage_key(&self) -> &'static str {
        match self {
            AlignmentKind::Manual => "manual-alignment",
            AlignmentKind::Automatic => "auto-alignment",
        }
    }
}

/// One persisted alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAlignment {
    pub transformation: Transformation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub updated_at: u64,
}

/// File-backed alignment store.
#[derive(Debug, Clone)]
pub struct AlignmentStore {
    dir: PathBuf,
}

impl AlignmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &WorkflowConfig) -> Self {
        Self::new(&config.storage_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, kind: AlignmentKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.storage_key()))
    }

    /// Writes `transformation` as the latest alignment of `kind`.
    pub async fn save(
        &self,
        kind: AlignmentKind,
        transformation: Transformation,
        model_id: Option<&str>,
    ) -> Result<StoredAlignment, StoreError> {
        let entry = StoredAlignment {
            transformation,
            model_id: model_id.map(str::to_string),
            updated_at: now_millis(),
        };
        let data = serde_json::to_vec_pretty(&entry)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.entry_path(kind), &data).await?;
        tracing::debug!(key = kind.storage_key(), size = data.len(), "Stored alignment");
        Ok(entry)
    }

    /// Reads the latest alignment of `kind`.
    pub async fn load(&self, kind: AlignmentKind) -> Option<StoredAlignment> {
        let path = self.entry_path(kind);
        let data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to read stored alignment"
                );
                return None;
            }
        };
        match serde_json::from_slice(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Ignoring malformed stored alignment"
                );
                None
            }
        }
    }

    /// Removes the stored alignment of `kind`. Missing entries are fine.
    pub async fn clear(&self, kind: AlignmentKind) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.entry_path(kind)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wall_anchor_geometry::Vec3D;

    fn temp_store(name: &str) -> AlignmentStore {
        let dir = std::env::temp_dir().join(format!(
            "wall-anchor-store-{}-{}",
            std::process::id(),
            name
        ));
        let _ = std::fs::remove_dir_all(&dir);
        AlignmentStore::new(dir)
    }

    fn transformation() -> Transformation {
        Transformation {
            position: Vec3D::new(1.0, 0.0, -2.5),
            rotation: Vec3D::new(0.0, 1.2, 0.0),
            scale: 1.05,
        }
    }

    #[tokio::test]
    async fn save_then_load_each_kind() {
        let store = temp_store("roundtrip");
        assert!(store.load(AlignmentKind::Manual).await.is_none());

        let saved = store
            .save(AlignmentKind::Automatic, transformation(), Some("house.usdz"))
            .await
            .unwrap();
        assert!(saved.updated_at > 0);

        let loaded = store.load(AlignmentKind::Automatic).await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.model_id.as_deref(), Some("house.usdz"));
        assert!(store.load(AlignmentKind::Manual).await.is_none());

        store.clear(AlignmentKind::Automatic).await.unwrap();
        assert!(store.load(AlignmentKind::Automatic).await.is_none());
        store.clear(AlignmentKind::Automatic).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_entry_loads_as_none() {
        let store = temp_store("malformed");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.dir().join("manual-alignment.json"), b"{ not json").unwrap();
        assert!(store.load(AlignmentKind::Manual).await.is_none());
    }

    #[tokio::test]
    async fn stored_json_uses_camel_case_keys() {
        let store = temp_store("format");
        store.save(AlignmentKind::Manual, transformation(), None).await.unwrap();
        let raw = std::fs::read_to_string(store.dir().join("manual-alignment.json")).unwrap();
        assert!(raw.contains("\"updatedAt\""));
        assert!(raw.contains("\"transformation\""));
        assert!(!raw.contains("modelId"));
    }
}
