// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial-scan import.
//!
//! Converts an exported room scan into [`Wall`] records. The export lists
//! every detected wall as an identifier, a flattened column-major 4x4
//! transform and its planar dimensions:
//!
//! ```json
//! { "walls": [ { "identifier": "A1", "transform": [16 floats], "dimensions": [4.2, 2.6, 0.0] } ] }
//! ```
//!
//! The wall's local +Z axis (third column) is its normal and the
//! translation column is its center. Walls too small or too degenerate to be
//! useful for alignment are rejected here so they never reach scoring.

use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::vector::MIN_NORMAL_LENGTH;
use crate::wall::{Wall, WallDimensions};

/// Scanned walls narrower than this are dropped.
pub const MIN_SCAN_WALL_WIDTH: f64 = 0.15;
/// Scanned walls lower than this are dropped.
pub const MIN_SCAN_WALL_HEIGHT: f64 = 0.5;

#[derive(Debug, Deserialize)]
struct ScanExport {
    #[serde(default)]
    walls: Vec<ScanWallEntry>,
}

#[derive(Debug, Deserialize)]
struct ScanWallEntry {
    identifier: String,
    transform: Vec<f64>,
    dimensions: Vec<f64>,
}

/// A wall entry that did not make it into the import.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedWall {
    pub identifier: String,
    pub reason: String,
}

/// Result of importing a scan export.
#[derive(Debug, Clone, Default)]
pub struct ScanImport {
    pub walls: Vec<Wall>,
    pub rejected: Vec<RejectedWall>,
}

impl ScanImport {
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }
}

/// Parses a scan export from JSON text.
///
/// Malformed JSON is an error; individual unusable walls are collected in
/// [`ScanImport::rejected`] instead.
pub fn import_scan_json(content: &str) -> Result<ScanImport> {
    let export: ScanExport = serde_json::from_str(content)?;
    let mut import = ScanImport::default();
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for entry in export.walls {
        if !seen.insert(entry.identifier.clone()) {
            tracing::warn!(wall_id = %entry.identifier, "Duplicate wall identifier in scan export");
            import.rejected.push(RejectedWall {
                identifier: entry.identifier,
                reason: "duplicate identifier".into(),
            });
            continue;
        }

        match wall_from_entry(&entry) {
            Ok(wall) => import.walls.push(wall),
            Err(reason) => {
                tracing::warn!(wall_id = %entry.identifier, %reason, "Rejected scanned wall");
                import.rejected.push(RejectedWall {
                    identifier: entry.identifier,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        accepted = import.walls.len(),
        rejected = import.rejected.len(),
        "Imported scan walls"
    );
    Ok(import)
}

/// Builds a wall from a column-major transform and planar dimensions.
pub fn wall_from_transform(
    identifier: &str,
    transform: &[f64],
    width: f64,
    height: f64,
) -> Result<Wall> {
    if transform.len() != 16 {
        return Err(Error::InvalidTransform {
            id: identifier.to_string(),
            len: transform.len(),
        });
    }
    if !transform.iter().all(|v| v.is_finite()) {
        return Err(Error::NonFinite {
            id: identifier.to_string(),
            field: "transform",
        });
    }

    let m = Matrix4::from_column_slice(transform);
    let normal = Vector3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
    let center = Point3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);

    Wall::new(identifier, normal, center, WallDimensions::new(width, height))
}

fn wall_from_entry(entry: &ScanWallEntry) -> std::result::Result<Wall, String> {
    let (width, height) = match entry.dimensions.as_slice() {
        [w, h, ..] => (*w, *h),
        other => return Err(format!("expected at least 2 dimensions, got {}", other.len())),
    };

    if entry.transform.len() == 16 {
        let n = Vector3::new(entry.transform[8], entry.transform[9], entry.transform[10]);
        if n.norm() < MIN_NORMAL_LENGTH {
            return Err("near-zero normal".into());
        }
    }
    if !(width >= MIN_SCAN_WALL_WIDTH) {
        return Err(format!(
            "width {:.3} m below minimum {} m",
            width, MIN_SCAN_WALL_WIDTH
        ));
    }
    if !(height >= MIN_SCAN_WALL_HEIGHT) {
        return Err(format!(
            "height {:.3} m below minimum {} m",
            height, MIN_SCAN_WALL_HEIGHT
        ));
    }

    wall_from_transform(&entry.identifier, &entry.transform, width, height)
        .map_err(|e| e.to_string())
}
