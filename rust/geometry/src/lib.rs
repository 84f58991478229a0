// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-Anchor Geometry
//!
//! Validated wall records, vector and plane primitives built on nalgebra, and
//! the spatial-scan importer that turns an exported room scan into walls.

pub mod error;
pub mod plane;
pub mod scan_import;
pub mod vector;
pub mod wall;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};

pub use error::{Error, Result};
pub use plane::{
    are_coplanar, is_parallel, is_perpendicular, perpendicularity, plane_angle, signed_distance,
};
pub use scan_import::{import_scan_json, wall_from_transform, RejectedWall, ScanImport};
pub use vector::Vec3D;
pub use wall::{Wall, WallDimensions, WallRecord, WallVertices};
