// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall records.
//!
//! A [`Wall`] is the only geometric input the alignment engine accepts. It is
//! validated once at construction (unit normal, positive dimensions, finite
//! coordinates) and is read-only afterwards, so every algorithm downstream can
//! treat walls as plain values.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::vector::{try_normalize, Vec3D};

/// Width and height of a planar wall, in meters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WallDimensions {
    pub width: f64,
    pub height: f64,
}

impl WallDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides positive and finite.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Width divided by height.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Longer side first, shorter side second.
    #[inline]
    pub fn dominant_axes(&self) -> (f64, f64) {
        if self.width >= self.height {
            (self.width, self.height)
        } else {
            (self.height, self.width)
        }
    }
}

/// Corner points of a wall; almost always four.
pub type WallVertices = SmallVec<[Point3<f64>; 4]>;

/// A validated planar wall from a model or a live scan
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    id: String,
    normal: Unit<Vector3<f64>>,
    center: Point3<f64>,
    dimensions: WallDimensions,
    vertices: Option<WallVertices>,
}

impl Wall {
    /// Builds a wall, normalizing `normal`.
    ///
    /// Fails for a normal shorter than [`crate::vector::MIN_NORMAL_LENGTH`],
    /// non-positive dimensions or non-finite coordinates.
    pub fn new(
        id: impl Into<String>,
        normal: Vector3<f64>,
        center: Point3<f64>,
        dimensions: WallDimensions,
    ) -> Result<Self> {
        let id = id.into();

        if !center.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::NonFinite { id, field: "center" });
        }
        if !dimensions.is_valid() {
            return Err(Error::InvalidDimensions {
                id,
                width: dimensions.width,
                height: dimensions.height,
            });
        }
        let normal = match try_normalize(&normal) {
            Some(n) => n,
            None => {
                let length = normal.norm();
                return Err(Error::DegenerateNormal { id, length });
            }
        };

        Ok(Self {
            id,
            normal,
            center,
            dimensions,
            vertices: None,
        })
    }

    /// Attaches corner points used for adjacency tests.
    pub fn with_vertices<I>(mut self, vertices: I) -> Result<Self>
    where
        I: IntoIterator<Item = Point3<f64>>,
    {
        let vertices: WallVertices = vertices.into_iter().collect();
        if !vertices
            .iter()
            .all(|p| p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(Error::NonFinite {
                id: self.id,
                field: "vertices",
            });
        }
        self.vertices = Some(vertices);
        Ok(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Outward unit normal.
    pub fn normal(&self) -> &Vector3<f64> {
        self.normal.as_ref()
    }

    pub fn center(&self) -> &Point3<f64> {
        &self.center
    }

    pub fn dimensions(&self) -> WallDimensions {
        self.dimensions
    }

    pub fn area(&self) -> f64 {
        self.dimensions.area()
    }

    pub fn vertices(&self) -> Option<&[Point3<f64>]> {
        self.vertices.as_deref()
    }

    /// True when any corner of `self` lies within `tolerance` of any corner
    /// of `other`. Walls without vertices are never adjacent.
    pub fn shares_vertex_with(&self, other: &Wall, tolerance: f64) -> bool {
        let (Some(a), Some(b)) = (self.vertices(), other.vertices()) else {
            return false;
        };
        let tol_sq = tolerance * tolerance;
        a.iter()
            .any(|p| b.iter().any(|q| (p - q).norm_squared() <= tol_sq))
    }

    /// Serializable form of this wall.
    pub fn to_record(&self) -> WallRecord {
        WallRecord {
            id: self.id.clone(),
            normal: Vec3D::from_vector(self.normal()),
            center: Vec3D::from_point(&self.center),
            dimensions: self.dimensions,
            vertices: self
                .vertices
                .as_ref()
                .map(|vs| vs.iter().map(Vec3D::from_point).collect()),
        }
    }
}

/// Wire form of a wall as exchanged with the native platform.
///
/// Converting into a [`Wall`] runs the full validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WallRecord {
    pub id: String,
    pub normal: Vec3D,
    pub center: Vec3D,
    pub dimensions: WallDimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertices: Option<Vec<Vec3D>>,
}

impl TryFrom<WallRecord> for Wall {
    type Error = Error;

    fn try_from(record: WallRecord) -> Result<Self> {
        let wall = Wall::new(
            record.id,
            record.normal.to_vector(),
            record.center.to_point(),
            record.dimensions,
        )?;
        match record.vertices {
            Some(vs) => wall.with_vertices(vs.iter().map(Vec3D::to_point)),
            None => Ok(wall),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dims(w: f64, h: f64) -> WallDimensions {
        WallDimensions::new(w, h)
    }

    #[test]
    fn new_normalizes_normal() {
        let wall = Wall::new(
            "w1",
            Vector3::new(0.0, 0.0, 2.0),
            Point3::origin(),
            dims(3.0, 2.5),
        )
        .unwrap();
        assert_relative_eq!(wall.normal().norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(wall.normal().z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(wall.area(), 7.5);
    }

    #[test]
    fn new_rejects_degenerate_normal() {
        let err = Wall::new(
            "bad",
            Vector3::new(1e-8, 0.0, 0.0),
            Point3::origin(),
            dims(1.0, 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, Error::DegenerateNormal { .. }));
    }

    #[test]
    fn new_rejects_non_positive_dimensions() {
        for d in [dims(0.0, 2.0), dims(2.0, -1.0), dims(f64::NAN, 2.0)] {
            let err = Wall::new("bad", Vector3::z(), Point3::origin(), d).unwrap_err();
            assert!(matches!(err, Error::InvalidDimensions { .. }));
        }
    }

    #[test]
    fn new_rejects_non_finite_center() {
        let err = Wall::new(
            "bad",
            Vector3::z(),
            Point3::new(f64::INFINITY, 0.0, 0.0),
            dims(1.0, 1.0),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NonFinite { field: "center", .. }));
    }

    #[test]
    fn shared_corner_within_one_centimeter() {
        let a = Wall::new("a", Vector3::z(), Point3::new(1.0, 1.0, 0.0), dims(2.0, 2.0))
            .unwrap()
            .with_vertices([
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
                Point3::new(0.0, 2.0, 0.0),
            ])
            .unwrap();
        let b = Wall::new("b", Vector3::x(), Point3::new(2.0, 1.0, 1.0), dims(2.0, 2.0))
            .unwrap()
            .with_vertices([
                Point3::new(2.005, 0.0, 0.0),
                Point3::new(2.0, 0.0, 2.0),
            ])
            .unwrap();
        let c = Wall::new("c", Vector3::x(), Point3::new(5.0, 1.0, 1.0), dims(2.0, 2.0))
            .unwrap()
            .with_vertices([Point3::new(5.0, 0.0, 0.0)])
            .unwrap();

        assert!(a.shares_vertex_with(&b, 0.01));
        assert!(!a.shares_vertex_with(&c, 0.01));

        let bare = Wall::new("d", Vector3::x(), Point3::origin(), dims(1.0, 1.0)).unwrap();
        assert!(!a.shares_vertex_with(&bare, 0.01));
    }

    #[test]
    fn record_conversion_validates() {
        let record = WallRecord {
            id: "r".into(),
            normal: Vec3D::new(0.0, 0.0, 0.0),
            center: Vec3D::ZERO,
            dimensions: dims(1.0, 1.0),
            vertices: None,
        };
        assert!(Wall::try_from(record).is_err());

        let wall = Wall::new("ok", Vector3::x(), Point3::new(1.0, 2.0, 3.0), dims(4.0, 2.5))
            .unwrap()
            .with_vertices([Point3::new(1.0, 0.0, 0.0)])
            .unwrap();
        let back = Wall::try_from(wall.to_record()).unwrap();
        assert_eq!(back, wall);
    }

    #[test]
    fn record_json_shape() {
        let json = r#"{
            "id": "w",
            "normal": {"x": 1, "y": 0, "z": 0},
            "center": {"x": 0, "y": 1.5, "z": 0},
            "dimensions": {"width": 4, "height": 3}
        }"#;
        let record: WallRecord = serde_json::from_str(json).unwrap();
        let wall = Wall::try_from(record).unwrap();
        assert_eq!(wall.id(), "w");
        assert!(wall.vertices().is_none());
        assert_relative_eq!(wall.dimensions().aspect_ratio(), 4.0 / 3.0);
    }
}
