// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector primitives shared by the scoring and alignment code.

use nalgebra::{Point3, Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Normals shorter than this cannot be normalized reliably.
pub const MIN_NORMAL_LENGTH: f64 = 1e-6;

/// A 3D vector (simplified for serialization)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3D {
    pub const ZERO: Vec3D = Vec3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }

    pub fn from_point(p: &Point3<f64>) -> Self {
        Self {
            x: p.x,
            y: p.y,
            z: p.z,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<Vector3<f64>> for Vec3D {
    fn from(v: Vector3<f64>) -> Self {
        Self::from_vector(&v)
    }
}

impl From<Point3<f64>> for Vec3D {
    fn from(p: Point3<f64>) -> Self {
        Self::from_point(&p)
    }
}

/// Normalizes `v`, returning `None` for degenerate or non-finite input.
#[inline]
pub fn try_normalize(v: &Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    Unit::try_new(*v, MIN_NORMAL_LENGTH)
}

/// Absolute cosine between two directions, in [0, 1].
///
/// Both inputs are expected to be unit length; the result is clamped so that
/// rounding never pushes it above 1.
#[inline]
pub fn abs_cosine(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    a.dot(b).abs().min(1.0)
}

/// Unsigned angle between two directions in radians, in [0, π].
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < MIN_NORMAL_LENGTH {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Drops the vertical (+Y) component and renormalizes.
///
/// Returns `None` when the direction is (nearly) vertical.
pub fn horizontal_direction(v: &Vector3<f64>) -> Option<Unit<Vector3<f64>>> {
    try_normalize(&Vector3::new(v.x, 0.0, v.z))
}

/// Heading of a horizontal direction about +Y, measured from +Z towards +X.
#[inline]
pub fn heading(v: &Vector3<f64>) -> f64 {
    v.x.atan2(v.z)
}

/// Wraps an angle into (-π, π].
pub fn wrap_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn normalize_rejects_degenerate() {
        assert!(try_normalize(&Vector3::new(0.0, 0.0, 0.0)).is_none());
        assert!(try_normalize(&Vector3::new(1e-9, 0.0, 0.0)).is_none());
        assert!(try_normalize(&Vector3::new(f64::NAN, 1.0, 0.0)).is_none());

        let n = try_normalize(&Vector3::new(3.0, 0.0, 4.0)).unwrap();
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.x, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn angle_between_axes() {
        let x = Vector3::x();
        let z = Vector3::z();
        assert_relative_eq!(angle_between(&x, &z), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&x, &-x), PI, epsilon = 1e-12);
        assert_relative_eq!(angle_between(&x, &x), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn horizontal_direction_drops_y() {
        let d = horizontal_direction(&Vector3::new(1.0, 5.0, 0.0)).unwrap();
        assert_relative_eq!(d.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(d.y, 0.0);
        assert!(horizontal_direction(&Vector3::y()).is_none());
    }

    #[test]
    fn wrap_angle_range() {
        assert_relative_eq!(wrap_angle(3.0 * PI / 2.0), -FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-3.0 * PI / 2.0), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(PI), PI, epsilon = 1e-12);
        assert_relative_eq!(wrap_angle(-PI), PI, epsilon = 1e-12);
    }

    #[test]
    fn vec3d_conversions() {
        let v = Vec3D::new(1.0, 2.0, 3.0);
        assert_eq!(Vec3D::from(v.to_vector()), v);
        assert_eq!(Vec3D::from(v.to_point()), v);
        assert!(!Vec3D::new(f64::INFINITY, 0.0, 0.0).is_finite());
    }
}
