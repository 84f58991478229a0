// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plane-to-plane comparisons between walls.
//!
//! Each wall defines the infinite plane through its center with its normal.

use nalgebra::Point3;

use crate::vector::{abs_cosine, angle_between};
use crate::wall::Wall;

/// Perpendicularity score of two walls: `1 − |n₁·n₂|`.
///
/// 1.0 for walls at a right angle, 0.0 for parallel (or anti-parallel) walls.
#[inline]
pub fn perpendicularity(a: &Wall, b: &Wall) -> f64 {
    1.0 - abs_cosine(a.normal(), b.normal())
}

/// Angle between the two wall planes in radians, folded into [0, π/2].
pub fn plane_angle(a: &Wall, b: &Wall) -> f64 {
    let angle = angle_between(a.normal(), b.normal());
    angle.min(std::f64::consts::PI - angle)
}

/// Planes within `tolerance` radians of parallel.
pub fn is_parallel(a: &Wall, b: &Wall, tolerance: f64) -> bool {
    plane_angle(a, b) <= tolerance
}

/// Planes within `tolerance` radians of a right angle.
pub fn is_perpendicular(a: &Wall, b: &Wall, tolerance: f64) -> bool {
    (std::f64::consts::FRAC_PI_2 - plane_angle(a, b)).abs() <= tolerance
}

/// Signed distance from `point` to the plane of `wall`, positive on the
/// side the normal points to.
#[inline]
pub fn signed_distance(wall: &Wall, point: &Point3<f64>) -> f64 {
    wall.normal().dot(&(point - wall.center()))
}

/// Parallel planes whose centers are within `distance` of each other's plane.
pub fn are_coplanar(a: &Wall, b: &Wall, angle_tolerance: f64, distance: f64) -> bool {
    is_parallel(a, b, angle_tolerance)
        && signed_distance(a, b.center()).abs() <= distance
        && signed_distance(b, a.center()).abs() <= distance
}
