// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Auto-alignment between a virtual (model) wall and a real (scanned) wall.
//!
//! The result is a uniform similarity transform applied to the model about
//! its pivot:
//!
//! ```text
//! world(p) = position + R · (scale · p)      p relative to the model pivot
//! ```
//!
//! `R` turns the source wall normal onto the target wall normal. When both
//! normals are horizontal `R` is a pure rotation about +Y and the model's up
//! axis is preserved; any tilt is handled by the shortest arc. `position` is
//! chosen so the source wall center lands exactly on the target wall center.

use nalgebra::{Matrix4, Point3, Rotation3, Unit, Vector3};
use serde::{Deserialize, Serialize};
use wall_anchor_geometry::vector::{heading, horizontal_direction, wrap_angle, MIN_NORMAL_LENGTH};
use wall_anchor_geometry::{Vec3D, Wall};

use crate::dimensions::{
    check_proportion_compatibility, scale_from_models, validate_real_world_scale, ModelInfo,
    ScaleContext, ScaleEstimate, ScaleValidation,
};
use crate::error::{Error, Result};

/// Normals whose dot product exceeds `1 − NORMAL_TOLERANCE` need no rotation.
pub const NORMAL_TOLERANCE: f64 = 1e-9;

/// Largest vertical component of a unit normal still treated as horizontal.
pub const HORIZONTAL_TOLERANCE: f64 = 1e-6;

const CONFIDENCE_EPSILON: f64 = 1e-9;

/// Transform that places a model onto the real environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentConfig {
    /// Uniform scale, always positive.
    pub scale: f64,
    /// Model pivot position in meters.
    pub position: Vec3D,
    /// Euler angles in radians, applied as `Rz · Ry · Rx`.
    pub rotation: Vec3D,
    /// Trust in this result, in [0, 1].
    pub confidence: f64,
}

impl AlignmentConfig {
    pub fn rotation_matrix(&self) -> Rotation3<f64> {
        Rotation3::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Homogeneous `T · R · S` matrix.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position.to_vector())
            * self.rotation_matrix().to_homogeneous()
            * Matrix4::new_scaling(self.scale)
    }

    /// Maps a pivot-relative model point into world space.
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.position.to_vector() + self.rotation_matrix() * (p.coords * self.scale))
    }
}

/// Relative weight of each factor in the confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceWeights {
    pub proportion: f64,
    pub scale: f64,
    pub plausibility: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            proportion: 0.5,
            scale: 0.3,
            plausibility: 0.2,
        }
    }
}

/// Full breakdown of one alignment calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentReport {
    pub config: AlignmentConfig,
    pub scale: ScaleEstimate,
    /// Proportion compatibility of the two walls.
    pub proportion: f64,
    /// `1.0` at scale 1, falling to `0.0` at 4x or 1/4x.
    pub scale_closeness: f64,
    pub source_validation: ScaleValidation,
    pub target_validation: ScaleValidation,
}

/// How close a scale factor is to 1.0, symmetric in log space.
pub fn scale_closeness(scale: f64) -> f64 {
    if !(scale.is_finite() && scale > 0.0) {
        return 0.0;
    }
    1.0 - (scale.log2().abs() / 2.0).min(1.0)
}

/// Rotation turning `from` onto `to`, plus its Euler angle form.
///
/// Two horizontal normals give a rotation about +Y only. Anything else takes
/// the shortest arc about `from × to`.
pub fn rotation_between_normals(
    from: &Vector3<f64>,
    to: &Vector3<f64>,
) -> (Rotation3<f64>, Vec3D) {
    if from.dot(to) >= 1.0 - NORMAL_TOLERANCE {
        return (Rotation3::identity(), Vec3D::ZERO);
    }

    if is_horizontal(from) && is_horizontal(to) {
        if let (Some(h_from), Some(h_to)) = (horizontal_direction(from), horizontal_direction(to)) {
            let yaw = wrap_angle(heading(&h_to) - heading(&h_from));
            let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), yaw);
            return (rotation, Vec3D::new(0.0, yaw, 0.0));
        }
    }

    let rotation = Rotation3::rotation_between(from, to).unwrap_or_else(|| {
        // Anti-parallel: half turn about the axis perpendicular to `from`
        // that is closest to +Y.
        let axis = Unit::try_new(Vector3::y() - from * from.y, MIN_NORMAL_LENGTH)
            .unwrap_or_else(Vector3::x_axis);
        Rotation3::from_axis_angle(&axis, std::f64::consts::PI)
    });
    let (roll, pitch, yaw) = rotation.euler_angles();
    (rotation, Vec3D::new(roll, pitch, yaw))
}

fn is_horizontal(normal: &Vector3<f64>) -> bool {
    normal.y.abs() <= HORIZONTAL_TOLERANCE
}

/// Computes model-to-world alignments.
#[derive(Debug, Clone, Default)]
pub struct AlignmentCalculator {
    weights: ConfidenceWeights,
}

impl AlignmentCalculator {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    /// Runs the full calculation and keeps the intermediate scores.
    pub fn analyze(&self, source: &ModelInfo, target: &ModelInfo) -> Result<AlignmentReport> {
        ensure_usable(source, "source")?;
        ensure_usable(target, "target")?;

        let source_dims = source.dimensions();
        let target_dims = target.dimensions();

        let estimate = scale_from_models(source, target)?;
        let scale = estimate.scale;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::NonFinite("scale"));
        }

        let (rotation, euler) =
            rotation_between_normals(source.wall.normal(), target.wall.normal());

        let offset = (source.origin - source.wall.center()) * scale;
        let position = target.wall.center() + rotation * offset;
        if !position.coords.iter().all(|c| c.is_finite()) {
            return Err(Error::NonFinite("position"));
        }

        let proportion = check_proportion_compatibility(&source_dims, &target_dims);
        let closeness = scale_closeness(scale);
        let source_validation = validate_real_world_scale(&source_dims, ScaleContext::Wall);
        let target_validation = validate_real_world_scale(&target_dims, ScaleContext::Wall);
        let plausibility = [&source_validation, &target_validation]
            .iter()
            .filter(|v| v.valid)
            .count() as f64
            / 2.0;

        let w = &self.weights;
        let total_weight = w.proportion + w.scale + w.plausibility;
        let confidence = (w.proportion * proportion
            + w.scale * closeness
            + w.plausibility * plausibility)
            / total_weight;
        // Every factor is in [0, 1]; anything beyond rounding noise is a bug.
        if !(-CONFIDENCE_EPSILON..=1.0 + CONFIDENCE_EPSILON).contains(&confidence) {
            return Err(Error::NonFinite("confidence"));
        }
        let confidence = confidence.clamp(0.0, 1.0);

        let config = AlignmentConfig {
            scale,
            position: Vec3D::from_point(&position),
            rotation: euler,
            confidence,
        };

        tracing::debug!(
            source = %source.wall.id(),
            target = %target.wall.id(),
            scale,
            confidence,
            proportion,
            "Computed auto-alignment"
        );

        Ok(AlignmentReport {
            config,
            scale: estimate,
            proportion,
            scale_closeness: closeness,
            source_validation,
            target_validation,
        })
    }

    pub fn calculate(&self, source: &ModelInfo, target: &ModelInfo) -> Result<AlignmentConfig> {
        self.analyze(source, target).map(|r| r.config)
    }
}

fn ensure_usable(info: &ModelInfo, side: &str) -> Result<()> {
    let d = info.dimensions();
    if !d.is_valid() {
        return Err(Error::InsufficientData(format!(
            "{} wall {} has no usable dimensions ({} x {})",
            side,
            info.wall.id(),
            d.width,
            d.height
        )));
    }
    if !info.origin.coords.iter().all(|c| c.is_finite()) {
        return Err(Error::InsufficientData(format!(
            "{} model reference point is not finite",
            side
        )));
    }
    Ok(())
}

/// Aligns a source model onto a target with default confidence weights.
pub fn calculate_auto_alignment(source: &ModelInfo, target: &ModelInfo) -> Result<AlignmentConfig> {
    AlignmentCalculator::default().calculate(source, target)
}

/// Aligns a virtual wall onto a real wall, taking the local origin as the
/// model pivot.
pub fn calculate_wall_alignment(virtual_wall: &Wall, real_wall: &Wall) -> Result<AlignmentConfig> {
    calculate_auto_alignment(
        &ModelInfo::from_wall(virtual_wall.clone()),
        &ModelInfo::from_wall(real_wall.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use wall_anchor_geometry::WallDimensions;

    fn wall(id: &str, normal: Vector3<f64>, center: Point3<f64>, w: f64, h: f64) -> Wall {
        Wall::new(id, normal, center, WallDimensions::new(w, h)).unwrap()
    }

    fn assert_point_eq(a: &Point3<f64>, b: &Point3<f64>) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-9);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-9);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-9);
    }

    #[test]
    fn identical_walls_give_identity() {
        let w = wall("w", Vector3::z(), Point3::new(1.0, 1.25, -3.0), 4.0, 2.5);
        let config = calculate_wall_alignment(&w, &w).unwrap();
        assert_relative_eq!(config.scale, 1.0);
        assert_eq!(config.rotation, Vec3D::ZERO);
        assert_relative_eq!(config.confidence, 1.0, epsilon = 1e-12);
        // Pivot at origin, wall center already in place.
        assert_eq!(config.position, Vec3D::ZERO);
    }

    #[test]
    fn source_center_lands_on_target_center() {
        let virtual_wall = wall("v", Vector3::z(), Point3::new(2.0, 1.0, 0.5), 2.0, 1.25);
        let real_wall = wall("r", Vector3::x(), Point3::new(-4.0, 1.5, 7.0), 4.0, 2.5);
        let config = calculate_wall_alignment(&virtual_wall, &real_wall).unwrap();

        assert_relative_eq!(config.scale, 2.0);
        assert_relative_eq!(config.rotation.y, FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(config.rotation.x, 0.0);
        assert_relative_eq!(config.rotation.z, 0.0);

        let moved = config.transform_point(virtual_wall.center());
        assert_point_eq(&moved, real_wall.center());

        let via_matrix = config.to_matrix().transform_point(virtual_wall.center());
        assert_point_eq(&via_matrix, real_wall.center());

        let rotated_normal = config.rotation_matrix() * virtual_wall.normal();
        assert_relative_eq!(rotated_normal.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn pivot_offset_is_scaled_and_rotated() {
        let source_wall = wall("v", -Vector3::z(), Point3::new(0.0, 1.0, -2.0), 3.0, 2.0);
        let source = ModelInfo::from_wall(source_wall).with_origin(Point3::new(1.0, 0.0, 0.0));
        let target_wall = wall("r", Vector3::z(), Point3::new(5.0, 1.0, 5.0), 3.0, 2.0);
        let target = ModelInfo::from_wall(target_wall);
        let config = calculate_auto_alignment(&source, &target).unwrap();

        assert_relative_eq!(config.rotation.y.abs(), PI, epsilon = 1e-12);
        // A model point relative to the pivot.
        let wall_center_rel = source.wall.center() - source.origin;
        let moved = config.transform_point(&Point3::from(wall_center_rel));
        assert_point_eq(&moved, target.wall.center());
    }

    #[test]
    fn antiparallel_vertical_normals_rotate_half_turn() {
        let (rotation, _) = rotation_between_normals(&Vector3::y(), &-Vector3::y());
        let turned = rotation * Vector3::y();
        assert_relative_eq!(turned.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn tilted_normals_use_shortest_arc() {
        let from = Vector3::y();
        let to = Vector3::new(0.0, 1.0, 1.0).normalize();
        let (rotation, euler) = rotation_between_normals(&from, &to);
        let turned = rotation * from;
        assert_relative_eq!(turned, to, epsilon = 1e-12);
        let rebuilt = Rotation3::from_euler_angles(euler.x, euler.y, euler.z) * from;
        assert_relative_eq!(rebuilt, to, epsilon = 1e-9);
    }

    #[test]
    fn tilt_only_difference_is_not_ignored() {
        let from = Vector3::z();
        let to = Vector3::new(0.0, 0.6, 0.8);
        let (rotation, euler) = rotation_between_normals(&from, &to);
        assert_relative_eq!(rotation * from, to, epsilon = 1e-12);
        assert!(euler != Vec3D::ZERO);

        let v = wall("v", from, Point3::new(0.0, 1.25, 0.0), 4.0, 2.5);
        let r = wall("r", to, Point3::new(2.0, 1.5, -1.0), 4.0, 2.5);
        let config = calculate_wall_alignment(&v, &r).unwrap();
        let turned = config.rotation_matrix() * v.normal();
        assert_relative_eq!(turned, to, epsilon = 1e-9);
        assert_relative_eq!(config.rotation.x.abs(), 0.6f64.atan2(0.8), epsilon = 1e-9);
        assert_point_eq(&config.transform_point(v.center()), r.center());
    }

    #[test]
    fn antiparallel_tilted_normals_flip_exactly() {
        let from = Vector3::new(0.0, 0.6, 0.8);
        let (rotation, _) = rotation_between_normals(&from, &-from);
        assert_relative_eq!(rotation * from, -from, epsilon = 1e-12);

        let (rotation, euler) = rotation_between_normals(&Vector3::x(), &-Vector3::x());
        assert_relative_eq!(rotation * Vector3::x(), -Vector3::x(), epsilon = 1e-12);
        assert_relative_eq!(euler.y.abs(), PI, epsilon = 1e-12);
    }

    #[test]
    fn repeated_calculation_is_bit_identical() {
        let v = wall("v", Vector3::new(0.3, 0.0, 0.9), Point3::new(0.3, 1.2, 4.4), 3.3, 2.4);
        let r = wall("r", Vector3::new(-0.7, 0.0, 0.1), Point3::new(-2.0, 1.3, 0.7), 3.5, 2.6);
        let a = calculate_wall_alignment(&v, &r).unwrap();
        let b = calculate_wall_alignment(&v, &r).unwrap();
        assert_eq!(a.scale.to_bits(), b.scale.to_bits());
        assert_eq!(a.position, b.position);
        assert_eq!(a.rotation, b.rotation);
        assert_eq!(a.confidence.to_bits(), b.confidence.to_bits());
    }

    #[test]
    fn extreme_scale_lowers_confidence() {
        let v = wall("v", Vector3::z(), Point3::origin(), 4.0, 2.5);
        let same = wall("r", Vector3::z(), Point3::origin(), 4.0, 2.5);
        let tiny = wall("t", Vector3::z(), Point3::origin(), 0.4, 0.25);
        let good = calculate_wall_alignment(&v, &same).unwrap();
        let bad = calculate_wall_alignment(&v, &tiny).unwrap();
        assert!(bad.confidence < good.confidence);
        assert!((0.0..=1.0).contains(&bad.confidence));
    }

    #[test]
    fn report_exposes_breakdown() {
        let v = wall("v", Vector3::z(), Point3::origin(), 2.0, 2.5);
        let r = wall("r", Vector3::z(), Point3::origin(), 2.1, 2.4);
        let report = AlignmentCalculator::default()
            .analyze(&ModelInfo::from_wall(v), &ModelInfo::from_wall(r))
            .unwrap();
        assert!(report.proportion >= 0.9);
        assert!(report.source_validation.valid);
        assert!(report.target_validation.valid);
        assert!(report.config.confidence > 0.9);
    }

    #[test]
    fn non_finite_origin_is_insufficient_data() {
        let v = wall("v", Vector3::z(), Point3::origin(), 2.0, 2.5);
        let source = ModelInfo::from_wall(v.clone()).with_origin(Point3::new(f64::NAN, 0.0, 0.0));
        let err = calculate_auto_alignment(&source, &ModelInfo::from_wall(v)).unwrap_err();
        assert!(matches!(err, Error::InsufficientData(_)));
    }

    #[test]
    fn scale_closeness_is_log_symmetric() {
        assert_relative_eq!(scale_closeness(1.0), 1.0);
        assert_relative_eq!(scale_closeness(2.0), 0.5);
        assert_relative_eq!(scale_closeness(0.5), 0.5);
        assert_relative_eq!(scale_closeness(8.0), 0.0);
        assert_relative_eq!(scale_closeness(0.0), 0.0);
    }

    #[test]
    fn config_serializes_camel_case() {
        let config = AlignmentConfig {
            scale: 1.0,
            position: Vec3D::ZERO,
            rotation: Vec3D::ZERO,
            confidence: 0.8,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"confidence\":0.8"));
        let back: AlignmentConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
