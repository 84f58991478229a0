// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dimension and scale analysis.
//!
//! Compares the proportions of a virtual wall with a scanned one, estimates
//! the uniform scale between them and checks that dimensions are plausible
//! for a real building.

use serde::Serialize;
use wall_anchor_geometry::{Point3, Wall, WallDimensions};

use crate::error::{Error, Result};

/// Aspect-ratio difference at which compatibility reaches zero.
pub const PROPORTION_TOLERANCE: f64 = 1.0;

/// Compatibility below this should be reported to the user.
pub const COMPATIBILITY_FLOOR: f64 = 0.6;

/// Relative disagreement between two scale estimates that is still treated
/// as agreement.
pub const SCALE_AGREEMENT_TOLERANCE: f64 = 0.05;

/// Proportion compatibility of two dimension sets in [0, 1].
///
/// `1 − min(1, |aspect(a) − aspect(b)| / PROPORTION_TOLERANCE)`. Identical
/// proportions score 1.0. Invalid dimensions score 0.0.
pub fn check_proportion_compatibility(a: &WallDimensions, b: &WallDimensions) -> f64 {
    if !a.is_valid() || !b.is_valid() {
        tracing::warn!(?a, ?b, "Proportion check on invalid dimensions");
        return 0.0;
    }
    let delta = (a.aspect_ratio() - b.aspect_ratio()).abs();
    1.0 - (delta / PROPORTION_TOLERANCE).min(1.0)
}

/// What a dimension set is supposed to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleContext {
    Wall,
    Room,
    Building,
}

/// Plausible real-world extents for a [`ScaleContext`], in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlausibleRange {
    pub min_width: f64,
    pub max_width: f64,
    pub min_height: f64,
    pub max_height: f64,
}

impl PlausibleRange {
    fn contains(&self, d: &WallDimensions) -> bool {
        d.width >= self.min_width
            && d.width <= self.max_width
            && d.height >= self.min_height
            && d.height <= self.max_height
    }
}

impl ScaleContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleContext::Wall => "Wall",
            ScaleContext::Room => "Room",
            ScaleContext::Building => "Building",
        }
    }

    pub fn plausible_range(&self) -> PlausibleRange {
        match self {
            ScaleContext::Wall => PlausibleRange {
                min_width: 0.3,
                max_width: 30.0,
                min_height: 0.5,
                max_height: 6.0,
            },
            ScaleContext::Room => PlausibleRange {
                min_width: 1.0,
                max_width: 50.0,
                min_height: 2.0,
                max_height: 10.0,
            },
            ScaleContext::Building => PlausibleRange {
                min_width: 2.0,
                max_width: 500.0,
                min_height: 2.0,
                max_height: 1000.0,
            },
        }
    }
}

/// Outcome of a real-world plausibility check.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScaleValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Common unit mistakes, as (label, factor converting to meters).
const UNIT_GUESSES: [(&str, f64); 3] = [
    ("millimeters", 0.001),
    ("centimeters", 0.01),
    ("feet", 0.3048),
];

/// Flags dimensions that are implausible for `context`.
///
/// In-range input yields `valid = true` with no warnings. Never fails;
/// unusable input is reported as invalid with a warning.
pub fn validate_real_world_scale(
    dimensions: &WallDimensions,
    context: ScaleContext,
) -> ScaleValidation {
    let mut result = ScaleValidation {
        valid: true,
        ..ScaleValidation::default()
    };

    if !dimensions.is_valid() {
        result.valid = false;
        result.warnings.push(format!(
            "{} dimensions must be positive (got {} x {})",
            context.as_str(),
            dimensions.width,
            dimensions.height
        ));
        return result;
    }

    let range = context.plausible_range();
    let name = context.as_str();

    if dimensions.height > range.max_height {
        result.warnings.push(format!(
            "{} height {:.2} m exceeds plausible maximum {} m",
            name, dimensions.height, range.max_height
        ));
    } else if dimensions.height < range.min_height {
        result.warnings.push(format!(
            "{} height {:.2} m below plausible minimum {} m",
            name, dimensions.height, range.min_height
        ));
    }
    if dimensions.width > range.max_width {
        result.warnings.push(format!(
            "{} width {:.2} m exceeds plausible maximum {} m",
            name, dimensions.width, range.max_width
        ));
    } else if dimensions.width < range.min_width {
        result.warnings.push(format!(
            "{} width {:.2} m below plausible minimum {} m",
            name, dimensions.width, range.min_width
        ));
    }

    if !result.warnings.is_empty() {
        result.valid = false;
        for (unit, factor) in UNIT_GUESSES {
            let converted =
                WallDimensions::new(dimensions.width * factor, dimensions.height * factor);
            if range.contains(&converted) {
                result.suggestions.push(format!(
                    "Dimensions look like {}; scale by {} to get meters",
                    unit, factor
                ));
            }
        }
        tracing::debug!(
            context = name,
            warnings = result.warnings.len(),
            "Implausible real-world scale"
        );
    }

    result
}

/// Everything the alignment calculator knows about one side of an alignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    /// The wall used as the anchor on this side.
    pub wall: Wall,
    /// Reference point (pivot) of the model in its own coordinates.
    pub origin: Point3<f64>,
    /// Enclosed volume in cubic meters, when known.
    pub volume: Option<f64>,
}

impl ModelInfo {
    /// A bare wall whose model pivot is the local origin.
    pub fn from_wall(wall: Wall) -> Self {
        Self {
            wall,
            origin: Point3::origin(),
            volume: None,
        }
    }

    pub fn with_origin(mut self, origin: Point3<f64>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn dimensions(&self) -> WallDimensions {
        self.wall.dimensions()
    }

    /// Volume if present, positive and finite.
    fn usable_volume(&self) -> Option<f64> {
        match self.volume {
            Some(v) if v.is_finite() && v > 0.0 => Some(v),
            Some(v) => {
                tracing::warn!(
                    wall_id = %self.wall.id(),
                    volume = v,
                    "Ignoring unusable model volume"
                );
                None
            }
            None => None,
        }
    }
}

/// A proposed uniform scale with the estimates it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleEstimate {
    /// Final scale factor (target / source).
    pub scale: f64,
    /// Ratio along the source wall's longer side.
    pub dominant: f64,
    /// Ratio along the source wall's shorter side.
    pub secondary: f64,
    /// How well the individual estimates agree, in [0, 1].
    pub agreement: f64,
}

fn relative_difference(a: f64, b: f64) -> f64 {
    (a - b).abs() / a.abs().max(b.abs())
}

fn require_valid(d: &WallDimensions, context: &'static str) -> Result<()> {
    if d.is_valid() {
        Ok(())
    } else {
        tracing::warn!(context, width = d.width, height = d.height, "Rejected invalid dimensions");
        Err(Error::InvalidDimensions {
            context,
            width: d.width,
            height: d.height,
        })
    }
}

/// Scale that maps `source` onto `target` from their side lengths.
///
/// The ratio along the source's longer side leads. When the shorter side
/// disagrees by more than [`SCALE_AGREEMENT_TOLERANCE`], both ratios are
/// blended, weighted by side length.
pub fn scale_from_dimensions(
    source: &WallDimensions,
    target: &WallDimensions,
) -> Result<ScaleEstimate> {
    require_valid(source, "source")?;
    require_valid(target, "target")?;

    let (dominant, secondary, w_dom, w_sec) = if source.width >= source.height {
        (target.width / source.width, target.height / source.height, source.width, source.height)
    } else {
        (target.height / source.height, target.width / source.width, source.height, source.width)
    };

    let diff = relative_difference(dominant, secondary);
    let scale = if diff <= SCALE_AGREEMENT_TOLERANCE {
        dominant
    } else {
        (dominant * w_dom + secondary * w_sec) / (w_dom + w_sec)
    };

    Ok(ScaleEstimate {
        scale,
        dominant,
        secondary,
        agreement: 1.0 - diff.min(1.0),
    })
}

/// Scale between two models from wall dimensions and, when both sides
/// report one, volume.
///
/// The volume estimate is `cbrt(V_target / V_source)`; if it disagrees with
/// the wall estimate the two are averaged.
pub fn scale_from_models(source: &ModelInfo, target: &ModelInfo) -> Result<ScaleEstimate> {
    let mut estimate = scale_from_dimensions(&source.dimensions(), &target.dimensions())?;

    if let (Some(vs), Some(vt)) = (source.usable_volume(), target.usable_volume()) {
        let volume_scale = (vt / vs).cbrt();
        let diff = relative_difference(estimate.scale, volume_scale);
        if diff > SCALE_AGREEMENT_TOLERANCE {
            tracing::debug!(
                wall_scale = estimate.scale,
                volume_scale,
                "Wall and volume scale disagree, averaging"
            );
            estimate.scale = (estimate.scale + volume_scale) / 2.0;
            estimate.agreement = estimate.agreement.min(1.0 - diff.min(1.0));
        }
    }

    Ok(estimate)
}
