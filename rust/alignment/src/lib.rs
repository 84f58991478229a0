// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Wall-Anchor Alignment
//!
//! The wall alignment engine: everything needed to place an architectural
//! model onto a scanned room from one pair of matching walls.
//!
//! 1. [`critical_walls`] ranks the model's other walls as validation
//!    constraints relative to the user's primary wall.
//! 2. [`dimensions`] compares proportions, estimates scale and checks
//!    real-world plausibility.
//! 3. [`auto_align`] produces the scale/rotation/position transform and its
//!    confidence.
//! 4. [`validation`] turns a result into warnings and a quality level.
//!
//! All functions are pure and synchronous; walls are never mutated.
//!
//! ```rust,ignore
//! use wall_anchor_alignment::{calculate_wall_alignment, validate_alignment};
//!
//! let config = calculate_wall_alignment(&model_wall, &scanned_wall)?;
//! let verdict = validate_alignment(&config);
//! println!("{}", verdict.quality_level.description());
//! ```

pub mod auto_align;
pub mod critical_walls;
pub mod dimensions;
pub mod error;
pub mod validation;

pub use auto_align::{
    calculate_auto_alignment, calculate_wall_alignment, AlignmentCalculator, AlignmentConfig,
    AlignmentReport, ConfidenceWeights,
};
pub use critical_walls::{
    select_critical_walls, CriticalWallSelector, ScoreWeights, SelectorConfig, WallScore,
};
pub use dimensions::{
    check_proportion_compatibility, scale_from_dimensions, scale_from_models,
    validate_real_world_scale, ModelInfo, ScaleContext, ScaleEstimate, ScaleValidation,
    COMPATIBILITY_FLOOR,
};
pub use error::{Error, Result};
pub use validation::{validate_alignment, AlignmentValidation, QualityLevel};
