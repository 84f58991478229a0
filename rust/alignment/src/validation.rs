// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Alignment validation and quality classification.

use serde::{Deserialize, Serialize};

use crate::auto_align::AlignmentConfig;

/// Below this confidence an alignment is poor and blocks by default.
pub const MIN_CONFIDENCE: f64 = 0.4;
/// Below this confidence an alignment is only acceptable.
pub const MODERATE_CONFIDENCE: f64 = 0.6;
/// At or above this confidence an alignment can be excellent.
pub const HIGH_CONFIDENCE: f64 = 0.7;

/// Scales outside this range downgrade an excellent result.
pub const UNUSUAL_SCALE_RANGE: (f64, f64) = (0.5, 2.0);
/// Scales outside this range force a poor result.
pub const EXTREME_SCALE_RANGE: (f64, f64) = (0.3, 3.0);

/// User-facing quality of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl QualityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "excellent",
            QualityLevel::Good => "good",
            QualityLevel::Acceptable => "acceptable",
            QualityLevel::Poor => "poor",
        }
    }

    /// Sentence shown next to the result.
    pub fn description(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => {
                "Excellent alignment. The model matches the scanned wall closely."
            }
            QualityLevel::Good => {
                "Good alignment. Minor differences between model and room are expected."
            }
            QualityLevel::Acceptable => {
                "Acceptable alignment. Check the overlay and adjust manually if needed."
            }
            QualityLevel::Poor => "Poor alignment. Verify the selected walls or rescan the room.",
        }
    }

    /// Hex color used by the UI badge.
    pub fn color(&self) -> &'static str {
        match self {
            QualityLevel::Excellent => "#4CAF50",
            QualityLevel::Good => "#8BC34A",
            QualityLevel::Acceptable => "#FFC107",
            QualityLevel::Poor => "#F44336",
        }
    }
}

/// Verdict on one [`AlignmentConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentValidation {
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub quality_level: QualityLevel,
}

/// Classifies an alignment result.
///
/// Total over every confidence and scale: NaN confidence counts as zero and
/// a non-positive or NaN scale counts as extreme. `is_valid` holds when there
/// are no warnings or confidence is at least [`MIN_CONFIDENCE`].
pub fn validate_alignment(config: &AlignmentConfig) -> AlignmentValidation {
    let confidence = if config.confidence.is_nan() {
        0.0
    } else {
        config.confidence
    };
    let scale = config.scale;
    let mut warnings = Vec::new();

    let mut quality = if confidence < MIN_CONFIDENCE {
        warnings.push(format!(
            "Alignment confidence very low ({:.0}%)",
            confidence * 100.0
        ));
        QualityLevel::Poor
    } else if confidence < MODERATE_CONFIDENCE {
        warnings.push(format!(
            "Moderate confidence ({:.0}%): consider manual adjustment",
            confidence * 100.0
        ));
        QualityLevel::Acceptable
    } else if confidence < HIGH_CONFIDENCE {
        QualityLevel::Good
    } else {
        QualityLevel::Excellent
    };

    let within = |(lo, hi): (f64, f64)| scale >= lo && scale <= hi;
    if !within(EXTREME_SCALE_RANGE) {
        warnings.push(format!(
            "Extreme scale factor {:.2}: verify wall selection",
            scale
        ));
        quality = QualityLevel::Poor;
    } else if !within(UNUSUAL_SCALE_RANGE) {
        warnings.push(format!(
            "Unusual scale factor {:.2}: model units may differ from the room",
            scale
        ));
        if quality == QualityLevel::Excellent {
            quality = QualityLevel::Good;
        }
    }

    AlignmentValidation {
        is_valid: warnings.is_empty() || confidence >= MIN_CONFIDENCE,
        warnings,
        quality_level: quality,
    }
}
