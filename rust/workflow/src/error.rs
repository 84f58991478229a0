// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the workflow, the native boundary and persistence.

use thiserror::Error;

use crate::workflow::WorkflowStep;

/// Failure reported by the native AR platform.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlatformError {
    /// Device, session or tracking not available.
    #[error("AR platform unavailable: {0}")]
    Unavailable(String),

    /// The model id is unknown to the native scene.
    #[error("model not loaded: {0}")]
    ModelNotFound(String),

    /// The wall id is unknown for the given model.
    #[error("wall {wall_id} not found in model {model_id}")]
    WallNotFound { model_id: String, wall_id: String },

    #[error("native call failed: {0}")]
    Failed(String),
}

/// Workflow errors.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow not started: no model loaded")]
    NotStarted,

    #[error("model path must not be empty")]
    EmptyModelPath,

    #[error("cannot {action} during step {step}")]
    InvalidTransition {
        action: &'static str,
        step: WorkflowStep,
    },

    #[error("missing {0}")]
    MissingPrerequisite(&'static str),

    #[error("wall {0} is not part of the given model walls")]
    UnknownWall(String),

    #[error("alignment confidence too low ({confidence:.2}): {}", .warnings.join("; "))]
    LowConfidence {
        confidence: f64,
        warnings: Vec<String>,
    },

    #[error("transform rejected by AR platform: {0}")]
    TransformRejected(String),

    #[error("native call {operation} timed out after {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u128,
    },

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("alignment error: {0}")]
    Alignment(#[from] wall_anchor_alignment::Error),

    #[error("geometry error: {0}")]
    Geometry(#[from] wall_anchor_geometry::Error),
}

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("alignment store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("alignment store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
