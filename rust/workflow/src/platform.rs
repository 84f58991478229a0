// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary to the native AR platform.
//!
//! Scene reconstruction, tracking and rendering live on the native side.
//! The workflow talks to it only through [`ArPlatform`], one request and one
//! response per call, so tests can swap in a fake with no native code.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wall_anchor_alignment::AlignmentConfig;
use wall_anchor_geometry::{Vec3D, Wall, WallRecord};

use crate::error::{PlatformError, WorkflowError};

/// Model facts the native scene knows and the walls do not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    /// Model pivot in model coordinates.
    pub origin: Vec3D,
    /// Enclosed volume in cubic model units, when the model is closed.
    #[serde(default)]
    pub volume: Option<f64>,
}

/// Position/rotation/scale sent to the renderer and persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub position: Vec3D,
    /// Euler angles in radians.
    pub rotation: Vec3D,
    pub scale: f64,
}

impl From<&AlignmentConfig> for Transformation {
    fn from(config: &AlignmentConfig) -> Self {
        Self {
            position: config.position,
            rotation: config.rotation,
            scale: config.scale,
        }
    }
}

/// Answer to a transform application. Either fully applied or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApplyOutcome {
    pub fn applied() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Capabilities the workflow needs from the native AR platform.
///
/// Implementations must not retry internally; the caller decides.
#[allow(async_fn_in_trait)]
pub trait ArPlatform {
    /// Pivot and volume of a loaded model.
    async fn model_metrics(&self, model_id: &str) -> Result<ModelMetrics, PlatformError>;

    /// Metadata of one wall of a loaded model.
    async fn wall_metadata(
        &self,
        model_id: &str,
        wall_id: &str,
    ) -> Result<WallRecord, PlatformError>;

    /// Walls detected so far by the live room scan.
    async fn scanned_walls(&self) -> Result<Vec<WallRecord>, PlatformError>;

    /// Applies a transform to the rendered model.
    async fn apply_transform(
        &self,
        model_id: &str,
        transform: &Transformation,
    ) -> Result<ApplyOutcome, PlatformError>;
}

/// Awaits a native call, failing with [`WorkflowError::Timeout`] after
/// `timeout`.
pub async fn with_timeout<T, F>(
    operation: &'static str,
    timeout: Duration,
    call: F,
) -> Result<T, WorkflowError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result.map_err(|e| {
            tracing::warn!(operation, error = %e, "Native call failed");
            WorkflowError::Platform(e)
        }),
        Err(_) => {
            tracing::warn!(
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "Native call timed out"
            );
            Err(WorkflowError::Timeout {
                operation,
                timeout_ms: timeout.as_millis(),
            })
        }
    }
}

/// Fetches and validates one model wall.
pub async fn fetch_model_wall<P: ArPlatform>(
    platform: &P,
    model_id: &str,
    wall_id: &str,
    timeout: Duration,
) -> Result<Wall, WorkflowError> {
    let record =
        with_timeout("wall_metadata", timeout, platform.wall_metadata(model_id, wall_id)).await?;
    Ok(Wall::try_from(record)?)
}

/// Fetches the live scan's walls, dropping records that fail validation.
pub async fn fetch_scanned_walls<P: ArPlatform>(
    platform: &P,
    timeout: Duration,
) -> Result<Vec<Wall>, WorkflowError> {
    let records = with_timeout("scanned_walls", timeout, platform.scanned_walls()).await?;
    let total = records.len();
    let walls: Vec<Wall> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Wall::try_from(record) {
                Ok(wall) => Some(wall),
                Err(e) => {
                    tracing::warn!(wall_id = %id, error = %e, "Dropping unusable scanned wall");
                    None
                }
            }
        })
        .collect();
    tracing::debug!(accepted = walls.len(), total, "Fetched scanned walls");
    Ok(walls)
}
