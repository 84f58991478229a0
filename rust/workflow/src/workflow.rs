// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall anchoring session state machine.
//!
//! ```text
//! model_preview --set_virtual_wall--> wall_scanning --set_real_wall--> alignment
//!       ^                                                      |   ^
//!       | reset (from anywhere)                apply_alignment |   | recalculate
//!       |                                                      v   |
//!       +--------------------------------------------------- complete
//! ```
//!
//! The workflow owns the session artifacts and only moves forward, apart from
//! `reset` and `recalculate`. It holds no transform math; calculation is
//! delegated to [`AlignmentCalculator`] and rendering to the [`ArPlatform`].
//! Every applied alignment is remembered in the [`AlignmentStore`].

use std::fmt;

use serde::{Deserialize, Serialize};
use wall_anchor_alignment::{
    validate_alignment, AlignmentCalculator, AlignmentConfig, AlignmentValidation,
    CriticalWallSelector, ModelInfo, SelectorConfig,
};
use wall_anchor_geometry::Wall;

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::platform::{with_timeout, ArPlatform, Transformation};
use crate::store::{AlignmentKind, AlignmentStore};

/// Stage of a wall anchoring session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    ModelPreview,
    WallScanning,
    Alignment,
    Complete,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::ModelPreview => "model_preview",
            WorkflowStep::WallScanning => "wall_scanning",
            WorkflowStep::Alignment => "alignment",
            WorkflowStep::Complete => "complete",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly calculated alignment with its verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutcome {
    pub config: AlignmentConfig,
    pub validation: AlignmentValidation,
}

/// One alignment session.
///
/// The model path doubles as the model id on the native side.
#[derive(Debug, Clone)]
pub struct WallAnchorWorkflow {
    model_path: Option<String>,
    virtual_wall: Option<Wall>,
    real_wall: Option<Wall>,
    alignment_result: Option<AlignmentConfig>,
    current_step: WorkflowStep,
    config: WorkflowConfig,
    calculator: AlignmentCalculator,
    store: AlignmentStore,
}

impl WallAnchorWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            model_path: None,
            virtual_wall: None,
            real_wall: None,
            alignment_result: None,
            current_step: WorkflowStep::ModelPreview,
            store: AlignmentStore::from_config(&config),
            config,
            calculator: AlignmentCalculator::default(),
        }
    }

    /// Replaces the default confidence weighting.
    pub fn with_calculator(mut self, calculator: AlignmentCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Persists applied alignments somewhere other than `storage_dir`.
    pub fn with_store(mut self, store: AlignmentStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &AlignmentStore {
        &self.store
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub fn model_path(&self) -> Option<&str> {
        self.model_path.as_deref()
    }

    pub fn virtual_wall(&self) -> Option<&Wall> {
        self.virtual_wall.as_ref()
    }

    pub fn real_wall(&self) -> Option<&Wall> {
        self.real_wall.as_ref()
    }

    pub fn alignment_result(&self) -> Option<&AlignmentConfig> {
        self.alignment_result.as_ref()
    }

    pub fn current_step(&self) -> WorkflowStep {
        self.current_step
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == WorkflowStep::Complete
    }

    /// Begins a session for the model at `path`, discarding any previous one.
    pub fn start_workflow(&mut self, path: impl Into<String>) -> Result<(), WorkflowError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(WorkflowError::EmptyModelPath);
        }
        self.clear_artifacts();
        tracing::info!(model = %path, "Started wall anchor workflow");
        self.model_path = Some(path);
        self.current_step = WorkflowStep::ModelPreview;
        Ok(())
    }

    /// Records the model wall picked in the preview.
    pub fn set_virtual_wall(&mut self, wall: Wall) -> Result<(), WorkflowError> {
        self.require_started()?;
        self.require_step(WorkflowStep::ModelPreview, "set virtual wall")?;
        tracing::info!(wall_id = %wall.id(), "Virtual wall selected");
        self.virtual_wall = Some(wall);
        self.advance(WorkflowStep::WallScanning);
        Ok(())
    }

    /// Records the scanned wall matching the virtual wall.
    pub fn set_real_wall(&mut self, wall: Wall) -> Result<(), WorkflowError> {
        self.require_started()?;
        self.require_step(WorkflowStep::WallScanning, "set real wall")?;
        if self.virtual_wall.is_none() {
            return Err(WorkflowError::MissingPrerequisite("virtual wall"));
        }
        tracing::info!(wall_id = %wall.id(), "Real wall selected");
        self.real_wall = Some(wall);
        self.advance(WorkflowStep::Alignment);
        Ok(())
    }

    /// Computes the alignment of the selected walls.
    ///
    /// Queries the native platform for the model pivot and volume, then
    /// stores a new result. The step stays at `alignment`.
    pub async fn calculate_alignment<P: ArPlatform>(
        &mut self,
        platform: &P,
    ) -> Result<AlignmentOutcome, WorkflowError> {
        let model_id = self.require_started()?.to_string();
        self.require_step(WorkflowStep::Alignment, "calculate alignment")?;
        let virtual_wall = self
            .virtual_wall
            .clone()
            .ok_or(WorkflowError::MissingPrerequisite("virtual wall"))?;
        let real_wall = self
            .real_wall
            .clone()
            .ok_or(WorkflowError::MissingPrerequisite("real wall"))?;

        let metrics = with_timeout(
            "model_metrics",
            self.config.native_timeout,
            platform.model_metrics(&model_id),
        )
        .await?;

        let source = ModelInfo {
            wall: virtual_wall,
            origin: metrics.origin.to_point(),
            volume: metrics.volume,
        };
        let target = ModelInfo::from_wall(real_wall);

        let config = self.calculator.calculate(&source, &target)?;
        let validation = validate_alignment(&config);

        tracing::info!(
            model = %model_id,
            scale = config.scale,
            confidence = config.confidence,
            quality = validation.quality_level.as_str(),
            "Alignment calculated"
        );
        for warning in &validation.warnings {
            tracing::warn!(model = %model_id, %warning, "Alignment warning");
        }

        self.alignment_result = Some(config);
        Ok(AlignmentOutcome { config, validation })
    }

    /// Sends the current result to the renderer, stores it as the latest
    /// automatic alignment and completes the session.
    ///
    /// Fails without a calculated result, for a low-confidence result unless
    /// `allow_low_confidence` is configured, and when the platform rejects
    /// the transform. A failed save is logged and does not fail the apply.
    pub async fn apply_alignment<P: ArPlatform>(
        &mut self,
        platform: &P,
    ) -> Result<(), WorkflowError> {
        let model_id = self.require_started()?.to_string();
        self.require_step(WorkflowStep::Alignment, "apply alignment")?;
        let config = self
            .alignment_result
            .ok_or(WorkflowError::MissingPrerequisite("alignment result"))?;

        let validation = validate_alignment(&config);
        if !validation.is_valid && !self.config.allow_low_confidence {
            return Err(WorkflowError::LowConfidence {
                confidence: config.confidence,
                warnings: validation.warnings,
            });
        }

        let transform = Transformation::from(&config);
        let outcome = with_timeout(
            "apply_transform",
            self.config.native_timeout,
            platform.apply_transform(&model_id, &transform),
        )
        .await?;

        if !outcome.success {
            let message = outcome
                .message
                .unwrap_or_else(|| "no reason given".to_string());
            tracing::warn!(model = %model_id, %message, "Transform rejected");
            return Err(WorkflowError::TransformRejected(message));
        }

        if let Err(e) = self
            .store
            .save(AlignmentKind::Automatic, transform, Some(model_id.as_str()))
            .await
        {
            tracing::warn!(model = %model_id, error = %e, "Failed to store applied alignment");
        }

        self.advance(WorkflowStep::Complete);
        Ok(())
    }

    /// Goes back from `complete` to `alignment`, keeping both walls.
    ///
    /// The previous result is dropped so it has to be calculated again
    /// before it can be applied.
    pub fn recalculate(&mut self) -> Result<(), WorkflowError> {
        self.require_started()?;
        self.require_step(WorkflowStep::Complete, "recalculate")?;
        self.alignment_result = None;
        self.advance(WorkflowStep::Alignment);
        Ok(())
    }

    /// Returns to the initial state.
    pub fn reset(&mut self) {
        self.clear_artifacts();
        self.model_path = None;
        self.current_step = WorkflowStep::ModelPreview;
        tracing::info!("Workflow reset");
    }

    /// Verdict on the current result, if any.
    pub fn validation(&self) -> Option<AlignmentValidation> {
        self.alignment_result.as_ref().map(validate_alignment)
    }

    pub fn quality_description(&self) -> Option<&'static str> {
        self.validation().map(|v| v.quality_level.description())
    }

    pub fn quality_color(&self) -> Option<&'static str> {
        self.validation().map(|v| v.quality_level.color())
    }

    /// Indices into `model_walls` of the walls worth scanning to validate
    /// the selected virtual wall, starting with the virtual wall itself.
    pub fn select_validation_walls(
        &self,
        model_walls: &[Wall],
    ) -> Result<Vec<usize>, WorkflowError> {
        let primary = self
            .virtual_wall
            .as_ref()
            .ok_or(WorkflowError::MissingPrerequisite("virtual wall"))?;
        let index = model_walls
            .iter()
            .position(|w| w.id() == primary.id())
            .ok_or_else(|| WorkflowError::UnknownWall(primary.id().to_string()))?;

        let selector = CriticalWallSelector::new(SelectorConfig {
            max_critical_walls: self.config.max_critical_walls,
            ..SelectorConfig::default()
        });
        Ok(selector.select(index, model_walls))
    }

    fn require_started(&self) -> Result<&str, WorkflowError> {
        self.model_path.as_deref().ok_or(WorkflowError::NotStarted)
    }

    fn require_step(
        &self,
        expected: WorkflowStep,
        action: &'static str,
    ) -> Result<(), WorkflowError> {
        if self.current_step == expected {
            Ok(())
        } else {
            Err(WorkflowError::InvalidTransition {
                action,
                step: self.current_step,
            })
        }
    }

    fn advance(&mut self, next: WorkflowStep) {
        tracing::info!(from = %self.current_step, to = %next, "Workflow step");
        self.current_step = next;
    }

    fn clear_artifacts(&mut self) {
        self.virtual_wall = None;
        self.real_wall = None;
        self.alignment_result = None;
    }
}

impl Default for WallAnchorWorkflow {
    fn default() -> Self {
        Self::new(WorkflowConfig::default())
    }
}
