// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Workflow configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use wall_anchor_alignment::critical_walls::DEFAULT_MAX_CRITICAL_WALLS;

/// Workflow configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Directory for persisted alignments.
    pub storage_dir: PathBuf,
    /// Upper bound for a single native platform call.
    pub native_timeout: Duration,
    /// Walls returned by critical wall selection, primary included.
    pub max_critical_walls: usize,
    /// Let low-confidence alignments be applied anyway.
    pub allow_low_confidence: bool,
}

impl WorkflowConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            storage_dir: std::env::var("WALL_ANCHOR_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    std::env::current_dir()
                        .map(|dir| dir.join(".wall-anchor"))
                        .unwrap_or_else(|_| PathBuf::from("./.wall-anchor"))
                }),
            native_timeout: Duration::from_secs(
                std::env::var("WALL_ANCHOR_NATIVE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "10".into())
                    .parse()
                    .unwrap_or(10),
            ),
            max_critical_walls: std::env::var("WALL_ANCHOR_MAX_CRITICAL_WALLS")
                .unwrap_or_else(|_| DEFAULT_MAX_CRITICAL_WALLS.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_CRITICAL_WALLS),
            allow_low_confidence: std::env::var("WALL_ANCHOR_ALLOW_LOW_CONFIDENCE")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
