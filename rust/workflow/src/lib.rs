// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Wall-Anchor Workflow
//!
//! Session layer of wall anchoring: the [`WallAnchorWorkflow`] state machine
//! that walks a user from model preview through wall scanning to an applied
//! alignment, the typed [`ArPlatform`] boundary to the native AR runtime, and
//! the [`AlignmentStore`] that remembers the last alignments.
//!
//! A workflow is an ordinary value. Create one per session and pass it where
//! it is needed; nothing here is global.

pub mod config;
pub mod error;
pub mod platform;
pub mod store;
pub mod workflow;

pub use config::WorkflowConfig;
pub use error::{PlatformError, StoreError, WorkflowError};
pub use platform::{
    fetch_model_wall, fetch_scanned_walls, with_timeout, ApplyOutcome, ArPlatform, ModelMetrics,
    Transformation,
};
pub use store::{AlignmentKind, AlignmentStore, StoredAlignment};
pub use workflow::{AlignmentOutcome, WallAnchorWorkflow, WorkflowStep};
