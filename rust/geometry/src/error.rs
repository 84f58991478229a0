// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for wall construction and scan import.

use thiserror::Error;

/// Result type for geometry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or importing wall records
#[derive(Error, Debug)]
pub enum Error {
    /// Normal vector is (near) zero length and cannot be normalized.
    #[error("wall {id}: degenerate normal (length {length:e})")]
    DegenerateNormal { id: String, length: f64 },

    /// Width or height is zero, negative or not finite.
    #[error("wall {id}: invalid dimensions {width} x {height}")]
    InvalidDimensions { id: String, width: f64, height: f64 },

    /// A coordinate contains NaN or infinity.
    #[error("wall {id}: non-finite {field}")]
    NonFinite { id: String, field: &'static str },

    /// Flattened transform does not have 16 entries.
    #[error("wall {id}: transform has {len} values, expected 16")]
    InvalidTransform { id: String, len: usize },

    #[error("Scan parse error: {0}")]
    ScanParse(#[from] serde_json::Error),
}
