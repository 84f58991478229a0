// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for scale analysis and alignment.

/// Result type alias for alignment operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing or aligning walls.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A dimension set contains a zero, negative or non-finite side.
    #[error("invalid dimensions for {context}: {width} x {height}")]
    InvalidDimensions {
        context: &'static str,
        width: f64,
        height: f64,
    },

    /// Not enough usable data on one side to compute an alignment.
    #[error("cannot compute alignment: {0}")]
    InsufficientData(String),

    /// An intermediate value became NaN or infinite.
    #[error("non-finite {0} in alignment result")]
    NonFinite(&'static str),

    #[error("geometry error: {0}")]
    Geometry(#[from] wall_anchor_geometry::Error),
}
