// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Critical wall selection.
//!
//! Given the wall the user picked first (the primary wall) and the rest of
//! the model's walls, ranks the others by how useful they are as secondary
//! validation constraints:
//!
//! - **perpendicularity**: `1 − |nᵢ·n_primary|`; walls at a right angle to the
//!   primary constrain an independent axis, parallel walls are redundant.
//! - **area**: `areaᵢ / max_area`; large walls are detected more reliably.
//! - **adjacency**: 1.0 when a corner of the wall touches a corner of the
//!   primary wall.
//!
//! The weighted total decides the ranking.

use serde::Serialize;
use wall_anchor_geometry::{perpendicularity, Wall};

/// Default number of walls returned by a selection, primary included.
pub const DEFAULT_MAX_CRITICAL_WALLS: usize = 3;

/// Corners closer than this (meters) count as shared.
pub const ADJACENCY_TOLERANCE: f64 = 0.01;

/// Relative weight of each sub-score in the total.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub perpendicularity: f64,
    pub area: f64,
    pub adjacency: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            perpendicularity: 0.5,
            area: 0.3,
            adjacency: 0.2,
        }
    }
}

/// Selector parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectorConfig {
    /// Walls to return including the primary. Values below 1 act as 1.
    pub max_critical_walls: usize,
    /// Corner distance (meters) under which two walls are adjacent.
    pub adjacency_tolerance: f64,
    pub weights: ScoreWeights,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            max_critical_walls: DEFAULT_MAX_CRITICAL_WALLS,
            adjacency_tolerance: ADJACENCY_TOLERANCE,
            weights: ScoreWeights::default(),
        }
    }
}

/// Per-wall score breakdown relative to the primary wall.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WallScore {
    /// Index of the wall in the input slice.
    pub index: usize,
    pub perpendicularity: f64,
    pub area: f64,
    pub adjacency: f64,
    pub total: f64,
}

/// Ranks model walls against a primary wall.
#[derive(Debug, Clone, Default)]
pub struct CriticalWallSelector {
    config: SelectorConfig,
}

impl CriticalWallSelector {
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Scores every wall except the primary, in input order.
    ///
    /// Returns an empty list when `walls` is empty or `primary_index` is out
    /// of range.
    pub fn score_walls(&self, primary_index: usize, walls: &[Wall]) -> Vec<WallScore> {
        let Some(primary) = walls.get(primary_index) else {
            tracing::warn!(
                primary_index,
                wall_count = walls.len(),
                "Primary wall index out of range, nothing to score"
            );
            return Vec::new();
        };

        let max_area = walls.iter().map(Wall::area).fold(0.0_f64, f64::max);
        let weights = &self.config.weights;

        walls
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != primary_index)
            .map(|(index, wall)| {
                let perp = perpendicularity(wall, primary);
                let area = if max_area > 0.0 {
                    (wall.area() / max_area).min(1.0)
                } else {
                    0.0
                };
                let adjacency = if wall.shares_vertex_with(primary, self.config.adjacency_tolerance)
                {
                    1.0
                } else {
                    0.0
                };
                WallScore {
                    index,
                    perpendicularity: perp,
                    area,
                    adjacency,
                    total: weights.perpendicularity * perp
                        + weights.area * area
                        + weights.adjacency * adjacency,
                }
            })
            .collect()
    }

    /// Picks the primary wall plus the best-scoring other walls.
    ///
    /// The result always starts with `primary_index` and holds
    /// `min(max_critical_walls, walls.len())` indices. Equal totals keep
    /// their input order.
    pub fn select(&self, primary_index: usize, walls: &[Wall]) -> Vec<usize> {
        if primary_index >= walls.len() {
            tracing::warn!(
                primary_index,
                wall_count = walls.len(),
                "Cannot select critical walls: invalid primary index"
            );
            return Vec::new();
        }

        let mut scores = self.score_walls(primary_index, walls);
        scores.sort_by(|a, b| b.total.total_cmp(&a.total));

        let keep = self.config.max_critical_walls.max(1) - 1;
        let mut selected = Vec::with_capacity(keep + 1);
        selected.push(primary_index);
        selected.extend(scores.iter().take(keep).map(|s| s.index));

        tracing::debug!(primary_index, ?selected, "Selected critical walls");
        selected
    }
}

/// Selects up to `max_count` walls starting with `primary_index`, using the
/// default weights and adjacency tolerance.
pub fn select_critical_walls(primary_index: usize, walls: &[Wall], max_count: usize) -> Vec<usize> {
    CriticalWallSelector::new(SelectorConfig {
        max_critical_walls: max_count,
        ..SelectorConfig::default()
    })
    .select(primary_index, walls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wall_anchor_geometry::{Point3, Vector3, WallDimensions};

    fn wall(id: &str, normal: Vector3<f64>, width: f64, height: f64) -> Wall {
        Wall::new(id, normal, Point3::origin(), WallDimensions::new(width, height)).unwrap()
    }

    #[test]
    fn perpendicular_wall_beats_larger_parallel_wall() {
        let walls = vec![
            wall("primary", Vector3::z(), 3.0, 2.0),
            wall("perp", Vector3::x(), 2.0, 2.0),
            wall("parallel", Vector3::z(), 4.0, 2.0),
        ];
        let selected = select_critical_walls(0, &walls, 3);
        assert_eq!(selected, vec![0, 1, 2]);

        let scores = CriticalWallSelector::default().score_walls(0, &walls);
        assert_eq!(scores.len(), 2);
        assert_relative_eq!(scores[0].perpendicularity, 1.0);
        assert_relative_eq!(scores[0].area, 0.5);
        assert_relative_eq!(scores[0].total, 0.65);
        assert_relative_eq!(scores[1].perpendicularity, 0.0);
        assert_relative_eq!(scores[1].area, 1.0);
        assert_relative_eq!(scores[1].total, 0.3);
    }

    #[test]
    fn result_starts_with_primary_and_is_bounded() {
        let walls: Vec<Wall> = (0..6)
            .map(|i| {
                let angle = i as f64 * 0.4;
                let normal = Vector3::new(angle.sin(), 0.0, angle.cos());
                wall(&format!("w{i}"), normal, 2.0 + i as f64, 2.5)
            })
            .collect();

        for primary in 0..walls.len() {
            for max in 1..=8 {
                let selected = select_critical_walls(primary, &walls, max);
                assert_eq!(selected[0], primary);
                assert_eq!(selected.len(), max.min(walls.len()));
            }
        }
    }

    #[test]
    fn zero_max_count_still_returns_primary() {
        let walls = vec![
            wall("a", Vector3::z(), 2.0, 2.0),
            wall("b", Vector3::x(), 2.0, 2.0),
        ];
        assert_eq!(select_critical_walls(1, &walls, 0), vec![1]);
    }

    #[test]
    fn invalid_input_yields_empty_selection() {
        let walls = vec![wall("a", Vector3::z(), 2.0, 2.0)];
        assert!(select_critical_walls(0, &[], 3).is_empty());
        assert!(select_critical_walls(1, &walls, 3).is_empty());
        assert!(CriticalWallSelector::default().score_walls(5, &walls).is_empty());
    }

    #[test]
    fn adjacency_breaks_otherwise_equal_scores() {
        let corners = [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)];
        let square = WallDimensions::new(2.0, 2.0);
        let primary = Wall::new("p", Vector3::z(), Point3::new(1.0, 1.0, 0.0), square)
            .unwrap()
            .with_vertices(corners)
            .unwrap();
        let detached = Wall::new("d", Vector3::x(), Point3::new(9.0, 1.0, 1.0), square)
            .unwrap()
            .with_vertices([Point3::new(9.0, 0.0, 0.0)])
            .unwrap();
        let touching = Wall::new("t", Vector3::x(), Point3::new(2.0, 1.0, 1.0), square)
            .unwrap()
            .with_vertices([Point3::new(2.004, 0.0, 0.003)])
            .unwrap();

        let walls = vec![primary, detached, touching];
        let scores = CriticalWallSelector::default().score_walls(0, &walls);
        assert_relative_eq!(scores[0].adjacency, 0.0);
        assert_relative_eq!(scores[1].adjacency, 1.0);
        assert_eq!(select_critical_walls(0, &walls, 2), vec![0, 2]);
    }

    #[test]
    fn ties_keep_input_order() {
        let walls = vec![
            wall("p", Vector3::z(), 2.0, 2.0),
            wall("a", Vector3::x(), 2.0, 2.0),
            wall("b", -Vector3::x(), 2.0, 2.0),
            wall("c", Vector3::x(), 2.0, 2.0),
        ];
        assert_eq!(select_critical_walls(0, &walls, 4), vec![0, 1, 2, 3]);
        assert_eq!(select_critical_walls(2, &walls, 3), vec![2, 0, 1]);
    }
}
