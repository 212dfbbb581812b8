//! Closed-loop path over the tile grid
//!
//! Enemies walk a cyclic polyline of grid cells. A position on the path is a
//! (segment index, progress) pair: segment `i` runs from `points[i]` to
//! `points[(i + 1) % len]`, and progress is the fraction in [0, 1) covered.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::cell_center;

#[rustfmt::skip]
/// Rectangular loop (1,1) -> (8,1) -> (8,4) -> (1,4) -> back to (1,1)
const DEFAULT_LOOP: [(i32, i32); 20] = [
    // Top edge, left to right
    (1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1), (7, 1), (8, 1),
    // Right edge, down
    (8, 2), (8, 3), (8, 4),
    // Bottom edge, right to left
    (7, 4), (6, 4), (5, 4), (4, 4), (3, 4), (2, 4), (1, 4),
    // Left edge, up (closes onto (1,1))
    (1, 3), (1, 2),
];

/// Ordered cyclic sequence of grid cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<IVec2>,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            points: DEFAULT_LOOP.iter().map(|&(x, y)| IVec2::new(x, y)).collect(),
        }
    }
}

impl Path {
    /// Build a path from cells, rejecting loops that are not made of
    /// axis-aligned unit steps (including the closing step).
    pub fn new(points: Vec<IVec2>) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        let closed = points
            .iter()
            .zip(points.iter().cycle().skip(1))
            .all(|(a, b)| {
                let d = (*b - *a).abs();
                d.x + d.y == 1
            });
        closed.then_some(Self { points })
    }

    /// Number of cells (and of segments, since the loop is closed)
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[IVec2] {
        &self.points
    }

    /// Segment index following `index`, wrapping at the end of the loop
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.points.len()
    }

    /// World position at `progress` along segment `index`
    pub fn point_at(&self, index: usize, progress: f32) -> Vec2 {
        let index = index % self.points.len();
        let from = self.points[index];
        let to = self.points[self.next_index(index)];
        let a = cell_center(from.x, from.y);
        let b = cell_center(to.x, to.y);
        a + (b - a) * progress
    }

    /// World position of the loop's entry cell
    pub fn start(&self) -> Vec2 {
        self.point_at(0, 0.0)
    }

    /// Whether towers are forbidden on this cell
    pub fn is_path_cell(&self, x: i32, y: i32) -> bool {
        self.points.contains(&IVec2::new(x, y))
    }
}
