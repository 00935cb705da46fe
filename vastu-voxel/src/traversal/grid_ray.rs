//! Voxel traversal along a line segment.
//!
//! ## Algorithm
//!
//! Incremental boundary crossing (the 3-D analogue of Bresenham, as described
//! by Amanatides & Woo). The segment is parametrised as
//! `p(t) = start + t * (end - start)` for `t ∈ [0, 1]`. For every axis we keep
//! the parameter at which the segment crosses the next cell boundary
//! (`t_max`) and the parameter span of one cell (`t_delta`). Each step
//! advances the axis whose boundary comes first:
//!
//! ```text
//!  y
//!  2 │       ┌──┬──●end
//!  1 │    ┌──┼──┘
//!  0 ●────┘
//!    └──────────────── x
//!  start  0  1  2  3
//! ```
//!
//! Rules that keep the sequence gap-free and duplicate-free:
//! - Axes whose crossings coincide (within [`TIE_TOLERANCE`]) are advanced
//!   together, so a segment through an edge or corner steps diagonally.
//! - An axis that already reached the end cell's coordinate is never
//!   advanced. Rounding can therefore never overshoot the end cell, and the
//!   sequence always terminates on it.
//!
//! Cost is linear in the number of cells visited. Crossing parameters are kept
//! in `f64` so long rays at fine resolutions do not accumulate drift.

use std::iter::FusedIterator;

use crate::core::{Index3D, Point3D};

/// Parameter difference under which two boundary crossings count as one.
const TIE_TOLERANCE: f64 = 1e-9;

/// One traversed cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayStep {
    /// Cell index
    pub index: Index3D,
    /// Distance from the segment start at which this cell's measurement
    /// applies: where the segment enters the cell, or the full segment length
    /// for the cell containing the end point.
    pub distance: f32,
}

/// Iterator over the cells intersected by a segment.
///
/// Yields the cell containing `start` first and the cell containing `end`
/// last. A segment that starts and ends in the same cell (including
/// `start == end`) yields exactly one cell. The sequence depends only on the
/// inputs, so a new `GridRay` built from the same inputs replays it exactly.
///
/// # Example
///
/// ```rust,ignore
/// use vastu_voxel::traversal::GridRay;
///
/// let ray = GridRay::new(&Point3D::new(0.05, 0.05, 0.05), &Point3D::new(0.5, 0.05, 0.05), 0.1);
/// for step in ray {
///     println!("{} at {:.2}m", step.index, step.distance);
/// }
/// ```
#[derive(Clone, Debug)]
pub struct GridRay {
    current: Index3D,
    end: Index3D,
    step: [i32; 3],
    t_max: [f64; 3],
    t_delta: [f64; 3],
    t_entry: f64,
    length: f32,
    done: bool,
}

impl GridRay {
    /// Prepare a traversal from `start` to `end` for cells of `cell_width`.
    pub fn new(start: &Point3D, end: &Point3D, cell_width: f32) -> Self {
        debug_assert!(cell_width > 0.0, "cell width must be positive");
        let cell_width_inv = 1.0 / cell_width;
        let current = Index3D::from_point(start, cell_width_inv);
        let end_index = Index3D::from_point(end, cell_width_inv);
        let length = (end - start).norm();

        let cell_width = cell_width as f64;
        let mut step = [0i32; 3];
        let mut t_max = [f64::INFINITY; 3];
        let mut t_delta = [f64::INFINITY; 3];

        for axis in 0..3 {
            let index_delta = end_index.axis(axis) - current.axis(axis);
            if index_delta == 0 {
                continue;
            }
            let origin = start[axis] as f64;
            let delta = end[axis] as f64 - origin;
            step[axis] = index_delta.signum();
            t_delta[axis] = cell_width / delta.abs();

            let boundary = if step[axis] > 0 {
                (current.axis(axis) as f64 + 1.0) * cell_width
            } else {
                current.axis(axis) as f64 * cell_width
            };
            t_max[axis] = ((boundary - origin) / delta).max(0.0);
        }

        Self {
            current,
            end: end_index,
            step,
            t_max,
            t_delta,
            t_entry: 0.0,
            length,
            done: false,
        }
    }

    /// Metric length of the segment.
    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Index of the cell containing the segment's end point.
    #[inline]
    pub fn end_index(&self) -> Index3D {
        self.end
    }

    /// Iterate over cell indices only.
    pub fn indices(self) -> impl Iterator<Item = Index3D> {
        self.map(|step| step.index)
    }
}

impl Iterator for GridRay {
    type Item = RayStep;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let index = self.current;
        if index == self.end {
            self.done = true;
            return Some(RayStep {
                index,
                distance: self.length,
            });
        }
        // Interior cells stay strictly short of the full length, which is
        // reserved for the end cell.
        let distance = ((self.t_entry * self.length as f64) as f32).min(below(self.length));

        // Earliest crossing among axes that still have to move
        let mut t_next = f64::INFINITY;
        for axis in 0..3 {
            if self.current.axis(axis) != self.end.axis(axis) {
                t_next = t_next.min(self.t_max[axis]);
            }
        }

        // Advance every tied axis at once
        for axis in 0..3 {
            if self.current.axis(axis) != self.end.axis(axis)
                && self.t_max[axis] <= t_next + TIE_TOLERANCE
            {
                *self.current.axis_mut(axis) += self.step[axis];
                self.t_max[axis] += self.t_delta[axis];
            }
        }
        self.t_entry = t_next.clamp(self.t_entry, 1.0);

        Some(RayStep { index, distance })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            let remaining = self.current.manhattan_distance(&self.end) as usize;
            (1, Some(remaining + 1))
        }
    }
}

impl FusedIterator for GridRay {}

/// Largest `f32` strictly less than a non-negative `value`.
#[inline]
fn below(value: f32) -> f32 {
    if value > 0.0 {
        f32::from_bits(value.to_bits() - 1)
    } else {
        0.0
    }
}

/// Collect all cells along a segment, start and end cells included.
pub fn cells_along_segment(start: &Point3D, end: &Point3D, cell_width: f32) -> Vec<Index3D> {
    GridRay::new(start, end, cell_width).indices().collect()
}
