// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering by coordinate sum and difference.

use docscan_core::types::{Point2D, Quad};

/// Put four unordered points into top-left, top-right, bottom-right,
/// bottom-left order.
///
/// Smallest `x + y` is top-left, largest is bottom-right; smallest `x - y` is
/// top-right, largest is bottom-left. Ties go to the earlier point. This is
/// exact for near-axis-aligned convex quads; a quad rotated close to 45
/// degrees can map one input point to two roles, which later shows up as a
/// degenerate quad.
pub fn order_points(points: [Point2D; 4]) -> Quad {
    let sums = points.map(|p| p.x + p.y);
    let diffs = points.map(|p| p.x - p.y);

    Quad::from_ordered([
        points[arg_extreme(&sums, |a, b| a < b)],
        points[arg_extreme(&diffs, |a, b| a > b)],
        points[arg_extreme(&sums, |a, b| a > b)],
        points[arg_extreme(&diffs, |a, b| a < b)],
    ])
}

/// Index of the first value that no later value beats under `better`.
fn arg_extreme(values: &[f32; 4], better: fn(f32, f32) -> bool) -> usize {
    let mut best = 0;
    for i in 1..values.len() {
        if better(values[i], values[best]) {
            best = i;
        }
    }
    best
}

/// Whether a quad already satisfies the ordering rule.
pub fn is_canonical(quad: &Quad) -> bool {
    let sums = quad.corners.map(|p| p.x + p.y);
    let diffs = quad.corners.map(|p| p.x - p.y);
    sums.iter().all(|&s| sums[0] <= s && s <= sums[2])
        && diffs.iter().all(|&d| diffs[3] <= d && d <= diffs[1])
}
