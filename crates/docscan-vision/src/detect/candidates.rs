// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral candidates — Douglas-Peucker approximation swept over several
// tolerances, shape validation, and area/aspect scoring.

use docscan_core::config::CandidateConfig;
use docscan_core::types::{Candidate, Contour, Point2D};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use tracing::{debug, instrument, trace};

use super::order::order_points;

/// Searches ranked contours for the best four-sided approximation.
pub struct CandidateFinder<'a> {
    config: &'a CandidateConfig,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(config: &'a CandidateConfig) -> Self {
        Self { config }
    }

    /// Highest-scoring candidate across all contours, or `None` when no
    /// contour approximates to an acceptable quadrilateral.
    ///
    /// Contours are expected largest first; among equal scores the earlier
    /// contour wins.
    #[instrument(skip_all, fields(contours = contours.len()))]
    pub fn find_best(&self, contours: &[Contour]) -> Option<Candidate> {
        let mut best: Option<Candidate> = None;
        let mut accepted = 0usize;

        for (index, contour) in contours.iter().enumerate() {
            let Some(corners) = self.approximate_quad(contour) else {
                continue;
            };
            let area = contour.area;
            let Some(candidate) = self.evaluate(corners, area) else {
                continue;
            };
            accepted += 1;
            trace!(
                index,
                area,
                aspect_ratio = candidate.aspect_ratio,
                score = candidate.score,
                "Candidate accepted"
            );
            if best.is_none_or(|b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }

        debug!(
            accepted,
            best_score = best.map(|b| b.score),
            "Candidate search complete"
        );
        best
    }

    /// Approximate `contour` with each tolerance in the sweep (tightest first)
    /// and return the first result that has exactly four vertices.
    pub fn approximate_quad(&self, contour: &Contour) -> Option<[Point2D; 4]> {
        let ring = to_ring(&contour.points);
        let perimeter = arc_length(&ring, true) as f32;
        if perimeter <= 0.0 {
            return None;
        }
        self.config.epsilon_sweep.iter().find_map(|&fraction| {
            match simplify_ring(&ring, fraction * perimeter).as_slice() {
                &[a, b, c, d] => Some([a, b, c, d].map(|p| Point2D::new(p.x, p.y))),
                _ => None,
            }
        })
    }

    /// Order, validate and score four corners taken from a contour enclosing
    /// `area`.
    ///
    /// `score = area / (aspect_ratio * aspect_penalty_scale)`, so of two
    /// shapes with equal area the squarer one wins. Quads at or beyond the
    /// maximum aspect ratio, or with collapsed edges, are rejected.
    pub fn evaluate(&self, corners: [Point2D; 4], area: f32) -> Option<Candidate> {
        let quad = order_points(corners);
        if quad.is_degenerate(self.config.min_edge_length) {
            trace!(?quad, "Degenerate quad rejected");
            return None;
        }

        let avg_width = (quad.top_width() + quad.bottom_width()) / 2.0;
        let avg_height = (quad.left_height() + quad.right_height()) / 2.0;
        let aspect_ratio = avg_width.max(avg_height) / avg_width.min(avg_height);
        if !aspect_ratio.is_finite() || aspect_ratio >= self.config.max_aspect_ratio {
            trace!(aspect_ratio, "Elongated quad rejected");
            return None;
        }

        Some(Candidate {
            quad,
            score: area / (aspect_ratio * self.config.aspect_penalty_scale),
            area,
            aspect_ratio,
        })
    }
}

/// Simplify a closed polygon with the Ramer-Douglas-Peucker algorithm.
///
/// `imageproc`'s closed-curve mode always keeps the first traced point, which
/// for a border trace usually sits in the middle of a side. The ring is
/// therefore split at two mutually distant vertices (the point farthest from
/// the first vertex, and the point farthest from that one). On convex shapes
/// both are hull corners. Each half is simplified as an open chain and the
/// halves are joined.
fn simplify_ring(ring: &[Point<f32>], epsilon: f32) -> Vec<Point<f32>> {
    // `approximate_polygon_dp` panics on a non-positive tolerance.
    if ring.len() <= 3 || !(epsilon > 0.0) {
        return ring.to_vec();
    }

    let anchor = farthest_from(ring, ring[0]);
    let opposite = farthest_from(ring, ring[anchor]);
    if anchor == opposite {
        return vec![ring[anchor]];
    }
    let (i, j) = (anchor.min(opposite), anchor.max(opposite));
    let epsilon = f64::from(epsilon);

    let mut result = approximate_polygon_dp(&ring[i..=j], epsilon, false);

    let wrap: Vec<Point<f32>> = ring[j..].iter().chain(&ring[..=i]).copied().collect();
    let second = approximate_polygon_dp(&wrap, epsilon, false);
    // `second` starts at ring[j] and ends at ring[i], both already present.
    if second.len() > 2 {
        result.extend_from_slice(&second[1..second.len() - 1]);
    }
    result.dedup();
    if result.len() > 1 && result.first() == result.last() {
        result.pop();
    }
    result
}

fn to_ring(points: &[Point2D]) -> Vec<Point<f32>> {
    points.iter().map(|p| Point::new(p.x, p.y)).collect()
}

fn farthest_from(ring: &[Point<f32>], origin: Point<f32>) -> usize {
    let mut best = 0;
    let mut best_dist = -1.0f32;
    for (i, p) in ring.iter().enumerate() {
        let d = (p.x - origin.x).hypot(p.y - origin.y);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageproc::geometry::contour_area;

    fn p(x: f32, y: f32) -> Point2D {
        Point2D::new(x, y)
    }

    fn contour_of(points: Vec<Point2D>) -> Contour {
        let area = contour_area(&to_ring(&points)) as f32;
        Contour::new(points, area)
    }

    fn approx_polygon(points: &[Point2D], epsilon: f32) -> Vec<Point2D> {
        simplify_ring(&to_ring(points), epsilon)
            .into_iter()
            .map(|p| Point2D::new(p.x, p.y))
            .collect()
    }

    fn perimeter(contour: &Contour) -> f32 {
        arc_length(&to_ring(&contour.points), true) as f32
    }

    /// Densely sampled closed rectangle outline, starting at (x0, y0) and
    /// running clockwise, with a one-pixel jitter on alternate samples.
    fn rect_outline(x0: f32, y0: f32, x1: f32, y1: f32) -> Contour {
        let mut points = Vec::new();
        let jitter = |i: usize| if i % 2 == 0 { 0.0 } else { 0.8 };
        let steps = 40usize;
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(p(x0 + t * (x1 - x0), y0 + jitter(i)));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(p(x1 - jitter(i), y0 + t * (y1 - y0)));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(p(x1 - t * (x1 - x0), y1 - jitter(i)));
        }
        for i in 0..steps {
            let t = i as f32 / steps as f32;
            points.push(p(x0 + jitter(i), y1 - t * (y1 - y0)));
        }
        contour_of(points)
    }

    fn quad_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> [Point2D; 4] {
        [p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]
    }

    #[test]
    fn rectangle_outline_approximates_to_four_corners() {
        let contour = rect_outline(10.0, 20.0, 310.0, 220.0);
        let simplified = approx_polygon(&contour.points, 0.015 * perimeter(&contour));
        assert_eq!(simplified.len(), 4, "{:?}", simplified);
        let quad = order_points(<[Point2D; 4]>::try_from(simplified).expect("four points"));
        assert!(quad.top_left().distance(&p(10.0, 20.0)) < 1.5);
        assert!(quad.bottom_right().distance(&p(310.0, 220.0)) < 1.5);
    }

    #[test]
    fn approximation_handles_rotated_start_point() {
        // Start the ring in the middle of the top edge.
        let mut contour = rect_outline(0.0, 0.0, 200.0, 100.0);
        contour.points.rotate_left(17);
        let simplified = approx_polygon(&contour.points, 0.02 * perimeter(&contour));
        assert_eq!(simplified.len(), 4, "{:?}", simplified);
    }

    #[test]
    fn split_ring_drops_mid_side_start_point() {
        let mut contour = rect_outline(0.0, 0.0, 200.0, 100.0);
        contour.points.rotate_left(17);
        let ring = to_ring(&contour.points);
        let epsilon = 0.02 * perimeter(&contour);

        // Closed-mode simplification pins the mid-side start point.
        let pinned = approximate_polygon_dp(&ring, f64::from(epsilon), true);
        assert_eq!(pinned.len(), 5, "{:?}", pinned);
        assert!(pinned.contains(&ring[0]));

        let split = simplify_ring(&ring, epsilon);
        assert_eq!(split.len(), 4, "{:?}", split);
        assert!(!split.contains(&ring[0]));
    }

    #[test]
    fn non_positive_tolerance_returns_ring_unchanged() {
        let contour = rect_outline(0.0, 0.0, 50.0, 50.0);
        assert_eq!(approx_polygon(&contour.points, 0.0), contour.points);
        assert_eq!(approx_polygon(&contour.points, f32::NAN), contour.points);
    }

    #[test]
    fn triangle_stays_triangle() {
        let tri = vec![p(0.0, 0.0), p(50.0, 0.0), p(25.0, 40.0)];
        assert_eq!(approx_polygon(&tri, 1.0).len(), 3);
    }

    #[test]
    fn coincident_points_collapse() {
        let blob = vec![p(3.0, 3.0); 6];
        assert_eq!(approx_polygon(&blob, 1.0), vec![p(3.0, 3.0)]);
    }

    #[test]
    fn sweep_stops_at_first_four_vertex_tolerance() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        let contour = rect_outline(0.0, 0.0, 400.0, 300.0);
        let corners = finder.approximate_quad(&contour).expect("quad");
        let quad = order_points(corners);
        assert!(quad.top_right().distance(&p(400.0, 0.0)) < 1.5);
    }

    #[test]
    fn squarer_candidate_outranks_elongated_of_equal_area() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        let area = 20_000.0;

        let near_square = finder
            .evaluate(quad_corners(0.0, 0.0, 150.0, 100.0), area)
            .expect("aspect 1.5 accepted");
        let sliver = finder
            .evaluate(quad_corners(0.0, 0.0, 400.0, 50.0), area)
            .expect("aspect 8 accepted");

        assert!((near_square.aspect_ratio - 1.5).abs() < 1e-4);
        assert!((sliver.aspect_ratio - 8.0).abs() < 1e-4);
        assert!(near_square.score > sliver.score);
        assert!((near_square.score - area / 0.15).abs() < 1.0);
    }

    #[test]
    fn aspect_ratio_ten_is_rejected_regardless_of_area() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        assert!(finder.evaluate(quad_corners(0.0, 0.0, 500.0, 50.0), 1.0e9).is_none());
        assert!(finder.evaluate(quad_corners(0.0, 0.0, 50.0, 600.0), 1.0e9).is_none());
    }

    #[test]
    fn degenerate_quad_is_rejected() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        let collapsed = [p(0.0, 0.0), p(0.0, 0.0), p(100.0, 100.0), p(100.0, 100.0)];
        assert!(finder.evaluate(collapsed, 5000.0).is_none());
    }

    #[test]
    fn find_best_prefers_larger_near_square() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        let contours = vec![
            rect_outline(0.0, 0.0, 900.0, 100.0),  // aspect 9, area 90k
            rect_outline(0.0, 0.0, 250.0, 200.0),  // aspect 1.25, area 50k
            rect_outline(10.0, 10.0, 60.0, 60.0),  // tiny square
        ];
        let best = finder.find_best(&contours).expect("candidate");
        assert!(best.quad.bottom_right().distance(&p(250.0, 200.0)) < 1.5);
    }

    #[test]
    fn find_best_without_quads_is_none() {
        let config = CandidateConfig::default();
        let finder = CandidateFinder::new(&config);
        let triangle = contour_of(vec![p(0.0, 0.0), p(100.0, 0.0), p(50.0, 80.0)]);
        assert!(finder.find_best(&[triangle]).is_none());
        assert!(finder.find_best(&[]).is_none());
    }
}
