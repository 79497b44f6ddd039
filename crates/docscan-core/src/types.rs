// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for document boundary detection.

use serde::{Deserialize, Serialize};

/// A point in image space (pixels, origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Scale both coordinates independently.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }
}

impl From<(f32, f32)> for Point2D {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f32, f32) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

/// Absolute shoelace area of a closed polygon.
fn polygon_area(points: &[Point2D]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut twice_area = 0.0f64;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x as f64 * points[j].y as f64;
        twice_area -= points[j].x as f64 * points[i].y as f64;
    }
    (twice_area.abs() / 2.0) as f32
}

/// A closed boundary traced from a binary mask, with the area it encloses.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point2D>,
    pub area: f32,
}

impl Contour {
    pub fn new(points: Vec<Point2D>, area: f32) -> Self {
        Self { points, area }
    }
}

/// Four corners in canonical order: top-left, top-right, bottom-right,
/// bottom-left.
///
/// "Top-left" etc. follow the sum/difference ordering rule, not the true
/// orientation of the document; strongly rotated quads may be labelled
/// differently from how a human would label them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad {
    pub corners: [Point2D; 4],
}

impl Quad {
    /// Wrap corners that are already in canonical order.
    pub const fn from_ordered(corners: [Point2D; 4]) -> Self {
        Self { corners }
    }

    /// Full-frame rectangle inset by `margin` (fraction of each dimension,
    /// truncated to whole pixels).
    pub fn inset_frame(width: u32, height: u32, margin: f32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let mw = (w * margin).trunc();
        let mh = (h * margin).trunc();
        Self::from_ordered([
            Point2D::new(mw, mh),
            Point2D::new(w - mw, mh),
            Point2D::new(w - mw, h - mh),
            Point2D::new(mw, h - mh),
        ])
    }

    pub fn top_left(&self) -> Point2D {
        self.corners[0]
    }

    pub fn top_right(&self) -> Point2D {
        self.corners[1]
    }

    pub fn bottom_right(&self) -> Point2D {
        self.corners[2]
    }

    pub fn bottom_left(&self) -> Point2D {
        self.corners[3]
    }

    pub fn top_width(&self) -> f32 {
        self.corners[0].distance(&self.corners[1])
    }

    pub fn bottom_width(&self) -> f32 {
        self.corners[3].distance(&self.corners[2])
    }

    pub fn left_height(&self) -> f32 {
        self.corners[0].distance(&self.corners[3])
    }

    pub fn right_height(&self) -> f32 {
        self.corners[1].distance(&self.corners[2])
    }

    pub fn area(&self) -> f32 {
        polygon_area(&self.corners)
    }

    /// True when any edge is shorter than `min_edge` or the enclosed area is
    /// below one square pixel.
    pub fn is_degenerate(&self, min_edge: f32) -> bool {
        [
            self.top_width(),
            self.bottom_width(),
            self.left_height(),
            self.right_height(),
        ]
        .iter()
        .any(|edge| !edge.is_finite() || *edge < min_edge)
            || self.area() < 1.0
    }

    /// Scale every corner; used to map detections made on a downscaled copy
    /// back to source pixels.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::from_ordered(self.corners.map(|p| p.scaled(sx, sy)))
    }

    /// Corners as `[x, y]` pairs.
    pub fn to_pairs(&self) -> [[f32; 2]; 4] {
        self.corners.map(|p| [p.x, p.y])
    }
}

/// A scored quadrilateral candidate. Only the best one per image survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub quad: Quad,
    pub score: f32,
    /// Area of the contour the quad was approximated from.
    pub area: f32,
    pub aspect_ratio: f32,
}

/// Which strategy produced a boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Edge-ensemble contour search.
    Contour,
    /// Corners supplied by the caller (interactive cropping).
    Manual,
    /// Alternate detector plugged in at configuration time.
    External(String),
    /// Nothing found; margin-inset frame.
    Default,
}

impl std::fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contour => write!(f, "contour"),
            Self::Manual => write!(f, "manual"),
            Self::External(name) => write!(f, "{}", name),
            Self::Default => write!(f, "default"),
        }
    }
}

/// Outcome of boundary detection.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Detected { quad: Quad, method: DetectionMethod },
    NotDetected { default_quad: Quad },
}

impl DetectionResult {
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }

    /// The detected quad, or the fallback frame.
    pub fn quad(&self) -> &Quad {
        match self {
            Self::Detected { quad, .. } => quad,
            Self::NotDetected { default_quad } => default_quad,
        }
    }

    /// The quad only when a document was actually found.
    pub fn detected_quad(&self) -> Option<&Quad> {
        match self {
            Self::Detected { quad, .. } => Some(quad),
            Self::NotDetected { .. } => None,
        }
    }

    pub fn method(&self) -> DetectionMethod {
        match self {
            Self::Detected { method, .. } => method.clone(),
            Self::NotDetected { .. } => DetectionMethod::Default,
        }
    }

    /// Flatten into the report handed to interactive cropping callers.
    pub fn report(&self, width: u32, height: u32) -> BoundaryReport {
        BoundaryReport {
            detected: self.is_detected(),
            corners: self.quad().to_pairs(),
            width,
            height,
            method: self.method(),
        }
    }
}

/// Serializable corner report for callers that let the user adjust corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryReport {
    pub detected: bool,
    /// Top-left, top-right, bottom-right, bottom-left in source pixels.
    pub corners: [[f32; 2]; 4],
    pub width: u32,
    pub height: u32,
    pub method: DetectionMethod,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Quad {
        Quad::from_ordered([
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ])
    }

    #[test]
    fn polygon_area_rectangle() {
        let q = rect(0.0, 0.0, 10.0, 5.0);
        assert!((q.area() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn polygon_area_needs_three_points() {
        assert_eq!(polygon_area(&[Point2D::new(0.0, 0.0), Point2D::new(4.0, 4.0)]), 0.0);
    }

    #[test]
    fn inset_frame_truncates_margin() {
        let q = Quad::inset_frame(1010, 499, 0.02);
        // 1010 * 0.02 = 20.2 -> 20, 499 * 0.02 = 9.98 -> 9
        assert_eq!(q.top_left(), Point2D::new(20.0, 9.0));
        assert_eq!(q.top_right(), Point2D::new(990.0, 9.0));
        assert_eq!(q.bottom_right(), Point2D::new(990.0, 490.0));
        assert_eq!(q.bottom_left(), Point2D::new(20.0, 490.0));
    }

    #[test]
    fn edge_lengths() {
        let q = Quad::from_ordered([
            Point2D::new(0.0, 0.0),
            Point2D::new(100.0, 0.0),
            Point2D::new(90.0, 50.0),
            Point2D::new(10.0, 50.0),
        ]);
        assert!((q.top_width() - 100.0).abs() < 1e-4);
        assert!((q.bottom_width() - 80.0).abs() < 1e-4);
        assert!((q.left_height() - (100.0f32 + 2500.0).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn collapsed_quad_is_degenerate() {
        let line = Quad::from_ordered([
            Point2D::new(0.0, 0.0),
            Point2D::new(50.0, 0.0),
            Point2D::new(50.0, 0.0),
            Point2D::new(0.0, 0.0),
        ]);
        assert!(line.is_degenerate(1.0));
        assert!(!rect(0.0, 0.0, 20.0, 20.0).is_degenerate(1.0));
    }

    #[test]
    fn report_of_fallback_uses_default_method() {
        let result = DetectionResult::NotDetected {
            default_quad: Quad::inset_frame(100, 100, 0.02),
        };
        let report = result.report(100, 100);
        assert!(!report.detected);
        assert_eq!(report.method, DetectionMethod::Default);
        assert_eq!(report.corners[0], [2.0, 2.0]);

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["method"], "default");
        assert_eq!(json["detected"], false);
    }

    #[test]
    fn detected_result_exposes_quad() {
        let quad = rect(5.0, 5.0, 50.0, 60.0);
        let result = DetectionResult::Detected {
            quad,
            method: DetectionMethod::Contour,
        };
        assert!(result.is_detected());
        assert_eq!(result.detected_quad(), Some(&quad));
        assert_eq!(result.method().to_string(), "contour");
    }
}
