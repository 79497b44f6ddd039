// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Boundary detection — edge ensemble, contour ranking, quadrilateral search,
// corner ordering, and the pluggable detector strategy.

pub mod candidates;
pub mod contours;
pub mod edges;
pub mod order;

use docscan_core::ScanConfig;
use docscan_core::types::{DetectionMethod, Point2D};
use image::DynamicImage;
use tracing::{debug, instrument};

pub use candidates::CandidateFinder;
pub use contours::ContourExtractor;
pub use edges::EdgeMapBuilder;
pub use order::order_points;

/// A strategy for locating a document's four corners.
///
/// Implementations return corners in the pixel space of the image they are
/// given, in any order; the scanner orders and validates them. Returning
/// `None` hands over to the next configured detector.
pub trait BoundaryDetector: Send + Sync {
    /// Label reported when this detector's result is used.
    fn method(&self) -> DetectionMethod;

    fn locate(&self, image: &DynamicImage, config: &ScanConfig) -> Option<[Point2D; 4]>;
}

/// Classical detector: edge ensemble → contours → best scored quadrilateral.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourDetector;

impl BoundaryDetector for ContourDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Contour
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn locate(&self, image: &DynamicImage, config: &ScanConfig) -> Option<[Point2D; 4]> {
        let mask = EdgeMapBuilder::new(&config.edges).build(image);
        let contours = ContourExtractor::new(&config.contours).extract(&mask);
        let best = CandidateFinder::new(&config.candidates).find_best(&contours)?;
        debug!(
            score = best.score,
            area_fraction = best.area / (image.width() as f32 * image.height() as f32),
            "Contour detector found a document"
        );
        Some(best.quad.corners)
    }
}
