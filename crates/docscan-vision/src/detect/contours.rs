// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction — trace every border in the edge mask, drop those whose
// area is implausible for a document, rank the rest by area.

use docscan_core::config::ContourConfig;
use docscan_core::types::{Contour, Point2D};
use image::GrayImage;
use imageproc::contours::find_contours;
use imageproc::geometry::contour_area;
use tracing::{debug, instrument};

/// Finds closed boundaries in a binary mask and keeps the largest plausible
/// ones.
pub struct ContourExtractor<'a> {
    config: &'a ContourConfig,
}

impl<'a> ContourExtractor<'a> {
    pub fn new(config: &'a ContourConfig) -> Self {
        Self { config }
    }

    /// Contours with area between the configured fractions of the mask area,
    /// sorted by enclosed area (largest first) and capped in number.
    ///
    /// Outer and hole borders are both traced; a thick document outline
    /// therefore yields two nested candidates.
    #[instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
    pub fn extract(&self, mask: &GrayImage) -> Vec<Contour> {
        let image_area = mask.width() as f32 * mask.height() as f32;
        let min_area = image_area * self.config.min_area_fraction;
        let max_area = image_area * self.config.max_area_fraction;

        let traced = find_contours::<i32>(mask);
        let traced_count = traced.len();

        let mut ranked: Vec<Contour> = traced
            .into_iter()
            .filter_map(|traced| {
                let area = contour_area(&traced.points) as f32;
                if area < min_area || area > max_area {
                    return None;
                }
                let points = traced
                    .points
                    .iter()
                    .map(|p| Point2D::new(p.x as f32, p.y as f32))
                    .collect();
                Some(Contour::new(points, area))
            })
            .collect();

        // Stable sort keeps trace order among equal areas.
        ranked.sort_by(|a, b| b.area.total_cmp(&a.area));
        ranked.truncate(self.config.max_contours);

        debug!(
            traced = traced_count,
            kept = ranked.len(),
            min_area,
            max_area,
            "Contours filtered"
        );

        ranked
    }
}
