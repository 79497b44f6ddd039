// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge-map ensemble — bilateral smoothing, morphological gradient, several
// Canny passes OR-combined, then dilation and closing to bridge gaps.

use docscan_core::config::{CannyThresholds, EdgeConfig};
use image::{DynamicImage, GrayImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::morphology::{close, dilate};
use tracing::{debug, instrument};

use crate::filter::{coverage, morphological_gradient, smooth_preserving_edges};

/// Builds a binary edge mask (0 / 255) with the same dimensions as its input.
///
/// A single Canny threshold pair either misses faint document borders or
/// floods the mask with texture. Running several pairs and OR-ing them favours
/// recall; the contour and shape filters downstream discard the noise.
pub struct EdgeMapBuilder<'a> {
    config: &'a EdgeConfig,
}

impl<'a> EdgeMapBuilder<'a> {
    pub fn new(config: &'a EdgeConfig) -> Self {
        Self { config }
    }

    /// Produce the combined, gap-bridged edge mask for `image`.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn build(&self, image: &DynamicImage) -> GrayImage {
        let gray = image.to_luma8();
        self.build_from_gray(&gray)
    }

    /// Same as [`EdgeMapBuilder::build`] for an already-grayscale image.
    pub fn build_from_gray(&self, gray: &GrayImage) -> GrayImage {
        let cfg = self.config;

        let smoothed = smooth_preserving_edges(
            gray,
            cfg.bilateral_diameter,
            cfg.bilateral_sigma_color,
            cfg.bilateral_sigma_space,
        );
        let gradient = morphological_gradient(&smoothed, cfg.gradient_radius);

        let mut combined = GrayImage::new(gray.width(), gray.height());
        for thresholds in &cfg.smoothed_thresholds {
            or_into(&mut combined, &run_canny(&smoothed, *thresholds));
        }
        or_into(&mut combined, &run_canny(&gradient, cfg.gradient_thresholds));
        debug!(coverage = coverage(&combined), "Edge ensemble combined");

        let mut mask = combined;
        if cfg.dilate_radius > 0 {
            mask = dilate(&mask, Norm::LInf, cfg.dilate_radius);
        }
        if cfg.close_radius > 0 {
            mask = close(&mask, Norm::LInf, cfg.close_radius);
        }
        debug!(coverage = coverage(&mask), "Edge mask dilated and closed");

        mask
    }
}

fn run_canny(image: &GrayImage, thresholds: CannyThresholds) -> GrayImage {
    canny(image, thresholds.low, thresholds.high)
}

/// Logical OR of `other` into `acc`, normalising set pixels to 255.
fn or_into(acc: &mut GrayImage, other: &GrayImage) {
    for (a, b) in acc.iter_mut().zip(other.iter()) {
        if *b > 0 {
            *a = 255;
        }
    }
}
