// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Adaptive enhancement — pick a text or photo strategy from edge density and
// apply it to the luminance channel.

use docscan_core::config::EnhanceConfig;
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::filter3x3;
use tracing::{debug, info, instrument};

use super::clahe::clahe;
use super::color::YCbCrPlanes;
use crate::filter::{coverage, smooth_preserving_edges, unsharp_mask};

/// Aggressive 3x3 sharpening used on text-heavy pages.
const TEXT_SHARPEN_KERNEL: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 9.0, -1.0, -1.0, -1.0, -1.0];

/// Content classes with different enhancement strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Dense edges: printed text, forms, line art.
    TextHeavy,
    /// Sparse edges: photographs, smooth gradients, blank pages.
    PhotoLike,
}

/// Classifies content and applies the matching enhancement.
///
/// Output has the input's dimensions. Colour inputs become `Rgb8` with only
/// the luminance changed; other inputs become `Luma8`.
pub struct AdaptiveEnhancer<'a> {
    config: &'a EnhanceConfig,
}

impl<'a> AdaptiveEnhancer<'a> {
    pub fn new(config: &'a EnhanceConfig) -> Self {
        Self { config }
    }

    /// Fraction of pixels the fixed-threshold Canny detector marks as edges.
    pub fn edge_density(&self, gray: &GrayImage) -> f32 {
        let t = self.config.density_thresholds;
        coverage(&canny(gray, t.low, t.high))
    }

    pub fn classify_gray(&self, gray: &GrayImage) -> (ContentKind, f32) {
        let density = self.edge_density(gray);
        let kind = if density > self.config.text_density_threshold {
            ContentKind::TextHeavy
        } else {
            ContentKind::PhotoLike
        };
        (kind, density)
    }

    pub fn classify(&self, image: &DynamicImage) -> ContentKind {
        self.classify_gray(&image.to_luma8()).0
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn enhance(&self, image: &DynamicImage) -> DynamicImage {
        if image.color().has_color() {
            let planes = YCbCrPlanes::split(&image.to_rgb8());
            let luma = self.enhance_luma(&planes.luma);
            DynamicImage::ImageRgb8(planes.merge(&luma))
        } else {
            DynamicImage::ImageLuma8(self.enhance_luma(&image.to_luma8()))
        }
    }

    fn enhance_luma(&self, luma: &GrayImage) -> GrayImage {
        let cfg = self.config;
        let (kind, density) = self.classify_gray(luma);
        info!(?kind, density, "Enhancement strategy selected");

        match kind {
            ContentKind::TextHeavy => {
                let equalised = clahe(luma, cfg.text_clip_limit, cfg.tile_grid);
                filter3x3::<_, f32, u8>(&equalised, &TEXT_SHARPEN_KERNEL)
            }
            ContentKind::PhotoLike => {
                let denoised = smooth_preserving_edges(
                    luma,
                    cfg.photo_denoise_diameter,
                    cfg.photo_denoise_sigma_color,
                    cfg.photo_denoise_sigma_space,
                );
                let equalised = clahe(&denoised, cfg.photo_clip_limit, cfg.tile_grid);
                debug!("Photo branch: denoised and equalised");
                unsharp_mask(&equalised, cfg.unsharp_sigma, cfg.unsharp_amount)
            }
        }
    }
}
