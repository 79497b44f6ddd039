// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document scanner — the two operations exposed to callers: boundary
// detection and rectify-then-enhance.

use std::sync::Arc;

use docscan_core::error::{Result, ScanError};
use docscan_core::types::{DetectionResult, Quad};
use docscan_core::ScanConfig;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, info, instrument, warn};

use crate::detect::{BoundaryDetector, ContourDetector, order_points};
use crate::enhance::AdaptiveEnhancer;
use crate::transform::PerspectiveRectifier;

/// Stateless pipeline front end.
///
/// Holds a read-only configuration and an ordered list of detection
/// strategies. Cloning is cheap and every method takes `&self`, so one
/// scanner can serve any number of threads.
#[derive(Clone)]
pub struct DocumentScanner {
    config: Arc<ScanConfig>,
    detectors: Vec<Arc<dyn BoundaryDetector>>,
    rectifier: PerspectiveRectifier,
}

impl Default for DocumentScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl DocumentScanner {
    /// Scanner using the contour detector only.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_shared_config(Arc::new(config))
    }

    pub fn with_shared_config(config: Arc<ScanConfig>) -> Self {
        let rectifier = PerspectiveRectifier::new().with_max_output_scale(config.max_output_scale);
        Self {
            config,
            detectors: vec![Arc::new(ContourDetector)],
            rectifier,
        }
    }

    /// Try `detector` before the ones already configured.
    pub fn with_primary(mut self, detector: Arc<dyn BoundaryDetector>) -> Self {
        self.detectors.insert(0, detector);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    // -- Decoding -------------------------------------------------------------

    /// Decode encoded image bytes (JPEG, PNG, TIFF, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn decode(data: &[u8]) -> Result<DynamicImage> {
        let image = image::load_from_memory(data)
            .map_err(|err| ScanError::InvalidImage(format!("failed to decode image: {}", err)))?;
        validate(&image)?;
        debug!(width = image.width(), height = image.height(), "Image decoded");
        Ok(image)
    }

    // -- Detection ------------------------------------------------------------

    /// Locate the document quadrilateral.
    ///
    /// Always yields four ordered corners in source pixels: the detected quad,
    /// or a frame inset by the configured margin when nothing usable is
    /// found.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_boundary(&self, image: &DynamicImage) -> Result<DetectionResult> {
        validate(image)?;
        let (width, height) = (image.width(), image.height());

        let working = self.detection_copy(image);
        let sx = width as f32 / working.width() as f32;
        let sy = height as f32 / working.height() as f32;

        for detector in &self.detectors {
            let method = detector.method();
            let Some(corners) = detector.locate(&working, &self.config) else {
                debug!(%method, "Detector found nothing");
                continue;
            };
            let quad = order_points(corners).scaled(sx, sy);
            // Scaling can reshuffle sums/differences on anisotropic resizes.
            let quad = order_points(quad.corners);
            if quad.is_degenerate(self.config.candidates.min_edge_length) {
                warn!(%method, ?quad, "Detected quad is degenerate; ignoring");
                continue;
            }
            info!(%method, ?quad, "Document boundary detected");
            return Ok(DetectionResult::Detected { quad, method });
        }

        warn!("No document detected; using full image with margins");
        Ok(DetectionResult::NotDetected {
            default_quad: Quad::inset_frame(width, height, self.config.fallback_margin),
        })
    }

    /// Downscaled copy used for detection, or a clone when already small
    /// enough.
    fn detection_copy(&self, image: &DynamicImage) -> DynamicImage {
        let max_dim = self.config.max_detection_dimension;
        let longest = image.width().max(image.height());
        if max_dim == 0 || longest <= max_dim {
            return image.clone();
        }
        let scale = max_dim as f32 / longest as f32;
        let w = ((image.width() as f32 * scale) as u32).max(1);
        let h = ((image.height() as f32 * scale) as u32).max(1);
        debug!(w, h, "Downscaling for detection");
        image.resize_exact(w, h, FilterType::Triangle)
    }

    // -- Rectification + enhancement ------------------------------------------

    /// Perspective-correct `image` to `quad` (when given) and optionally run
    /// adaptive enhancement.
    ///
    /// A degenerate quad is treated like a missing one: the image passes
    /// through uncorrected.
    #[instrument(skip(self, image, quad), fields(width = image.width(), height = image.height(), has_quad = quad.is_some()))]
    pub fn rectify_and_enhance(
        &self,
        image: &DynamicImage,
        quad: Option<&Quad>,
        enhance: bool,
    ) -> Result<DynamicImage> {
        validate(image)?;

        let rectified = match quad {
            Some(quad) => match self.rectifier.rectify(image, quad) {
                Ok(out) => out,
                Err(ScanError::DegenerateGeometry(reason)) => {
                    warn!(%reason, "Degenerate quad; passing image through");
                    self.pass_through(image)
                }
                Err(err) => return Err(err),
            },
            None => self.pass_through(image),
        };

        if !enhance {
            return Ok(rectified);
        }
        Ok(AdaptiveEnhancer::new(&self.config.enhance).enhance(&rectified))
    }

    /// Detect, then rectify and enhance using whatever was found.
    pub fn scan(&self, image: &DynamicImage, enhance: bool) -> Result<(DetectionResult, DynamicImage)> {
        let detection = self.detect_boundary(image)?;
        let output = self.rectify_and_enhance(image, detection.detected_quad(), enhance)?;
        Ok((detection, output))
    }

    fn pass_through(&self, image: &DynamicImage) -> DynamicImage {
        if !self.config.crop_fallback_margin {
            return image.clone();
        }
        let frame = Quad::inset_frame(image.width(), image.height(), self.config.fallback_margin);
        let x = frame.top_left().x as u32;
        let y = frame.top_left().y as u32;
        let w = (frame.top_width() as u32).max(1);
        let h = (frame.left_height() as u32).max(1);
        debug!(x, y, w, h, "Cropping pass-through image to margin frame");
        image.crop_imm(x, y, w, h)
    }
}

/// Reject images that no stage can work on.
fn validate(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ScanError::InvalidImage(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    Ok(())
}
