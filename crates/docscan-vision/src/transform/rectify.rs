// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — map an ordered quad onto an upright rectangle
// with a homography and resample the source through it.

use docscan_core::error::{Result, ScanError};
use docscan_core::types::Quad;
use image::{DynamicImage, GenericImageView, GrayImage, Luma, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument};

/// Warps the region inside a quad to a rectangle.
///
/// Colour inputs produce `Rgb8`, everything else `Luma8`. Output pixels whose
/// pre-image falls outside the source are filled with white.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRectifier {
    /// Largest output, as a multiple of the source pixel count.
    max_output_scale: f32,
}

impl Default for PerspectiveRectifier {
    fn default() -> Self {
        Self {
            max_output_scale: 4.0,
        }
    }
}

impl PerspectiveRectifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_output_scale(mut self, scale: f32) -> Self {
        self.max_output_scale = scale;
        self
    }

    /// Target size for a quad: the longer of the two horizontal edges by the
    /// longer of the two vertical edges, so foreshortened sides are never
    /// cropped.
    ///
    /// Quads whose output would exceed `max_output_scale` times the
    /// `source` pixel count are rejected; they can only come from corners
    /// far outside the image.
    pub fn output_size(&self, quad: &Quad, source: (u32, u32)) -> Result<(u32, u32)> {
        let area = quad.area();
        if !(area >= 1.0) {
            return Err(ScanError::DegenerateGeometry(format!(
                "quad encloses {} square pixels",
                area
            )));
        }
        let out_w = quad.top_width().max(quad.bottom_width()).round();
        let out_h = quad.left_height().max(quad.right_height()).round();
        if !out_w.is_finite() || !out_h.is_finite() || out_w < 1.0 || out_h < 1.0 {
            return Err(ScanError::DegenerateGeometry(format!(
                "quad collapses to {}x{} pixels",
                out_w, out_h
            )));
        }

        let limit = f64::from(self.max_output_scale) * f64::from(source.0) * f64::from(source.1);
        let requested = f64::from(out_w) * f64::from(out_h);
        if requested > limit || out_w > u32::MAX as f32 || out_h > u32::MAX as f32 {
            return Err(ScanError::DegenerateGeometry(format!(
                "{}x{} output exceeds {}x the {}x{} source",
                out_w, out_h, self.max_output_scale, source.0, source.1
            )));
        }
        Ok((out_w as u32, out_h as u32))
    }

    /// Homography taking the quad corners to `[0, 0] x [out_w, out_h]`.
    pub fn projection(quad: &Quad, out_w: u32, out_h: u32) -> Result<Projection> {
        let (w, h) = (out_w as f32, out_h as f32);
        let src: [(f32, f32); 4] = quad.corners.map(Into::into);
        let dest: [(f32, f32); 4] = [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)];
        Projection::from_control_points(src, dest).ok_or_else(|| {
            ScanError::DegenerateGeometry("no homography maps the quad to a rectangle".into())
        })
    }

    /// Produce a new image holding only the perspective-corrected quad
    /// content. The source is never modified.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn rectify(&self, image: &DynamicImage, quad: &Quad) -> Result<DynamicImage> {
        let (out_w, out_h) = self.output_size(quad, image.dimensions())?;
        let projection = Self::projection(quad, out_w, out_h)?;
        debug!(out_w, out_h, "Homography computed");

        let rectified = if image.color().has_color() {
            let src = image.to_rgb8();
            let mut out = RgbImage::new(out_w, out_h);
            warp_into(&src, &projection, Interpolation::Bilinear, Rgb([255, 255, 255]), &mut out);
            DynamicImage::ImageRgb8(out)
        } else {
            let src = image.to_luma8();
            let mut out = GrayImage::new(out_w, out_h);
            warp_into(&src, &projection, Interpolation::Bilinear, Luma([255]), &mut out);
            DynamicImage::ImageLuma8(out)
        };

        info!(out_w, out_h, "Perspective correction applied");
        Ok(rectified)
    }
}
