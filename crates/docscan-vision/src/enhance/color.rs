// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Full-range BT.601 YCbCr split/merge, so luminance can be edited without
// moving hue.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// An RGB image separated into an editable luminance plane and untouched
/// chroma planes.
pub struct YCbCrPlanes {
    pub luma: GrayImage,
    cb: Vec<f32>,
    cr: Vec<f32>,
}

impl YCbCrPlanes {
    pub fn split(rgb: &RgbImage) -> Self {
        let (w, h) = rgb.dimensions();
        let len = (w as usize) * (h as usize);
        let mut luma = GrayImage::new(w, h);
        let mut cb = Vec::with_capacity(len);
        let mut cr = Vec::with_capacity(len);

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [r, g, b] = pixel.0.map(f32::from);
            let y_val = 0.299 * r + 0.587 * g + 0.114 * b;
            luma.put_pixel(x, y, Luma([y_val.round().clamp(0.0, 255.0) as u8]));
            cb.push(128.0 - 0.168_736 * r - 0.331_264 * g + 0.5 * b);
            cr.push(128.0 + 0.5 * r - 0.418_688 * g - 0.081_312 * b);
        }

        Self { luma, cb, cr }
    }

    /// Recombine with a replacement luminance plane of the same size.
    pub fn merge(&self, luma: &GrayImage) -> RgbImage {
        let (w, h) = luma.dimensions();
        RgbImage::from_fn(w, h, |x, y| {
            let idx = y as usize * w as usize + x as usize;
            let y_val = luma.get_pixel(x, y).0[0] as f32;
            let cb = self.cb.get(idx).copied().unwrap_or(128.0) - 128.0;
            let cr = self.cr.get(idx).copied().unwrap_or(128.0) - 128.0;
            let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
            Rgb([
                to_u8(y_val + 1.402 * cr),
                to_u8(y_val - 0.344_136 * cb - 0.714_136 * cr),
                to_u8(y_val + 1.772 * cb),
            ])
        })
    }
}
