// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grayscale filter helpers layered on `imageproc`. Empty images pass through
// unchanged, since several `imageproc` filters panic on them.

use image::{GrayImage, Luma};
use imageproc::filter::{bilateral_filter, gaussian_blur_f32};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

fn is_empty(image: &GrayImage) -> bool {
    image.width() == 0 || image.height() == 0
}

/// Edge-preserving bilateral smoothing over a `diameter`-pixel window.
/// A zero diameter returns the input unchanged.
pub fn smooth_preserving_edges(
    image: &GrayImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> GrayImage {
    if diameter == 0 || is_empty(image) {
        return image.clone();
    }
    bilateral_filter(image, diameter, sigma_color, sigma_space)
}

/// Grayscale dilation minus grayscale erosion with a square kernel.
///
/// Responds to local intensity range rather than absolute intensity, so it
/// stays informative under slow illumination gradients.
pub fn morphological_gradient(image: &GrayImage, radius: u8) -> GrayImage {
    if is_empty(image) {
        return image.clone();
    }
    let mask = Mask::square(radius);
    let mut gradient = grayscale_dilate(image, &mask);
    let eroded = grayscale_erode(image, &mask);
    for (hi, lo) in gradient.iter_mut().zip(eroded.iter()) {
        *hi = hi.saturating_sub(*lo);
    }
    gradient
}

/// Unsharp mask: `image + amount * (image - gaussian_blur(image, sigma))`.
pub fn unsharp_mask(image: &GrayImage, sigma: f32, amount: f32) -> GrayImage {
    if is_empty(image) || sigma <= 0.0 {
        return image.clone();
    }
    let blurred = gaussian_blur_f32(image, sigma);
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let original = image.get_pixel(x, y).0[0] as f32;
        let soft = blurred.get_pixel(x, y).0[0] as f32;
        let sharpened = original * (1.0 + amount) - soft * amount;
        Luma([sharpened.round().clamp(0.0, 255.0) as u8])
    })
}

/// Fraction of non-zero pixels in a mask.
pub fn coverage(mask: &GrayImage) -> f32 {
    let total = mask.as_raw().len();
    if total == 0 {
        return 0.0;
    }
    let set = mask.as_raw().iter().filter(|&&v| v > 0).count();
    set as f32 / total as f32
}
