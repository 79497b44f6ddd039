// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalisation (CLAHE).

use image::{GrayImage, Luma};

/// Equalise `image` per tile on a `grid x grid` layout with a clipped
/// histogram, blending neighbouring tile mappings bilinearly.
///
/// `clip_limit` is relative to a uniform histogram: each bin is capped at
/// `clip_limit * tile_pixels / 256` and the excess is spread over all bins.
/// Higher limits allow stronger local contrast.
pub fn clahe(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return image.clone();
    }

    let tile_w = w.div_ceil(grid.clamp(1, w));
    let tile_h = h.div_ceil(grid.clamp(1, h));
    let tiles_x = w.div_ceil(tile_w);
    let tiles_y = h.div_ceil(tile_h);

    let mut luts: Vec<[u8; 256]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(w);
            let y1 = (y0 + tile_h).min(h);
            luts.push(tile_mapping(image, x0, y0, x1, y1, clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32| &luts[(ty * tiles_x + tx) as usize];

    GrayImage::from_fn(w, h, |x, y| {
        let (tx0, tx1, ax) = neighbours(x, tile_w, tiles_x);
        let (ty0, ty1, ay) = neighbours(y, tile_h, tiles_y);
        let v = image.get_pixel(x, y).0[0] as usize;

        let top = lut_at(tx0, ty0)[v] as f32 * (1.0 - ax) + lut_at(tx1, ty0)[v] as f32 * ax;
        let bottom = lut_at(tx0, ty1)[v] as f32 * (1.0 - ax) + lut_at(tx1, ty1)[v] as f32 * ax;
        let blended = top * (1.0 - ay) + bottom * ay;
        Luma([blended.round().clamp(0.0, 255.0) as u8])
    })
}

/// Tiles whose centres bracket `coord`, and the blend weight of the second.
fn neighbours(coord: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let pos = (coord as f32 + 0.5) / tile as f32 - 0.5;
    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let first = pos.floor() as u32;
    if first >= tiles - 1 {
        return (tiles - 1, tiles - 1, 0.0);
    }
    (first, first + 1, pos - first as f32)
}

/// Clipped-histogram equalisation mapping for one tile.
fn tile_mapping(image: &GrayImage, x0: u32, y0: u32, x1: u32, y1: u32, clip_limit: f32) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for x in x0..x1 {
            hist[image.get_pixel(x, y).0[0] as usize] += 1;
        }
    }
    let area = (x1 - x0) * (y1 - y0);

    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32 / 256.0) as u32).max(1);
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }

        let bonus = excess / 256;
        let residual = excess % 256;
        for bin in hist.iter_mut() {
            *bin += bonus;
        }
        if residual > 0 {
            let step = (256 / residual).max(1) as usize;
            for bin in hist.iter_mut().step_by(step).take(residual as usize) {
                *bin += 1;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; 256];
    let mut cumulative = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cumulative += count;
        lut[value] = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spread(img: &GrayImage) -> i32 {
        let min = img.pixels().map(|p| p.0[0]).min().unwrap_or(0) as i32;
        let max = img.pixels().map(|p| p.0[0]).max().unwrap_or(0) as i32;
        max - min
    }

    fn low_contrast(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([100 + ((x + y) % 21) as u8]))
    }

    #[test]
    fn stretches_low_contrast_content() {
        let img = low_contrast(64, 64);
        let out = clahe(&img, 2.5, 8);
        assert_eq!(out.dimensions(), img.dimensions());
        assert!(spread(&out) > spread(&img));
    }

    #[test]
    fn higher_clip_limit_gives_at_least_as_much_contrast() {
        let img = low_contrast(64, 64);
        let gentle = clahe(&img, 1.5, 8);
        let strong = clahe(&img, 2.5, 8);
        assert!(spread(&strong) >= spread(&gentle));
    }

    #[test]
    fn preserves_intensity_order_within_a_tile() {
        let img = GrayImage::from_fn(8, 1, |x, _| Luma([100 + x as u8 * 2]));
        let out = clahe(&img, 4.0, 1);
        for x in 1..8 {
            assert!(out.get_pixel(x, 0).0[0] >= out.get_pixel(x - 1, 0).0[0]);
        }
    }

    #[test]
    fn tiny_images_do_not_panic() {
        let img = GrayImage::from_pixel(3, 2, Luma([50]));
        let out = clahe(&img, 2.5, 8);
        assert_eq!(out.dimensions(), (3, 2));
        assert_eq!(clahe(&GrayImage::new(0, 0), 2.5, 8).dimensions(), (0, 0));
    }

    #[test]
    fn neighbours_clamp_at_borders() {
        assert_eq!(neighbours(0, 10, 4), (0, 0, 0.0));
        assert_eq!(neighbours(39, 10, 4), (3, 3, 0.0));
        let (a, b, weight) = neighbours(10, 10, 4);
        assert_eq!((a, b), (0, 1));
        assert!((weight - 0.55).abs() < 1e-5);
    }
}
