// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the docscan-vision crate: boundary detection and
// rectify-plus-enhance on a synthetic page photographed on a dark desk.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgb, RgbImage};

use docscan_vision::DocumentScanner;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// 800x600 page with ruled "text" lines inside a light rectangle from
/// (60, 40) to (740, 560).
fn synthetic_page() -> DynamicImage {
    let mut img = RgbImage::from_pixel(800, 600, Rgb([30, 32, 36]));
    for y in 40..560 {
        for x in 60..740 {
            let ink = y % 24 < 3 && (100..700).contains(&x);
            let px = if ink { Rgb([20, 20, 20]) } else { Rgb([236, 234, 228]) };
            img.put_pixel(x, y, px);
        }
    }
    DynamicImage::ImageRgb8(img)
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_detect_boundary(c: &mut Criterion) {
    let scanner = DocumentScanner::default();
    let page = synthetic_page();

    c.bench_function("detect_boundary (800x600)", |b| {
        b.iter(|| black_box(scanner.detect_boundary(black_box(&page))));
    });
}

/// Full rectify-and-enhance on the detected quad; falls back to the whole
/// frame if detection misses, which still exercises the enhancement path.
fn bench_rectify_and_enhance(c: &mut Criterion) {
    let scanner = DocumentScanner::default();
    let page = synthetic_page();
    let quad = match scanner.detect_boundary(&page) {
        Ok(result) => *result.quad(),
        Err(err) => panic!("detection failed on fixture: {err}"),
    };

    c.bench_function("rectify_and_enhance (800x600)", |b| {
        b.iter(|| black_box(scanner.rectify_and_enhance(black_box(&page), Some(&quad), true)));
    });
}

criterion_group!(benches, bench_detect_boundary, bench_rectify_and_enhance);
criterion_main!(benches);
