// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations. Each input image gets its own pipeline run; `scan`
// spreads inputs over a fixed number of scoped workers sharing one scanner.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use docscan_core::error::{Result, ScanError};
use docscan_core::types::{BoundaryReport, DetectionMethod, Point2D, Quad};
use docscan_core::ScanConfig;
use docscan_export::{OutputFormat, PdfExporter, ScanExporter};
use docscan_vision::{DocumentScanner, order_points};
use image::DynamicImage;
use tracing::{info, instrument, warn};

use crate::cli::{Cli, Command, DetectArgs, ScanArgs};

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };
    let scanner = DocumentScanner::with_shared_config(Arc::new(config));

    match cli.command {
        Command::Detect(args) => {
            let json = detect(&scanner, &args)?;
            println!("{json}");
            Ok(())
        }
        Command::Scan(args) => {
            let written = scan(&scanner, &args)?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
    }
}

// -- detect -------------------------------------------------------------------

/// JSON corner report for one image.
#[instrument(skip(scanner, args), fields(input = %args.input.display()))]
pub fn detect(scanner: &DocumentScanner, args: &DetectArgs) -> Result<String> {
    let report = detect_report(scanner, &args.input)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

fn detect_report(scanner: &DocumentScanner, input: &Path) -> Result<BoundaryReport> {
    let image = load(input)?;
    let result = scanner.detect_boundary(&image)?;
    Ok(result.report(image.width(), image.height()))
}

// -- scan ---------------------------------------------------------------------

/// Process every input and return the written paths in input order.
///
/// All inputs are attempted; the first failure is returned after the others
/// finish.
#[instrument(skip(scanner, args), fields(inputs = args.inputs.len(), format = %args.format))]
pub fn scan(scanner: &DocumentScanner, args: &ScanArgs) -> Result<Vec<PathBuf>> {
    let manual = match &args.corners {
        Some(raw) if args.inputs.len() > 1 => {
            return Err(ScanError::InvalidCorners(format!(
                "manual corners '{}' apply to a single input, got {}",
                raw,
                args.inputs.len()
            )));
        }
        Some(raw) => Some(order_points(parse_corners(raw)?)),
        None => None,
    };

    std::fs::create_dir_all(&args.out_dir)?;
    let exporter = ScanExporter::new().with_jpeg_quality(args.quality);

    let workers = args.jobs.map_or_else(default_workers, NonZeroUsize::get);
    let outcomes = map_bounded(&args.inputs, workers, |input| {
        scan_one(scanner, &exporter, args, input, manual.as_ref())
    });
    let outcomes = outcomes.into_iter().map(|outcome| {
        outcome.unwrap_or_else(|| Err(ScanError::InvalidImage("worker thread panicked".into())))
    });

    let mut written = Vec::with_capacity(outcomes.len());
    let mut first_error = None;
    for (input, outcome) in args.inputs.iter().zip(outcomes) {
        match outcome {
            Ok(path) => written.push(path),
            Err(err) => {
                warn!(input = %input.display(), %err, "Scan failed");
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(written),
    }
}

fn scan_one(
    scanner: &DocumentScanner,
    exporter: &ScanExporter,
    args: &ScanArgs,
    input: &Path,
    manual: Option<&Quad>,
) -> Result<PathBuf> {
    let image = load(input)?;

    let detected;
    let (quad, method) = match manual {
        Some(quad) => (Some(quad), DetectionMethod::Manual),
        None if args.no_detect => (None, DetectionMethod::Default),
        None => {
            detected = scanner.detect_boundary(&image)?;
            (detected.detected_quad(), detected.method())
        }
    };
    info!(input = %input.display(), %method, rectify = quad.is_some(), "Processing page");

    let page = scanner.rectify_and_enhance(&image, quad, !args.no_enhance)?;
    let out_path = output_path(&args.out_dir, input, args.format);
    if args.format == OutputFormat::Pdf {
        let titled = exporter
            .clone()
            .with_pdf(PdfExporter::default().with_title(page_stem(input)));
        titled.write_to_file(&page, args.format, &out_path)?;
    } else {
        exporter.write_to_file(&page, args.format, &out_path)?;
    }
    Ok(out_path)
}

fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Apply `job` to every item on at most `workers` scoped threads, returning
/// results in item order. Items claimed by a worker that panicked are `None`.
fn map_bounded<T, R, F>(items: &[T], workers: usize, job: F) -> Vec<Option<R>>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let next = &AtomicUsize::new(0);
    let job = &job;
    let workers = workers.clamp(1, items.len().max(1));
    let mut slots: Vec<Option<R>> = std::iter::repeat_with(|| None).take(items.len()).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    let mut done = Vec::new();
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(index) else {
                            break;
                        };
                        done.push((index, job(item)));
                    }
                    done
                })
            })
            .collect();
        for handle in handles {
            if let Ok(done) = handle.join() {
                for (index, result) in done {
                    slots[index] = Some(result);
                }
            }
        }
    });
    slots
}

/// `<out_dir>/<input stem>_scanned.<ext>`
pub fn output_path(out_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    out_dir.join(format!("{}_scanned.{}", page_stem(input), format.extension()))
}

fn page_stem(input: &Path) -> &str {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page")
}

fn load(input: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(input)?;
    DocumentScanner::decode(&bytes)
}

// -- corner parsing -----------------------------------------------------------

/// Parse four corners given as `x,y;x,y;x,y;x,y` or as the JSON array printed
/// by `detect` (`[[x,y],[x,y],[x,y],[x,y]]`). Order does not matter.
pub fn parse_corners(raw: &str) -> Result<[Point2D; 4]> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let pairs: [[f32; 2]; 4] = serde_json::from_str(trimmed)
            .map_err(|err| ScanError::InvalidCorners(format!("bad JSON corner list: {}", err)))?;
        return finite(pairs.map(|[x, y]| Point2D::new(x, y)));
    }

    let points = trimmed
        .split(';')
        .map(parse_point)
        .collect::<Result<Vec<Point2D>>>()?;
    let corners: [Point2D; 4] = points.try_into().map_err(|points: Vec<Point2D>| {
        ScanError::InvalidCorners(format!("expected 4 corners, got {}", points.len()))
    })?;
    finite(corners)
}

fn parse_point(pair: &str) -> Result<Point2D> {
    let (x, y) = pair
        .split_once(',')
        .ok_or_else(|| ScanError::InvalidCorners(format!("'{}' is not an x,y pair", pair.trim())))?;
    let coord = |s: &str| {
        s.trim()
            .parse::<f32>()
            .map_err(|_| ScanError::InvalidCorners(format!("'{}' is not a number", s.trim())))
    };
    Ok(Point2D::new(coord(x)?, coord(y)?))
}

fn finite(corners: [Point2D; 4]) -> Result<[Point2D; 4]> {
    if corners.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        Ok(corners)
    } else {
        Err(ScanError::InvalidCorners("corner coordinates must be finite".into()))
    }
}
