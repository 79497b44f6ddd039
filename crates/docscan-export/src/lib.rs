// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-export — Encoding of scanned pages for callers.
//
// Turns the raster produced by the vision pipeline into JPEG, PNG, or a
// single-page PDF sized at a fixed print resolution.

pub mod format;
pub mod pdf;
pub mod raster;

pub use format::OutputFormat;
pub use pdf::PdfExporter;
pub use raster::ScanExporter;
