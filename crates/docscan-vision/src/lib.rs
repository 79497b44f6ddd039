// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-vision — Image analysis for the docscan pipeline.
//
// Provides document boundary detection (edge ensemble, contour ranking,
// quadrilateral search), perspective rectification, and content-adaptive
// enhancement, fronted by `DocumentScanner`.

pub mod detect;
pub mod enhance;
pub mod filter;
pub mod scanner;
pub mod transform;

// Re-export the primary types so callers can use `docscan_vision::DocumentScanner` etc.
pub use detect::{BoundaryDetector, ContourDetector, order_points};
pub use enhance::{AdaptiveEnhancer, ContentKind};
pub use scanner::DocumentScanner;
pub use transform::PerspectiveRectifier;
