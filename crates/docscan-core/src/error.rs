// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for docscan.

use thiserror::Error;

/// Top-level error type for all docscan operations.
///
/// A missing document is not an error: detection reports it through
/// [`crate::DetectionResult::NotDetected`].
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Input --
    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid corner list: {0}")]
    InvalidCorners(String),

    // -- Geometry --
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    // -- Export --
    #[error("image encoding failed: {0}")]
    Encoding(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    // -- Storage / config --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
