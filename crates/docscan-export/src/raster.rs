// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan exporter — encode a processed page to bytes or a file in the chosen
// format.

use std::path::Path;

use docscan_core::error::{Result, ScanError};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use tracing::{info, instrument};

use crate::format::OutputFormat;
use crate::pdf::PdfExporter;

/// JPEG quality used for scans unless overridden.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encodes processed pages.
#[derive(Debug, Clone)]
pub struct ScanExporter {
    jpeg_quality: u8,
    pdf: PdfExporter,
}

impl Default for ScanExporter {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            pdf: PdfExporter::default(),
        }
    }
}

impl ScanExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Replace the PDF settings (resolution and title).
    pub fn with_pdf(mut self, pdf: PdfExporter) -> Self {
        self.pdf = pdf;
        self
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn encode(&self, image: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>> {
        match format {
            OutputFormat::Jpeg => self.to_jpeg_bytes(image),
            OutputFormat::Png => to_png_bytes(image),
            OutputFormat::Pdf => self.pdf.to_pdf_bytes(image),
        }
    }

    /// Encode as JPEG. Colour pages are written as RGB, the rest as
    /// single-channel greyscale.
    pub fn to_jpeg_bytes(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        let flattened = flatten(image);
        flattened
            .write_with_encoder(encoder)
            .map_err(|err| ScanError::Encoding(format!("JPEG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Encode and write to `path`.
    pub fn write_to_file(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let bytes = self.encode(image, format)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(%format, bytes = bytes.len(), "Wrote scan to {}", path.as_ref().display());
        Ok(())
    }
}

/// Encode as PNG, keeping the raster's own pixel layout.
pub fn to_png_bytes(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ScanError::Encoding(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Drop alpha and deep channels so every encoder accepts the raster.
pub(crate) fn flatten(image: &DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image.clone(),
        other if other.color().has_color() => DynamicImage::ImageRgb8(other.to_rgb8()),
        other => DynamicImage::ImageLuma8(other.to_luma8()),
    }
}
