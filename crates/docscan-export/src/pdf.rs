// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF export — wrap a scanned page in a single-page PDF using `printpdf` 0.8.
//
// The page is sized to the image at a fixed resolution (300 DPI by default),
// so a rectified A4 scan lands on an A4-sized page with no margins.

use docscan_core::error::{Result, ScanError};
use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, info, instrument};

/// Print resolution used for scan PDFs.
pub const DEFAULT_PDF_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

#[derive(Debug, Clone)]
pub struct PdfExporter {
    /// Pixels per inch when mapping the raster to page size.
    dpi: f32,
    /// Title metadata embedded in the PDF /Info dictionary.
    title: String,
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self {
            dpi: DEFAULT_PDF_DPI,
            title: "Scanned Document".to_string(),
        }
    }
}

impl PdfExporter {
    pub fn new(dpi: f32) -> Self {
        Self {
            dpi,
            ..Self::default()
        }
    }

    /// Title recorded in the document metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Page size for a `width x height` pixel raster at the configured DPI.
    pub fn page_size_mm(&self, width: u32, height: u32) -> (Mm, Mm) {
        (
            Mm(width as f32 / self.dpi * MM_PER_INCH),
            Mm(height as f32 / self.dpi * MM_PER_INCH),
        )
    }

    /// Create a single-page PDF showing `image` edge to edge.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height(), dpi = self.dpi))]
    pub fn to_pdf_bytes(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScanError::Pdf("cannot place an empty image on a page".into()));
        }
        if !self.dpi.is_finite() || self.dpi <= 0.0 {
            return Err(ScanError::Pdf(format!("invalid resolution {} dpi", self.dpi)));
        }

        let (page_w, page_h) = self.page_size_mm(image.width(), image.height());
        info!(title = %self.title, page_w_mm = page_w.0, page_h_mm = page_h.0, "Creating scan PDF");

        // printpdf wants packed RGB8.
        let rgb = image.to_rgb8();
        let raw = RawImage {
            pixels: RawImageData::U8(rgb.into_raw()),
            width: image.width() as usize,
            height: image.height() as usize,
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(&self.title);
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(self.dpi),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(bytes = output.len(), warnings = warnings.len(), "PDF serialised");

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn a4_pixels_map_to_a4_page() {
        let (w, h) = PdfExporter::default().page_size_mm(2480, 3508);
        assert!((w.0 - 210.0).abs() < 0.5, "{}", w.0);
        assert!((h.0 - 297.0).abs() < 0.5, "{}", h.0);
    }

    #[test]
    fn produces_pdf_bytes() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(120, 80, Luma([200])));
        let bytes = PdfExporter::default().to_pdf_bytes(&img).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn title_is_carried_into_document() {
        let exporter = PdfExporter::new(150.0).with_title("receipt-0425");
        assert_eq!(exporter.title, "receipt-0425");
        assert_eq!(exporter.dpi, 150.0);
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(30, 20, Luma([90])));
        assert!(exporter.to_pdf_bytes(&img).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn rejects_empty_image_and_bad_dpi() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            PdfExporter::default().to_pdf_bytes(&empty),
            Err(ScanError::Pdf(_))
        ));
        let img = DynamicImage::ImageLuma8(GrayImage::new(4, 4));
        assert!(matches!(PdfExporter::new(0.0).to_pdf_bytes(&img), Err(ScanError::Pdf(_))));
    }
}
