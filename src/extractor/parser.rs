//! PDF parsing via pdfium: text spans with font and position metadata.
//!
//! Extraction works from the page object list so each span keeps its font
//! family, size, and bounding box. A page whose text layer comes back nearly
//! empty is treated as scanned and routed through the OCR fallback.

use pdfium_render::prelude::*;
use std::path::Path;

use crate::config::ExtractionConfig;
use crate::errors::{Result, SiftError};
use crate::extractor::ocr::OcrEngine;
use crate::extractor::text::normalize_font_name;
use crate::models::{FontInfo, ParsedDocument, TextBlock};

/// Parses PDF files into [`ParsedDocument`]s
pub struct PdfParser {
    pdfium: Pdfium,
    config: ExtractionConfig,
    ocr: OcrEngine,
}

impl PdfParser {
    /// Bind the system pdfium library and build a parser
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        let bindings = Pdfium::bind_to_system_library().map_err(|e| {
            SiftError::Config(format!("could not bind pdfium library: {}", e))
        })?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
            config: config.clone(),
            ocr: OcrEngine::new(config.ocr_language.clone()),
        })
    }

    /// Parse a PDF file, extracting the text layer page by page with OCR
    /// fallback for scanned pages, then compute document statistics.
    pub fn parse(&self, pdf_path: &Path) -> Result<ParsedDocument> {
        let filename = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| pdf_path.display().to_string());

        let pdf = self
            .pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| SiftError::PdfParse {
                path: pdf_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut document = ParsedDocument::new(filename, pdf_path.display().to_string());
        document.page_count = pdf.pages().len() as u32;

        for (index, page) in pdf.pages().iter().enumerate() {
            let page_number = index as u32 + 1;
            let page_width = page.width().value;
            document
                .page_dimensions
                .push((page_width, page.height().value));

            let blocks = self.extract_text_blocks(&page, page_number);

            let total_text: usize = blocks.iter().map(|b| b.text.chars().count()).sum();
            if total_text < self.config.ocr_trigger_chars {
                match self.ocr_page(&page, page_number, page_width) {
                    Ok(ocr_blocks) => document.text_blocks.extend(ocr_blocks),
                    Err(e) => {
                        // A failed OCR pass leaves whatever the text layer had
                        eprintln!("warning: {}", e);
                        document.text_blocks.extend(blocks);
                    }
                }
            } else {
                document.text_blocks.extend(blocks);
            }
        }

        document.calculate_stats();
        document.primary_font = normalize_font_name(&document.primary_font);

        Ok(document)
    }

    /// Extract spans from the page's text objects
    fn extract_text_blocks(&self, page: &PdfPage, page_number: u32) -> Vec<TextBlock> {
        let mut blocks = Vec::new();

        for object in page.objects().iter() {
            let Some(text_object) = object.as_text_object() else {
                continue;
            };

            let text = text_object.text().trim().to_string();
            if text.is_empty() {
                continue;
            }

            let font_info = FontInfo {
                family: text_object.font().family(),
                size: text_object.unscaled_font_size().value,
                flags: 0,
                color: fill_color_hex(text_object),
            };

            let (x, y, width, height) = match text_object.bounds() {
                Ok(bounds) => (
                    bounds.left().value,
                    bounds.top().value,
                    (bounds.right().value - bounds.left().value).abs(),
                    (bounds.top().value - bounds.bottom().value).abs(),
                ),
                Err(_) => (0.0, 0.0, 0.0, 0.0),
            };

            blocks.push(TextBlock {
                text,
                page: page_number,
                x,
                y,
                width,
                height,
                font_info,
            });
        }

        blocks
    }

    /// Rasterize the page and run Tesseract over it
    fn ocr_page(&self, page: &PdfPage, page_number: u32, page_width: f32) -> Result<Vec<TextBlock>> {
        let render_config =
            PdfRenderConfig::new().set_target_width(self.config.ocr_render_width as i32);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| SiftError::Ocr {
                page: page_number,
                reason: format!("page rasterization failed: {}", e),
            })?;

        self.ocr
            .recognize_page(&bitmap.as_image(), page_number, page_width)
    }
}

fn fill_color_hex(object: &PdfPageTextObject) -> String {
    match object.fill_color() {
        Ok(color) => format!("#{:02x}{:02x}{:02x}", color.red(), color.green(), color.blue()),
        Err(_) => "#000000".to_string(),
    }
}
