//! OCR fallback for scanned pages.
//!
//! Pages with no usable text layer are rasterized and run through Tesseract.
//! OCR recovers text only: font and position metadata is synthetic, so each
//! non-empty line becomes one page-wide block with the OCR sentinel font.

use image::DynamicImage;
use leptess::LepTess;
use std::io::Cursor;

use crate::errors::{Result, SiftError};
use crate::models::{FontInfo, TextBlock};

/// Tesseract-backed OCR engine
pub struct OcrEngine {
    language: String,
}

impl OcrEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Recognize text on a rendered page image, returning one block per line
    pub fn recognize_page(
        &self,
        image: &DynamicImage,
        page: u32,
        page_width: f32,
    ) -> Result<Vec<TextBlock>> {
        let mut png_bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .map_err(|e| SiftError::Ocr {
                page,
                reason: format!("page render encoding failed: {}", e),
            })?;

        let mut tess = LepTess::new(None, &self.language).map_err(|e| SiftError::Ocr {
            page,
            reason: format!("tesseract init failed: {}", e),
        })?;

        tess.set_image_from_mem(&png_bytes).map_err(|e| SiftError::Ocr {
            page,
            reason: format!("tesseract could not read page image: {}", e),
        })?;

        let text = tess.get_utf8_text().map_err(|e| SiftError::Ocr {
            page,
            reason: format!("tesseract recognition failed: {}", e),
        })?;

        Ok(Self::blocks_from_text(&text, page, page_width))
    }

    /// Split recognized text into per-line blocks with sentinel font info
    pub fn blocks_from_text(text: &str, page: u32, page_width: f32) -> Vec<TextBlock> {
        text.lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(TextBlock {
                    text: trimmed.to_string(),
                    page,
                    // Position is unknown from OCR
                    x: 0.0,
                    y: 0.0,
                    width: page_width,
                    height: 12.0,
                    font_info: FontInfo::ocr(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_from_text_splits_lines() {
        let blocks = OcrEngine::blocks_from_text("First line\n\n  Second line  \n", 3, 612.0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "First line");
        assert_eq!(blocks[1].text, "Second line");
        assert!(blocks.iter().all(|b| b.page == 3));
        assert!(blocks.iter().all(|b| b.font_info.is_ocr()));
    }

    #[test]
    fn test_blocks_from_empty_text() {
        let blocks = OcrEngine::blocks_from_text("  \n\n", 1, 612.0);
        assert!(blocks.is_empty());
    }
}
